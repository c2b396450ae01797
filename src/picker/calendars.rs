use crate::calc::date_math::{add_months, end_of_month, first_of_month, is_same_date, DateUnit};
use crate::calc::month_matrix::{build_month_matrix, MonthMatrix};
use crate::picker::command::Side;
use crate::picker::options::ResolvedOptions;
use crate::picker::selection::Selection;
use chrono::{Datelike, NaiveDate};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarState {
    pub month: NaiveDate,
    pub matrix: MonthMatrix,
}

impl CalendarState {
    fn new(month: NaiveDate, first_day: u32) -> Self {
        let month = first_of_month(month);
        CalendarState {
            month,
            matrix: build_month_matrix(month, first_day),
        }
    }

    pub fn shows(&self, date: NaiveDate) -> bool {
        is_same_date(&date, &self.month, DateUnit::Month)
    }
}

/// Anchor movement reported back so the facade can fire hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthChange {
    pub month: NaiveDate,
    pub year_changed: bool,
}

/// The left and right month views. In linked mode (and always in
/// single-date mode) `right.month == left.month + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarPair {
    pub left: CalendarState,
    pub right: CalendarState,
}

impl CalendarPair {
    pub fn new(selection: &Selection, opts: &ResolvedOptions) -> Self {
        let first_day = opts.locale.first_day;
        let left = first_of_month(selection.start.date());
        CalendarPair {
            left: CalendarState::new(left, first_day),
            right: CalendarState::new(add_months(left, 1), first_day),
        }
        .derived(selection, opts)
    }

    fn derived(mut self, selection: &Selection, opts: &ResolvedOptions) -> Self {
        self.derive(selection, opts);
        self
    }

    pub fn side(&self, side: Side) -> &CalendarState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn keeps_pair(opts: &ResolvedOptions) -> bool {
        opts.linked_calendars || opts.single_date_picker
    }

    fn set(&mut self, side: Side, month: NaiveDate, first_day: u32) {
        let state = CalendarState::new(month, first_day);
        match side {
            Side::Left => self.left = state,
            Side::Right => self.right = state,
        }
    }

    fn set_left_paired(&mut self, month: NaiveDate, first_day: u32) {
        self.set(Side::Left, month, first_day);
        self.set(Side::Right, add_months(self.left.month, 1), first_day);
    }

    /// Re-derives both anchors from the selection.
    pub fn derive(&mut self, selection: &Selection, opts: &ResolvedOptions) {
        let first_day = opts.locale.first_day;
        let left = first_of_month(selection.start.date());
        self.set(Side::Left, left, first_day);
        let right = match selection.end {
            Some(end)
                if !Self::keeps_pair(opts)
                    && !is_same_date(&end, &selection.start, DateUnit::Month) =>
            {
                first_of_month(end.date())
            }
            _ => add_months(left, 1),
        };
        self.set(Side::Right, right, first_day);
    }

    pub fn can_prev(&self, side: Side, opts: &ResolvedOptions) -> bool {
        let month = self.side(side).month;
        opts.min_date.is_none_or(|min| month > min.date())
    }

    pub fn can_next(&self, side: Side, opts: &ResolvedOptions) -> bool {
        let month = self.side(side).month;
        opts.max_date.is_none_or(|max| end_of_month(month) < max.date())
    }

    /// Steps a calendar by `direction` months. In linked mode only the
    /// driving side (left for previous, right for next) moves the pair;
    /// the other side is ignored.
    pub fn navigate(
        &mut self,
        side: Side,
        direction: i32,
        opts: &ResolvedOptions,
    ) -> Option<MonthChange> {
        if direction == 0 {
            return None;
        }
        let first_day = opts.locale.first_day;
        let backwards = direction < 0;
        let before = self.left.month;

        if opts.single_date_picker {
            let allowed = if backwards {
                self.can_prev(Side::Left, opts)
            } else {
                self.can_next(Side::Left, opts)
            };
            if !allowed {
                return None;
            }
            self.set_left_paired(add_months(self.left.month, direction), first_day);
            return Some(change(before, self.left.month));
        }

        if opts.linked_calendars {
            let driving = matches!((side, backwards), (Side::Left, true) | (Side::Right, false));
            if !driving {
                debug!(?side, direction, "non-driving navigation ignored");
                return None;
            }
            let allowed = if backwards {
                self.can_prev(Side::Left, opts)
            } else {
                self.can_next(Side::Right, opts)
            };
            if !allowed {
                return None;
            }
            self.set_left_paired(add_months(self.left.month, direction), first_day);
            return Some(change(before, self.left.month));
        }

        let allowed = if backwards {
            self.can_prev(side, opts)
        } else {
            self.can_next(side, opts)
        };
        if !allowed {
            return None;
        }
        let previous = self.side(side).month;
        self.set(side, add_months(previous, direction), first_day);
        Some(change(previous, self.side(side).month))
    }

    /// Direct month/year selection. Out-of-range choices are ignored.
    pub fn select_month_year(
        &mut self,
        side: Side,
        year: i32,
        month: u32,
        opts: &ResolvedOptions,
    ) -> Option<MonthChange> {
        if !opts.year_in_range(year) {
            return None;
        }
        let target = NaiveDate::from_ymd_opt(year, month, 1)?;
        if opts.min_date.is_some_and(|min| target < first_of_month(min.date())) {
            return None;
        }
        if opts.max_date.is_some_and(|max| target > max.date()) {
            return None;
        }

        let first_day = opts.locale.first_day;
        let previous = self.side(side).month;
        match side {
            Side::Left => {
                self.set(Side::Left, target, first_day);
                if Self::keeps_pair(opts) {
                    self.set(Side::Right, add_months(target, 1), first_day);
                }
            }
            Side::Right if opts.single_date_picker => {
                self.set_left_paired(target, first_day);
            }
            Side::Right => {
                self.set(Side::Right, target, first_day);
                if opts.linked_calendars {
                    self.set(Side::Left, add_months(target, -1), first_day);
                }
            }
        }
        Some(change(previous, target))
    }

    /// Brings `date` into view, moving as little as possible.
    pub fn reveal(&mut self, date: NaiveDate, opts: &ResolvedOptions) -> Option<MonthChange> {
        let first_day = opts.locale.first_day;
        let month = first_of_month(date);
        let before = self.left.month;

        if opts.single_date_picker {
            if self.left.shows(date) {
                return None;
            }
            self.set_left_paired(month, first_day);
            return Some(change(before, month));
        }
        if self.left.shows(date) || self.right.shows(date) {
            return None;
        }

        if opts.linked_calendars {
            let left = if month < self.left.month {
                month
            } else {
                add_months(month, -1)
            };
            self.set_left_paired(left, first_day);
            return Some(change(before, month));
        }

        if month < self.left.month {
            self.set(Side::Left, month, first_day);
            Some(change(before, month))
        } else {
            let previous = self.right.month;
            self.set(Side::Right, month, first_day);
            Some(change(previous, month))
        }
    }
}

fn change(before: NaiveDate, after: NaiveDate) -> MonthChange {
    MonthChange {
        month: after,
        year_changed: before.year() != after.year(),
    }
}
