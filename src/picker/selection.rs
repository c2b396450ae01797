use crate::calc::date_math::{is_same_date, DateUnit};
use crate::calc::{validate_date, ValidationError};
use crate::picker::command::Side;
use crate::picker::options::ResolvedOptions;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// What an accepted day activation did to the selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A new range was started; the end is open.
    Started,
    /// The range now has both ends.
    Completed,
    /// Single-date mode: start and end mirror each other.
    Single,
}

impl Placement {
    pub fn is_complete(&self) -> bool {
        !matches!(self, Placement::Started)
    }
}

/// The picker's selection. `end` is `None` only while a range is in
/// progress; whenever both ends are set, `start <= end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub old_start: NaiveDateTime,
    pub old_end: Option<NaiveDateTime>,
    pub hover: Option<NaiveDate>,
    pub chosen_label: Option<String>,
    pub is_open: bool,
}

impl Selection {
    pub fn new(start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        Selection {
            start,
            end,
            old_start: start,
            old_end: end,
            hover: None,
            chosen_label: None,
            is_open: false,
        }
    }

    pub fn snapshot(&mut self) {
        self.old_start = self.start;
        self.old_end = self.end;
    }

    pub fn restore_snapshot(&mut self) {
        self.start = self.old_start;
        self.end = self.old_end;
    }

    /// Drops a half-made range. Returns true when something was reverted.
    pub fn revert_if_incomplete(&mut self) -> bool {
        if self.end.is_some() {
            return false;
        }
        self.restore_snapshot();
        true
    }

    /// Day-level comparison with the values captured at open.
    pub fn changed_since_open(&self) -> bool {
        let start_changed = !is_same_date(&self.start, &self.old_start, DateUnit::Day);
        let end_changed = match (self.end, self.old_end) {
            (Some(end), Some(old)) => !is_same_date(&end, &old, DateUnit::Day),
            (None, None) => false,
            _ => true,
        };
        start_changed || end_changed
    }

    pub fn is_complete(&self, single_date_picker: bool) -> bool {
        single_date_picker || self.end.is_some_and(|end| self.start <= end)
    }

    /// The value a side's time selectors show.
    pub fn side_value(&self, side: Side) -> NaiveDateTime {
        match side {
            Side::Left => self.start,
            Side::Right => self.end.unwrap_or(self.start),
        }
    }

    /// Places an already validated day. Range rules are checked here; a
    /// rejection leaves every field untouched.
    pub fn place_day(
        &mut self,
        date: NaiveDateTime,
        opts: &ResolvedOptions,
    ) -> Result<Placement, ValidationError> {
        if opts.single_date_picker {
            self.start = opts.normalize_start(date);
            self.end = Some(opts.normalize_end(date).max(self.start));
            self.hover = None;
            debug!(start = %self.start, "single date selected");
            return Ok(Placement::Single);
        }

        let before_start = date.date() < self.start.date();
        if self.end.is_some() || (before_start && opts.restart_on_earlier_date) {
            self.start = opts.normalize_start(date);
            self.end = None;
            self.hover = None;
            debug!(start = %self.start, "range started");
            return Ok(Placement::Started);
        }

        let (start, end) = if before_start {
            (opts.normalize_start(date), opts.normalize_end(self.start))
        } else {
            (self.start, opts.normalize_end(date).max(self.start))
        };
        opts.check_range(start, end)?;
        self.start = start;
        self.end = Some(end);
        self.hover = None;
        debug!(start = %start, end = %end, "range completed");
        Ok(Placement::Completed)
    }

    /// Preview only: kept while the end is open and the day is not before
    /// the start.
    pub fn hover(&mut self, date: NaiveDate) -> bool {
        if self.end.is_some() || date < self.start.date() || self.hover == Some(date) {
            return false;
        }
        self.hover = Some(date);
        true
    }

    pub fn leave(&mut self) -> bool {
        self.hover.take().is_some()
    }

    pub fn set_range(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        self.start = start;
        self.end = Some(end.max(start));
        self.hover = None;
    }

    /// Moves one side to `value`, which already carries the new time of day.
    /// Returns false when there is nothing to change (right side, open end).
    pub fn change_time(
        &mut self,
        side: Side,
        value: NaiveDateTime,
        opts: &ResolvedOptions,
    ) -> Result<bool, ValidationError> {
        if side == Side::Right && self.end.is_none() {
            return Ok(false);
        }
        if !opts.time_in_bounds(value) {
            return Err(ValidationError::OutOfBounds);
        }
        validate_date(value, &opts.validation)?;

        match side {
            Side::Left => {
                self.start = value;
                if opts.single_date_picker {
                    self.end = Some(value);
                } else if let Some(end) = self.end {
                    if is_same_date(&end, &value, DateUnit::Day) && end < value {
                        self.end = Some(value);
                    }
                }
            }
            Side::Right => {
                if value < self.start {
                    return Err(ValidationError::OutOfBounds);
                }
                self.end = Some(value);
            }
        }
        debug!(?side, %value, "time changed");
        Ok(true)
    }
}
