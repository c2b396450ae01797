use crate::calc::date_math::format_date;
use crate::calc::validate_date;
use crate::calc::workday::is_business_day;
use crate::picker::calendars::{CalendarPair, CalendarState};
use crate::picker::command::Side;
use crate::picker::keyboard::KeyboardNav;
use crate::picker::options::ResolvedOptions;
use crate::picker::selection::Selection;
use crate::picker::time::{minute_steps, Meridiem, TimeInput};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Rendering state of one calendar cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellFlags {
    pub today: bool,
    pub weekend: bool,
    pub overflow: bool,
    /// Outside `min_date`/`max_date`.
    pub disabled: bool,
    /// Rejected by the validation rules.
    pub invalid: bool,
    pub start: bool,
    pub end: bool,
    pub in_range: bool,
    pub hover_range: bool,
    pub hover_end: bool,
    pub focused: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub flags: CellFlags,
    /// Whether a pointer activation on this cell is accepted.
    pub selectable: bool,
}

impl DayCell {
    /// The `YYYY-MM-DD` value sent back with `ActivateDay`/`HoverDay`.
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthView {
    pub side: Side,
    pub month: NaiveDate,
    pub title: String,
    pub weekdays: Vec<String>,
    pub cells: Vec<DayCell>,
    pub can_prev: bool,
    pub can_next: bool,
    pub years: (i32, i32),
}

impl MonthView {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeOption {
    pub value: u32,
    pub label: String,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeView {
    pub selected: TimeInput,
    pub hours: Vec<TimeOption>,
    pub minutes: Vec<TimeOption>,
    pub seconds: Option<Vec<TimeOption>>,
    pub meridiem: Option<Meridiem>,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeItem {
    pub label: String,
    pub active: bool,
}

/// Everything a renderer needs to draw the panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerView {
    pub open: bool,
    pub single: bool,
    pub show_calendars: bool,
    pub left: MonthView,
    pub right: Option<MonthView>,
    pub left_time: Option<TimeView>,
    pub right_time: Option<TimeView>,
    pub ranges: Vec<RangeItem>,
    pub selected_text: String,
    pub apply_enabled: bool,
    pub apply_label: String,
    pub cancel_label: String,
}

pub(crate) struct ViewInputs<'a> {
    pub selection: &'a Selection,
    pub calendars: &'a CalendarPair,
    pub keyboard: &'a KeyboardNav,
    pub options: &'a ResolvedOptions,
    pub show_calendars: bool,
    pub today: NaiveDate,
}

pub(crate) fn build_view(inputs: &ViewInputs) -> PickerView {
    let opts = inputs.options;
    let single = opts.single_date_picker;
    let right = (!single).then(|| month_view(inputs, Side::Right, &inputs.calendars.right));

    let (left_time, right_time) = if opts.time_picker {
        let left = time_view(inputs.selection.side_value(Side::Left), opts, false);
        let right = (!single).then(|| {
            time_view(
                inputs.selection.side_value(Side::Right),
                opts,
                inputs.selection.end.is_none(),
            )
        });
        (Some(left), right)
    } else {
        (None, None)
    };

    let chosen = inputs.selection.chosen_label.as_deref();
    let mut ranges: Vec<RangeItem> = opts
        .ranges
        .iter()
        .map(|r| RangeItem {
            label: r.label.clone(),
            active: chosen == Some(r.label.as_str()),
        })
        .collect();
    if let Some(custom) = opts.custom_label() {
        ranges.push(RangeItem {
            label: custom.to_string(),
            active: chosen == Some(custom),
        });
    }

    PickerView {
        open: inputs.selection.is_open,
        single,
        show_calendars: inputs.show_calendars,
        left: month_view(inputs, Side::Left, &inputs.calendars.left),
        right,
        left_time,
        right_time,
        ranges,
        selected_text: selected_text(inputs.selection, opts),
        apply_enabled: inputs.selection.is_complete(single),
        apply_label: opts.locale.apply_label.clone(),
        cancel_label: opts.locale.cancel_label.clone(),
    }
}

/// `start` or `start<sep>end` in the locale format.
pub fn selected_text(selection: &Selection, opts: &ResolvedOptions) -> String {
    let format = &opts.locale.format;
    let mut text = format_date(selection.start, format);
    if !opts.single_date_picker {
        if let Some(end) = selection.end {
            text.push_str(&opts.locale.separator);
            text.push_str(&format_date(end, format));
        }
    }
    text
}

fn month_view(inputs: &ViewInputs, side: Side, calendar: &CalendarState) -> MonthView {
    let opts = inputs.options;
    let calendars = inputs.calendars;
    let (show_prev, show_next) = if opts.single_date_picker || !opts.linked_calendars {
        (true, true)
    } else {
        (side == Side::Left, side == Side::Right)
    };

    MonthView {
        side,
        month: calendar.month,
        title: format!(
            "{} {}",
            opts.locale.month_name(calendar.month.month()),
            calendar.month.year()
        ),
        weekdays: opts
            .locale
            .weekday_header()
            .into_iter()
            .map(str::to_string)
            .collect(),
        cells: calendar
            .matrix
            .days()
            .iter()
            .map(|date| day_cell(inputs, calendar, *date))
            .collect(),
        can_prev: show_prev && calendars.can_prev(side, opts),
        can_next: show_next && calendars.can_next(side, opts),
        years: (opts.min_year, opts.max_year),
    }
}

fn day_cell(inputs: &ViewInputs, calendar: &CalendarState, date: NaiveDate) -> DayCell {
    let opts = inputs.options;
    let selection = inputs.selection;
    let start = selection.start.date();
    let end = selection.end.map(|e| e.date());

    let mut flags = CellFlags {
        today: date == inputs.today,
        weekend: !is_business_day(date),
        overflow: calendar.matrix.is_overflow(date),
        disabled: !opts.day_in_bounds(date),
        invalid: validate_date(date.and_time(NaiveTime::MIN), &opts.validation).is_err(),
        start: date == start,
        end: end == Some(date),
        focused: inputs.keyboard.focused() == Some(date),
        ..Default::default()
    };
    if let Some(end) = end {
        flags.in_range = date > start && date < end;
    } else if let Some(hover) = selection.hover {
        flags.hover_end = date == hover;
        flags.hover_range = date > start && date < hover;
    }

    let selectable = !flags.disabled && (!flags.overflow || opts.overflow_days_selectable);
    DayCell {
        date,
        flags,
        selectable,
    }
}

fn time_view(value: NaiveDateTime, opts: &ResolvedOptions, disabled: bool) -> TimeView {
    let twenty_four = opts.time_picker_24_hour;
    let selected = TimeInput::from_datetime(value, twenty_four);
    let date = value.date();

    let displayed = if twenty_four { 0..=23 } else { 1..=12 };
    let hours = displayed
        .map(|display| {
            let hour_24 = if twenty_four {
                display
            } else {
                TimeInput {
                    hour: display,
                    ..selected
                }
                .hour_24()
            };
            let top = date.and_hms_opt(hour_24, 0, 0).unwrap_or(value);
            let disabled = opts.min_date.is_some_and(|min| top + Duration::minutes(59) < min)
                || opts.max_date.is_some_and(|max| top > max);
            TimeOption {
                value: display,
                label: format!("{display:02}"),
                disabled,
            }
        })
        .collect();

    let minutes = minute_steps(opts.time_picker_increment_minutes)
        .into_iter()
        .map(|m| TimeOption {
            value: m,
            label: format!("{m:02}"),
            disabled: false,
        })
        .collect();

    let seconds = opts.time_picker_seconds.then(|| {
        (0..60)
            .map(|s| TimeOption {
                value: s,
                label: format!("{s:02}"),
                disabled: false,
            })
            .collect()
    });

    TimeView {
        selected,
        hours,
        minutes,
        seconds,
        meridiem: (!twenty_four).then(|| if value.hour() >= 12 { Meridiem::Pm } else { Meridiem::Am }),
        disabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::date_math::end_of_day;
    use crate::calc::ValidationRules;
    use crate::picker::options::PickerOptions;
    use crate::picker::ranges::NamedRange;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(y: i32, m: u32, day: u32) -> NaiveDateTime {
        d(y, m, day).and_hms_opt(0, 0, 0).unwrap()
    }

    struct Fixture {
        selection: Selection,
        calendars: CalendarPair,
        keyboard: KeyboardNav,
        options: ResolvedOptions,
    }

    impl Fixture {
        fn new(options: PickerOptions, start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
            let options = options.resolve(at(2025, 6, 10)).0;
            let selection = Selection::new(start, end);
            let calendars = CalendarPair::new(&selection, &options);
            Fixture {
                selection,
                calendars,
                keyboard: KeyboardNav::default(),
                options,
            }
        }

        fn view(&self) -> PickerView {
            build_view(&ViewInputs {
                selection: &self.selection,
                calendars: &self.calendars,
                keyboard: &self.keyboard,
                options: &self.options,
                show_calendars: true,
                today: d(2025, 6, 10),
            })
        }
    }

    fn cell(view: &MonthView, date: NaiveDate) -> DayCell {
        view.cells.iter().find(|c| c.date == date).cloned().unwrap()
    }

    #[test]
    fn test_view_has_two_full_months() {
        let fx = Fixture::new(PickerOptions::default(), at(2025, 6, 3), Some(end_of_day(at(2025, 6, 6))));
        let view = fx.view();
        assert_eq!(view.left.cells.len(), 42);
        assert_eq!(view.left.title, "June 2025");
        assert_eq!(view.right.as_ref().unwrap().title, "July 2025");
        assert_eq!(view.left.weekdays[0], "Su");
        assert_eq!(view.left.weeks().count(), 6);
    }

    #[test]
    fn test_range_flags() {
        let fx = Fixture::new(PickerOptions::default(), at(2025, 6, 3), Some(end_of_day(at(2025, 6, 6))));
        let view = fx.view();
        assert!(cell(&view.left, d(2025, 6, 3)).flags.start);
        assert!(cell(&view.left, d(2025, 6, 4)).flags.in_range);
        assert!(cell(&view.left, d(2025, 6, 6)).flags.end);
        assert!(!cell(&view.left, d(2025, 6, 6)).flags.in_range);
        assert!(cell(&view.left, d(2025, 6, 10)).flags.today);
        assert!(cell(&view.left, d(2025, 6, 7)).flags.weekend);
    }

    #[test]
    fn test_hover_flags_while_awaiting_end() {
        let mut fx = Fixture::new(PickerOptions::default(), at(2025, 6, 3), None);
        fx.selection.hover(d(2025, 6, 6));
        let view = fx.view();
        assert!(cell(&view.left, d(2025, 6, 5)).flags.hover_range);
        assert!(cell(&view.left, d(2025, 6, 6)).flags.hover_end);
        assert!(!cell(&view.left, d(2025, 6, 7)).flags.hover_range);
        assert!(!view.apply_enabled);
    }

    #[test]
    fn test_overflow_and_bounds_not_selectable() {
        let fx = Fixture::new(
            PickerOptions {
                min_date: Some(at(2025, 6, 5)),
                ..Default::default()
            },
            at(2025, 6, 10),
            Some(at(2025, 6, 10)),
        );
        let view = fx.view();
        // June 2025 starts on a Sunday, so its overflow days trail into July
        let overflow = cell(&view.left, d(2025, 7, 1));
        assert!(overflow.flags.overflow);
        assert!(!overflow.selectable);
        let early = cell(&view.left, d(2025, 6, 4));
        assert!(early.flags.disabled);
        assert!(!early.selectable);
        assert!(cell(&view.left, d(2025, 6, 5)).selectable);
        assert!(!view.left.can_prev);
    }

    #[test]
    fn test_invalid_flag_from_rules() {
        let fx = Fixture::new(
            PickerOptions {
                validation: ValidationRules {
                    business_days_only: true,
                    ..Default::default()
                },
                ..Default::default()
            },
            at(2025, 6, 10),
            Some(at(2025, 6, 10)),
        );
        let view = fx.view();
        assert!(cell(&view.left, d(2025, 6, 14)).flags.invalid);
        assert!(!cell(&view.left, d(2025, 6, 13)).flags.invalid);
    }

    #[test]
    fn test_linked_arrows_split_between_sides() {
        let fx = Fixture::new(PickerOptions::default(), at(2025, 6, 10), Some(at(2025, 6, 10)));
        let view = fx.view();
        assert!(view.left.can_prev && !view.left.can_next);
        let right = view.right.unwrap();
        assert!(!right.can_prev && right.can_next);
    }

    #[test]
    fn test_ranges_list_marks_active_and_custom() {
        let mut fx = Fixture::new(
            PickerOptions {
                ranges: vec![NamedRange::new("Launch", at(2025, 6, 10), at(2025, 6, 10))],
                ..Default::default()
            },
            at(2025, 6, 10),
            Some(at(2025, 6, 10)),
        );
        fx.selection.chosen_label = Some("Launch".to_string());
        let view = fx.view();
        assert_eq!(view.ranges.len(), 2);
        assert!(view.ranges[0].active);
        assert_eq!(view.ranges[1].label, "Custom Range");
        assert!(!view.ranges[1].active);
    }

    #[test]
    fn test_selected_text_uses_locale() {
        let fx = Fixture::new(PickerOptions::default(), at(2025, 6, 3), Some(end_of_day(at(2025, 6, 6))));
        assert_eq!(fx.view().selected_text, "06/03/2025 - 06/06/2025");
        let open = Fixture::new(PickerOptions::default(), at(2025, 6, 3), None);
        assert_eq!(open.view().selected_text, "06/03/2025");
    }

    #[test]
    fn test_time_views() {
        let fx = Fixture::new(
            PickerOptions {
                time_picker: true,
                time_picker_24_hour: false,
                time_picker_increment_minutes: 15,
                ..Default::default()
            },
            d(2025, 6, 3).and_hms_opt(13, 30, 0).unwrap(),
            None,
        );
        let view = fx.view();
        let left = view.left_time.unwrap();
        assert_eq!(left.hours.len(), 12);
        assert_eq!(left.minutes.len(), 4);
        assert_eq!(left.meridiem, Some(Meridiem::Pm));
        assert_eq!(left.selected.hour, 1);
        assert!(left.seconds.is_none());
        assert!(view.right_time.unwrap().disabled);
    }

    #[test]
    fn test_hours_disabled_before_min_date() {
        let fx = Fixture::new(
            PickerOptions {
                time_picker: true,
                min_date: Some(d(2025, 6, 3).and_hms_opt(9, 30, 0).unwrap()),
                ..Default::default()
            },
            d(2025, 6, 3).and_hms_opt(10, 0, 0).unwrap(),
            None,
        );
        let hours = fx.view().left_time.unwrap().hours;
        assert!(hours[8].disabled);
        assert!(!hours[9].disabled);
    }
}
