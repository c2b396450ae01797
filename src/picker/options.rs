use crate::calc::date_math::{days_between, end_of_day, start_of_day};
use crate::calc::{validate_range, ValidationError, ValidationRules};
use crate::data::locale::Locale;
use crate::picker::events::PickerHooks;
use crate::picker::host::{Drops, Opens};
use crate::picker::ranges::NamedRange;
use crate::picker::time::round_to_increment;
use crate::theme::Theme;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Construction options. `Default` carries the documented defaults; dates
/// left as `None` resolve against the construction time.
#[derive(Debug)]
pub struct PickerOptions {
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub min_date: Option<NaiveDateTime>,
    pub max_date: Option<NaiveDateTime>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub max_span_days: Option<i64>,
    pub auto_apply: bool,
    pub single_date_picker: bool,
    pub linked_calendars: bool,
    pub auto_update_input: bool,
    pub show_custom_range_label: bool,
    pub always_show_calendars: bool,
    pub time_picker: bool,
    pub time_picker_24_hour: bool,
    pub time_picker_increment_minutes: u32,
    pub time_picker_seconds: bool,
    /// An earlier day while awaiting the end restarts the range instead of
    /// becoming its start.
    pub restart_on_earlier_date: bool,
    pub overflow_days_selectable: bool,
    pub ranges: Vec<NamedRange>,
    pub locale: Option<Locale>,
    pub validation: ValidationRules,
    pub opens: Opens,
    pub drops: Drops,
    pub theme: Theme,
    pub events: PickerHooks,
}

impl Default for PickerOptions {
    fn default() -> Self {
        PickerOptions {
            start_date: None,
            end_date: None,
            min_date: None,
            max_date: None,
            min_year: None,
            max_year: None,
            max_span_days: None,
            auto_apply: false,
            single_date_picker: false,
            linked_calendars: true,
            auto_update_input: true,
            show_custom_range_label: true,
            always_show_calendars: false,
            time_picker: false,
            time_picker_24_hour: true,
            time_picker_increment_minutes: 1,
            time_picker_seconds: false,
            restart_on_earlier_date: false,
            overflow_days_selectable: false,
            ranges: Vec::new(),
            locale: None,
            validation: ValidationRules::default(),
            opens: Opens::default(),
            drops: Drops::default(),
            theme: Theme::default(),
            events: PickerHooks::default(),
        }
    }
}

/// Options after defaulting and repair. Never changes after construction
/// except for wholesale replacement of `validation`, `ranges` and `theme`.
#[derive(Clone, Debug)]
pub struct ResolvedOptions {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub min_date: Option<NaiveDateTime>,
    pub max_date: Option<NaiveDateTime>,
    pub min_year: i32,
    pub max_year: i32,
    pub max_span_days: Option<i64>,
    pub auto_apply: bool,
    pub single_date_picker: bool,
    pub linked_calendars: bool,
    pub auto_update_input: bool,
    pub show_custom_range_label: bool,
    pub always_show_calendars: bool,
    pub time_picker: bool,
    pub time_picker_24_hour: bool,
    pub time_picker_increment_minutes: u32,
    pub time_picker_seconds: bool,
    pub restart_on_earlier_date: bool,
    pub overflow_days_selectable: bool,
    pub ranges: Vec<NamedRange>,
    pub locale: Locale,
    pub validation: ValidationRules,
    pub opens: Opens,
    pub drops: Drops,
    pub theme: Theme,
}

impl PickerOptions {
    pub fn resolve(self, now: NaiveDateTime) -> (ResolvedOptions, PickerHooks) {
        let mut min_date = self.min_date;
        let mut max_date = self.max_date;
        if let (Some(min), Some(max)) = (min_date, max_date) {
            if min > max {
                (min_date, max_date) = (Some(max), Some(min));
            }
        }

        let mut min_year = self.min_year.unwrap_or(now.year() - 100);
        let mut max_year = self.max_year.unwrap_or(now.year() + 100);
        if min_year > max_year {
            std::mem::swap(&mut min_year, &mut max_year);
        }
        if let Some(min) = min_date {
            min_year = min_year.max(min.year());
        }
        if let Some(max) = max_date {
            max_year = max_year.min(max.year());
        }
        if min_year > max_year {
            std::mem::swap(&mut min_year, &mut max_year);
        }

        let auto_apply = self.auto_apply && !self.time_picker;

        let mut resolved = ResolvedOptions {
            start_date: now,
            end_date: now,
            min_date,
            max_date,
            min_year,
            max_year,
            max_span_days: self.max_span_days.filter(|days| *days >= 0),
            auto_apply,
            single_date_picker: self.single_date_picker,
            linked_calendars: self.linked_calendars,
            auto_update_input: self.auto_update_input,
            show_custom_range_label: self.show_custom_range_label,
            always_show_calendars: self.always_show_calendars,
            time_picker: self.time_picker,
            time_picker_24_hour: self.time_picker_24_hour,
            time_picker_increment_minutes: self.time_picker_increment_minutes.clamp(1, 60),
            time_picker_seconds: self.time_picker_seconds,
            restart_on_earlier_date: self.restart_on_earlier_date,
            overflow_days_selectable: self.overflow_days_selectable,
            ranges: self.ranges,
            locale: self.locale.unwrap_or_default().normalized(),
            validation: self.validation,
            opens: self.opens,
            drops: self.drops,
            theme: self.theme,
        };

        let start = resolved.normalize_start(self.start_date.unwrap_or(now));
        let mut end = resolved.normalize_end(self.end_date.unwrap_or(now));
        if end < start {
            end = resolved.normalize_end(start);
            if end < start {
                end = start;
            }
        }
        resolved.start_date = start;
        resolved.end_date = end;
        (resolved, self.events)
    }
}

impl ResolvedOptions {
    /// Start values snap to the start of the day, or to the minute
    /// increment when times are picked.
    pub fn normalize_start(&self, value: NaiveDateTime) -> NaiveDateTime {
        if self.time_picker {
            self.normalize_time(value)
        } else {
            start_of_day(value)
        }
    }

    pub fn normalize_end(&self, value: NaiveDateTime) -> NaiveDateTime {
        if self.time_picker {
            self.normalize_time(value)
        } else {
            end_of_day(value)
        }
    }

    fn normalize_time(&self, value: NaiveDateTime) -> NaiveDateTime {
        let mut value = value.with_nanosecond(0).unwrap_or(value);
        if !self.time_picker_seconds {
            value = value.with_second(0).unwrap_or(value);
        }
        round_to_increment(value, self.time_picker_increment_minutes)
    }

    /// Day-level check against `min_date`/`max_date`.
    pub fn day_in_bounds(&self, date: NaiveDate) -> bool {
        self.min_date.is_none_or(|min| date >= min.date())
            && self.max_date.is_none_or(|max| date <= max.date())
    }

    /// Exact check against `min_date`/`max_date`.
    pub fn time_in_bounds(&self, value: NaiveDateTime) -> bool {
        self.min_date.is_none_or(|min| value >= min) && self.max_date.is_none_or(|max| value <= max)
    }

    pub fn clamp(&self, mut value: NaiveDateTime) -> NaiveDateTime {
        if let Some(min) = self.min_date {
            value = value.max(min);
        }
        if let Some(max) = self.max_date {
            value = value.min(max);
        }
        value
    }

    /// Range rules plus the `max_span_days` limit.
    pub fn check_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<(), ValidationError> {
        validate_range(start, end, &self.validation)?;
        if let Some(max) = self.max_span_days {
            if days_between(start, end) > max {
                return Err(ValidationError::MaxSpanExceeded(max));
            }
        }
        Ok(())
    }

    pub fn custom_label(&self) -> Option<&str> {
        self.show_custom_range_label
            .then_some(self.locale.custom_range_label.as_str())
    }

    pub fn year_in_range(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, day: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, day)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2025, 6, 10, 14, 37)
    }

    #[test]
    fn test_defaults_resolve_to_today() {
        let (opts, _) = PickerOptions::default().resolve(now());
        assert_eq!(opts.start_date, at(2025, 6, 10, 0, 0));
        assert_eq!(opts.end_date, end_of_day(now()));
        assert_eq!((opts.min_year, opts.max_year), (1925, 2125));
        assert!(opts.linked_calendars);
        assert!(opts.auto_update_input);
        assert_eq!(opts.locale, Locale::english());
        assert_eq!(opts.custom_label(), Some("Custom Range"));
    }

    #[test]
    fn test_time_picker_disables_auto_apply() {
        let (opts, _) = PickerOptions {
            time_picker: true,
            auto_apply: true,
            ..Default::default()
        }
        .resolve(now());
        assert!(!opts.auto_apply);
        assert!(opts.time_picker);
    }

    #[test]
    fn test_increment_is_clamped() {
        let (opts, _) = PickerOptions {
            time_picker_increment_minutes: 0,
            ..Default::default()
        }
        .resolve(now());
        assert_eq!(opts.time_picker_increment_minutes, 1);
        let (opts, _) = PickerOptions {
            time_picker_increment_minutes: 500,
            ..Default::default()
        }
        .resolve(now());
        assert_eq!(opts.time_picker_increment_minutes, 60);
    }

    #[test]
    fn test_time_mode_rounds_initial_values() {
        let (opts, _) = PickerOptions {
            time_picker: true,
            time_picker_increment_minutes: 15,
            ..Default::default()
        }
        .resolve(now());
        assert_eq!(opts.start_date, at(2025, 6, 10, 14, 30));
        assert_eq!(opts.end_date, at(2025, 6, 10, 14, 30));
    }

    #[test]
    fn test_end_before_start_is_raised() {
        let (opts, _) = PickerOptions {
            start_date: Some(at(2025, 6, 10, 0, 0)),
            end_date: Some(at(2025, 6, 1, 0, 0)),
            ..Default::default()
        }
        .resolve(now());
        assert_eq!(opts.end_date.date(), opts.start_date.date());
        assert!(opts.end_date >= opts.start_date);
    }

    #[test]
    fn test_year_range_swapped_and_narrowed() {
        let (opts, _) = PickerOptions {
            min_year: Some(2030),
            max_year: Some(2000),
            min_date: Some(at(2010, 1, 1, 0, 0)),
            ..Default::default()
        }
        .resolve(now());
        assert_eq!((opts.min_year, opts.max_year), (2010, 2030));
        assert!(opts.year_in_range(2020));
        assert!(!opts.year_in_range(2031));
    }

    #[test]
    fn test_bad_locale_is_repaired() {
        let locale = Locale {
            month_names: vec!["Only".to_string()],
            first_day: 9,
            ..Locale::english()
        };
        let (opts, _) = PickerOptions {
            locale: Some(locale),
            ..Default::default()
        }
        .resolve(now());
        assert_eq!(opts.locale.month_names.len(), 12);
        assert_eq!(opts.locale.first_day, 2);
    }

    #[test]
    fn test_bounds_and_clamp() {
        let (opts, _) = PickerOptions {
            min_date: Some(at(2025, 6, 5, 12, 0)),
            max_date: Some(at(2025, 6, 20, 12, 0)),
            ..Default::default()
        }
        .resolve(now());
        let day = |d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
        assert!(opts.day_in_bounds(day(5)));
        assert!(!opts.day_in_bounds(day(4)));
        assert!(!opts.day_in_bounds(day(21)));
        assert!(!opts.time_in_bounds(at(2025, 6, 5, 11, 0)));
        assert_eq!(opts.clamp(at(2025, 7, 1, 0, 0)), at(2025, 6, 20, 12, 0));
    }

    #[test]
    fn test_check_range_max_span() {
        let (opts, _) = PickerOptions {
            max_span_days: Some(5),
            ..Default::default()
        }
        .resolve(now());
        let start = at(2025, 6, 1, 0, 0);
        assert_eq!(
            opts.check_range(start, end_of_day(at(2025, 6, 9, 0, 0))),
            Err(ValidationError::MaxSpanExceeded(5))
        );
        assert!(opts.check_range(start, end_of_day(at(2025, 6, 5, 0, 0))).is_ok());
    }
}
