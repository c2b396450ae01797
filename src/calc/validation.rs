use crate::calc::date_math::{days_between, weekday_index};
use crate::calc::workday::is_business_day;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Why a date or range was rejected. `code()` is the stable identifier hosts
/// branch on; `Display` is the human message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("this date is disabled")]
    DisabledDate,
    #[error("{} is disabled", weekday_name(.0))]
    DisabledDayOfWeek(u32),
    #[error("only business days are allowed")]
    BusinessDaysOnly,
    #[error("holidays are disabled")]
    HolidayDisabled,
    #[error("this date is outside the allowed ranges")]
    OutsideEnabledRange,
    #[error("this date does not satisfy the custom rule")]
    CustomValidationFailed,
    #[error("there must be at least {0} days between the dates")]
    MinDaysBetween(i64),
    #[error("there can be at most {0} days between the dates")]
    MaxDaysBetween(i64),
    #[error("the range may not span more than {0} days")]
    MaxSpanExceeded(i64),
    #[error("the date is outside the selectable bounds")]
    OutOfBounds,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::DisabledDate => "DISABLED_DATE",
            ValidationError::DisabledDayOfWeek(_) => "DISABLED_DAY_OF_WEEK",
            ValidationError::BusinessDaysOnly => "BUSINESS_DAYS_ONLY",
            ValidationError::HolidayDisabled => "HOLIDAY_DISABLED",
            ValidationError::OutsideEnabledRange => "OUTSIDE_ENABLED_RANGE",
            ValidationError::CustomValidationFailed => "CUSTOM_VALIDATION_FAILED",
            ValidationError::MinDaysBetween(_) => "MIN_DAYS_BETWEEN",
            ValidationError::MaxDaysBetween(_) => "MAX_DAYS_BETWEEN",
            ValidationError::MaxSpanExceeded(_) => "MAX_SPAN_EXCEEDED",
            ValidationError::OutOfBounds => "OUT_OF_BOUNDS",
        }
    }
}

fn weekday_name(index: &u32) -> &'static str {
    match *index {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}

pub type Predicate = Rc<dyn Fn(NaiveDateTime) -> bool>;

/// Rule set consulted before any date enters the selection. Replaced as a whole,
/// never edited by the picker.
#[derive(Clone, Default)]
pub struct ValidationRules {
    pub disabled_dates: BTreeSet<NaiveDate>,
    /// Sunday-based weekday numbers, 0..=6.
    pub disabled_weekdays: BTreeSet<u32>,
    pub business_days_only: bool,
    pub min_days_between: Option<i64>,
    pub max_days_between: Option<i64>,
    pub custom: Option<Predicate>,
    pub holidays: BTreeSet<NaiveDate>,
    /// Inclusive, compared by calendar day. Empty means unrestricted.
    pub enabled_ranges: Vec<(NaiveDate, NaiveDate)>,
}

impl fmt::Debug for ValidationRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRules")
            .field("disabled_dates", &self.disabled_dates)
            .field("disabled_weekdays", &self.disabled_weekdays)
            .field("business_days_only", &self.business_days_only)
            .field("min_days_between", &self.min_days_between)
            .field("max_days_between", &self.max_days_between)
            .field("custom", &self.custom.is_some())
            .field("holidays", &self.holidays)
            .field("enabled_ranges", &self.enabled_ranges)
            .finish()
    }
}

impl ValidationRules {
    pub fn with_custom(mut self, predicate: impl Fn(NaiveDateTime) -> bool + 'static) -> Self {
        self.custom = Some(Rc::new(predicate));
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    fn in_enabled_ranges(&self, date: NaiveDate) -> bool {
        self.enabled_ranges.is_empty()
            || self
                .enabled_ranges
                .iter()
                .any(|(start, end)| date >= *start && date <= *end)
    }
}

/// Checks a single date. The first failing rule wins.
pub fn validate_date(date: NaiveDateTime, rules: &ValidationRules) -> Result<(), ValidationError> {
    let day = date.date();
    if rules.disabled_dates.contains(&day) {
        return Err(ValidationError::DisabledDate);
    }
    let weekday = weekday_index(day);
    if rules.disabled_weekdays.contains(&weekday) {
        return Err(ValidationError::DisabledDayOfWeek(weekday));
    }
    if rules.business_days_only && !is_business_day(day) {
        return Err(ValidationError::BusinessDaysOnly);
    }
    if rules.is_holiday(day) {
        return Err(ValidationError::HolidayDisabled);
    }
    if !rules.in_enabled_ranges(day) {
        return Err(ValidationError::OutsideEnabledRange);
    }
    if let Some(predicate) = &rules.custom {
        if !predicate(date) {
            return Err(ValidationError::CustomValidationFailed);
        }
    }
    Ok(())
}

/// Checks both endpoints, then the span limits.
pub fn validate_range(
    start: NaiveDateTime,
    end: NaiveDateTime,
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    validate_date(start, rules)?;
    validate_date(end, rules)?;

    let span = days_between(start, end);
    if let Some(min) = rules.min_days_between {
        if span < min {
            return Err(ValidationError::MinDaysBetween(min));
        }
    }
    if let Some(max) = rules.max_days_between {
        if span > max {
            return Err(ValidationError::MaxDaysBetween(max));
        }
    }
    Ok(())
}
