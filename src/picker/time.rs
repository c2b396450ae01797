use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub fn label(&self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

/// Time-of-day as shown in a side's selectors. `hour` is 0..=23 when
/// `meridiem` is `None`, 1..=12 otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeInput {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub meridiem: Option<Meridiem>,
}

impl TimeInput {
    pub fn new(hour: u32, minute: u32) -> Self {
        TimeInput {
            hour,
            minute,
            second: 0,
            meridiem: None,
        }
    }

    pub fn with_seconds(mut self, second: u32) -> Self {
        self.second = second;
        self
    }

    pub fn with_meridiem(mut self, meridiem: Meridiem) -> Self {
        self.meridiem = Some(meridiem);
        self
    }

    /// Reads the selectors' view of `value` in 12- or 24-hour form.
    pub fn from_datetime(value: NaiveDateTime, twenty_four_hour: bool) -> Self {
        let hour = value.hour();
        if twenty_four_hour {
            return TimeInput::new(hour, value.minute()).with_seconds(value.second());
        }
        let meridiem = if hour >= 12 { Meridiem::Pm } else { Meridiem::Am };
        let display = match hour % 12 {
            0 => 12,
            h => h,
        };
        TimeInput::new(display, value.minute())
            .with_seconds(value.second())
            .with_meridiem(meridiem)
    }

    pub fn hour_24(&self) -> u32 {
        match self.meridiem {
            Some(Meridiem::Pm) if self.hour < 12 => self.hour + 12,
            Some(Meridiem::Am) if self.hour == 12 => 0,
            _ => self.hour,
        }
    }

    /// Places this time on `date`. Out-of-range fields yield `None`.
    pub fn on_date(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        let time = NaiveTime::from_hms_opt(self.hour_24(), self.minute, self.second)?;
        Some(date.and_time(time))
    }
}

/// Rounds the minutes to the nearest multiple of `increment`, half up.
/// A result that would spill into the next day is rounded down instead.
pub fn round_to_increment(value: NaiveDateTime, increment: u32) -> NaiveDateTime {
    if increment <= 1 {
        return value;
    }
    let minute = value.minute();
    let rounded = (minute * 2 + increment) / (2 * increment) * increment;
    let base = value.with_minute(0).unwrap_or(value);
    let up = base + Duration::minutes(rounded as i64);
    if up.date() == value.date() {
        up
    } else {
        base + Duration::minutes((minute / increment * increment) as i64)
    }
}

/// Minute choices offered by the selector for a given increment.
pub fn minute_steps(increment: u32) -> Vec<u32> {
    let step = increment.clamp(1, 60) as usize;
    (0..60).step_by(step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_round_to_nearest_quarter_hour() {
        assert_eq!(round_to_increment(at(9, 7), 15), at(9, 0));
        assert_eq!(round_to_increment(at(9, 8), 15), at(9, 15));
        assert_eq!(round_to_increment(at(9, 53), 15), at(10, 0));
    }

    #[test]
    fn test_round_never_leaves_off_increment_minutes() {
        for minute in 0..60 {
            let rounded = round_to_increment(at(10, minute), 15);
            assert_eq!(rounded.minute() % 15, 0, "minute {minute}");
        }
    }

    #[test]
    fn test_round_does_not_cross_midnight() {
        let late = at(23, 59);
        let rounded = round_to_increment(late, 15);
        assert_eq!(rounded, at(23, 45));
    }

    #[test]
    fn test_round_with_unit_increment_is_identity() {
        assert_eq!(round_to_increment(at(7, 31), 1), at(7, 31));
    }

    #[test]
    fn test_twelve_hour_conversion() {
        assert_eq!(TimeInput::new(12, 0).with_meridiem(Meridiem::Am).hour_24(), 0);
        assert_eq!(TimeInput::new(12, 0).with_meridiem(Meridiem::Pm).hour_24(), 12);
        assert_eq!(TimeInput::new(3, 0).with_meridiem(Meridiem::Pm).hour_24(), 15);
        assert_eq!(TimeInput::new(15, 0).hour_24(), 15);
    }

    #[test]
    fn test_from_datetime_twelve_hour() {
        let t = TimeInput::from_datetime(at(0, 30), false);
        assert_eq!(t.hour, 12);
        assert_eq!(t.meridiem, Some(Meridiem::Am));
        let t = TimeInput::from_datetime(at(13, 5), false);
        assert_eq!((t.hour, t.minute, t.meridiem), (1, 5, Some(Meridiem::Pm)));
    }

    #[test]
    fn test_on_date_rejects_bad_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert_eq!(TimeInput::new(9, 30).on_date(date), Some(at(9, 30)));
        assert_eq!(TimeInput::new(24, 0).on_date(date), None);
        assert_eq!(TimeInput::new(9, 60).on_date(date), None);
    }

    #[test]
    fn test_minute_steps() {
        assert_eq!(minute_steps(15), vec![0, 15, 30, 45]);
        assert_eq!(minute_steps(1).len(), 60);
        assert_eq!(minute_steps(0).len(), 60);
    }
}
