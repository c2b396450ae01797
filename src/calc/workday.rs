use chrono::{Datelike, NaiveDate, Weekday};

/// Returns true for Monday–Friday, false for Saturday/Sunday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts weekdays in [start, end] inclusive. Zero when `end < start`.
pub fn count_business_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut count = 0;
    let mut current = start;
    while current <= end {
        if is_business_day(current) {
            count += 1;
        }
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    count
}

/// Moves forward `days` weekdays from `date`, skipping weekends.
pub fn add_business_days(date: NaiveDate, days: u32) -> NaiveDate {
    let mut result = date;
    let mut added = 0;
    while added < days {
        result = match result.succ_opt() {
            Some(next) => next,
            None => return result,
        };
        if is_business_day(result) {
            added += 1;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_is_business_day_for_each_weekday() {
        // 2025-01-06 is Monday
        let monday = d(2025, 1, 6);
        assert!(is_business_day(monday));
        assert!(is_business_day(d(2025, 1, 7)));
        assert!(is_business_day(d(2025, 1, 8)));
        assert!(is_business_day(d(2025, 1, 9)));
        assert!(is_business_day(d(2025, 1, 10)));
    }

    #[test]
    fn test_is_not_business_day_for_weekend() {
        assert!(!is_business_day(d(2025, 1, 11)));
        assert!(!is_business_day(d(2025, 1, 12)));
    }

    #[test]
    fn test_count_excludes_weekends() {
        // Mon 2025-01-06 .. Sun 2025-01-12
        assert_eq!(count_business_days(d(2025, 1, 6), d(2025, 1, 12)), 5);
    }

    #[test]
    fn test_count_inclusive_range() {
        assert_eq!(count_business_days(d(2025, 1, 6), d(2025, 1, 6)), 1);
        assert_eq!(count_business_days(d(2025, 1, 6), d(2025, 1, 20)), 11);
    }

    #[test]
    fn test_count_reversed_range_is_zero() {
        assert_eq!(count_business_days(d(2025, 1, 10), d(2025, 1, 6)), 0);
    }

    #[test]
    fn test_add_business_days_skips_weekend() {
        // Friday + 1 business day = Monday
        assert_eq!(add_business_days(d(2025, 1, 10), 1), d(2025, 1, 13));
        assert_eq!(add_business_days(d(2025, 1, 6), 5), d(2025, 1, 13));
        assert_eq!(add_business_days(d(2025, 1, 6), 0), d(2025, 1, 6));
    }
}
