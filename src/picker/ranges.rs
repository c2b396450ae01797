use crate::calc::date_math::{
    add_days, end_of_day, end_of_month, first_of_month, is_same_date, start_of_week, DateUnit,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A preset shown in the range list. Order of insertion is display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedRange {
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl NamedRange {
    pub fn new(label: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        NamedRange {
            label: label.to_string(),
            start,
            end,
        }
    }

    /// Whole days covered, counting both endpoints.
    pub fn span_days(&self) -> i64 {
        (self.end.date() - self.start.date()).num_days().abs() + 1
    }

    fn matches(&self, start: NaiveDateTime, end: Option<NaiveDateTime>) -> bool {
        let end = end.unwrap_or(start);
        is_same_date(&start, &self.start, DateUnit::Day) && is_same_date(&end, &self.end, DateUnit::Day)
    }
}

/// Label attributed to the selection: the widest preset whose endpoints
/// match at day level (first wins on ties), else `custom_label`.
pub fn chosen_label(
    ranges: &[NamedRange],
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
    custom_label: Option<&str>,
) -> Option<String> {
    let mut best: Option<&NamedRange> = None;
    for range in ranges.iter().filter(|r| r.matches(start, end)) {
        if best.is_none_or(|b| range.span_days() > b.span_days()) {
            best = Some(range);
        }
    }
    best.map(|r| r.label.clone())
        .or_else(|| custom_label.map(str::to_string))
}

pub fn find_range<'a>(ranges: &'a [NamedRange], label: &str) -> Option<&'a NamedRange> {
    ranges.iter().find(|r| r.label == label)
}

fn whole_days(label: &str, start: NaiveDate, end: NaiveDate) -> NamedRange {
    NamedRange::new(
        label,
        start.and_time(NaiveTime::MIN),
        end_of_day(end.and_time(NaiveTime::MIN)),
    )
}

/// The stock preset list relative to `today`.
pub fn common_ranges(today: NaiveDate) -> Vec<NamedRange> {
    let yesterday = add_days(today, -1);
    let week_start = start_of_week(today, 0);
    vec![
        whole_days("Today", today, today),
        whole_days("Yesterday", yesterday, yesterday),
        whole_days("Last 7 Days", add_days(today, -6), today),
        whole_days("Last 30 Days", add_days(today, -29), today),
        whole_days("This Month", first_of_month(today), end_of_month(today)),
        whole_days("This Week", week_start, add_days(week_start, 6)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(y: i32, m: u32, day: u32) -> NaiveDateTime {
        d(y, m, day).and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_today_label_matches_default_selection() {
        let today = d(2025, 6, 10);
        let ranges = common_ranges(today);
        let label = chosen_label(&ranges, at(2025, 6, 10), Some(end_of_day(at(2025, 6, 10))), None);
        assert_eq!(label.as_deref(), Some("Today"));
    }

    #[test]
    fn test_open_end_matches_single_day_range() {
        let ranges = vec![NamedRange::new("Launch", at(2025, 3, 1), at(2025, 3, 1))];
        let label = chosen_label(&ranges, at(2025, 3, 1), None, Some("Custom Range"));
        assert_eq!(label.as_deref(), Some("Launch"));
    }

    #[test]
    fn test_no_match_falls_back_to_custom_label() {
        let ranges = common_ranges(d(2025, 6, 10));
        let start = at(2025, 1, 1);
        let end = Some(at(2025, 1, 9));
        assert_eq!(
            chosen_label(&ranges, start, end, Some("Custom Range")).as_deref(),
            Some("Custom Range")
        );
        assert_eq!(chosen_label(&ranges, start, end, None), None);
    }

    #[test]
    fn test_first_match_wins_on_equal_span() {
        let ranges = vec![
            NamedRange::new("A", at(2025, 3, 1), at(2025, 3, 5)),
            NamedRange::new("B", at(2025, 3, 1), at(2025, 3, 5)),
        ];
        let label = chosen_label(&ranges, at(2025, 3, 1), Some(at(2025, 3, 5)), None);
        assert_eq!(label.as_deref(), Some("A"));
    }

    #[test]
    fn test_common_ranges_shapes() {
        // 2025-06-11 is a Wednesday
        let ranges = common_ranges(d(2025, 6, 11));
        let labels: Vec<_> = ranges.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Today", "Yesterday", "Last 7 Days", "Last 30 Days", "This Month", "This Week"]
        );
        assert_eq!(ranges[2].span_days(), 7);
        assert_eq!(ranges[3].span_days(), 30);
        assert_eq!(ranges[4].start.date(), d(2025, 6, 1));
        assert_eq!(ranges[4].end.date(), d(2025, 6, 30));
        assert_eq!(ranges[5].start.date(), d(2025, 6, 8));
        assert_eq!(ranges[5].end.date(), d(2025, 6, 14));
    }

    #[test]
    fn test_find_range() {
        let ranges = common_ranges(d(2025, 6, 11));
        assert!(find_range(&ranges, "Yesterday").is_some());
        assert!(find_range(&ranges, "Tomorrow").is_none());
    }
}
