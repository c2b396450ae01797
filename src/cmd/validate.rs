use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use datex::calc::{count_business_days, days_between, validate_date, ValidationError};
use datex::data::{HolidayData, Persistable, PickerConfig};
use datex::picker::ResolvedOptions;
use serde::Serialize;

/// Outcome of checking a date or range against the configured rules.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub(crate) struct Report {
    start: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<NaiveDate>,
    valid: bool,
    code: Option<&'static str>,
    message: Option<String>,
    days: i64,
    business_days: u32,
}

pub fn run(start: &str, end: Option<&str>, json: bool) -> Result<()> {
    let config = PickerConfig::load()?;
    let holidays = HolidayData::load()?;
    let now = Local::now().naive_local();
    let (options, _) = config.to_options(now.date(), &holidays).resolve(now);

    let start = parse_arg(start)?;
    let end = end.map(parse_arg).transpose()?;
    let report = check(start, end, &options);
    write_report(&report, json, &mut std::io::stdout())
}

fn parse_arg(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("'{text}' is not a YYYY-MM-DD date"))
}

/// Checks the min/max bounds, the day rules and, for a range, the span
/// rules. Endpoints given in reverse are swapped first.
pub(crate) fn check(start: NaiveDate, end: Option<NaiveDate>, opts: &ResolvedOptions) -> Report {
    let (first, last) = match end {
        Some(end) if end < start => (end, start),
        Some(end) => (start, end),
        None => (start, start),
    };
    let from = opts.normalize_start(first.and_time(NaiveTime::MIN));
    let to = opts.normalize_end(last.and_time(NaiveTime::MIN));

    let outcome = if !opts.day_in_bounds(first) || !opts.day_in_bounds(last) {
        Err(ValidationError::OutOfBounds)
    } else if end.is_some() {
        opts.check_range(from, to)
    } else {
        validate_date(from, &opts.validation)
    };

    let error = outcome.err();
    Report {
        start: first,
        end: end.map(|_| last),
        valid: error.is_none(),
        code: error.map(|e| e.code()),
        message: error.map(|e| e.to_string()),
        days: days_between(from, to),
        business_days: count_business_days(first, last),
    }
}

pub(crate) fn write_report<W: std::io::Write>(
    report: &Report,
    json: bool,
    out: &mut W,
) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        return Ok(());
    }

    match report.end {
        Some(end) => writeln!(out, "Range: [{} - {}]", report.start, end)?,
        None => writeln!(out, "Date: {}", report.start)?,
    }
    writeln!(out, "---")?;
    match (report.code, &report.message) {
        (Some(code), Some(message)) => {
            writeln!(out, "{:<16} invalid ({})", "Status:", code)?;
            writeln!(out, "{:<16} {}", "Reason:", message)?;
        }
        _ => writeln!(out, "{:<16} valid", "Status:")?,
    }
    if report.end.is_some() {
        writeln!(out, "{:<16} {}", "Days:", report.days)?;
        writeln!(out, "{:<16} {}", "Business days:", report.business_days)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datex::calc::ValidationRules;
    use datex::picker::PickerOptions;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn resolved(options: PickerOptions) -> ResolvedOptions {
        options
            .resolve(d(2025, 6, 10).and_hms_opt(9, 0, 0).unwrap())
            .0
    }

    fn render(report: &Report, json: bool) -> String {
        let mut buf = Vec::new();
        write_report(report, json, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_parse_arg_rejects_other_formats() {
        assert_eq!(parse_arg("2025-06-02").unwrap(), d(2025, 6, 2));
        let err = parse_arg("06/02/2025").unwrap_err();
        assert!(err.to_string().contains("06/02/2025"));
    }

    #[test]
    fn test_valid_week_counts_days() {
        let report = check(d(2025, 6, 2), Some(d(2025, 6, 8)), &resolved(PickerOptions::default()));
        assert!(report.valid);
        assert_eq!(report.days, 7);
        assert_eq!(report.business_days, 5);
        let out = render(&report, false);
        assert!(out.contains("Range: [2025-06-02 - 2025-06-08]"));
        assert!(out.contains("valid"));
        assert!(out.contains("Business days:   5"));
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let report = check(d(2025, 6, 8), Some(d(2025, 6, 2)), &resolved(PickerOptions::default()));
        assert_eq!(report.start, d(2025, 6, 2));
        assert_eq!(report.end, Some(d(2025, 6, 8)));
    }

    #[test]
    fn test_weekend_rejected_with_business_days_only() {
        let opts = resolved(PickerOptions {
            validation: ValidationRules {
                business_days_only: true,
                ..Default::default()
            },
            ..Default::default()
        });
        let report = check(d(2025, 6, 7), None, &opts);
        assert!(!report.valid);
        assert_eq!(report.code, Some("BUSINESS_DAYS_ONLY"));
        let out = render(&report, false);
        assert!(out.contains("Date: 2025-06-07"));
        assert!(out.contains("invalid (BUSINESS_DAYS_ONLY)"));
        assert!(!out.contains("Days:"));
    }

    #[test]
    fn test_span_limit_reported() {
        let opts = resolved(PickerOptions {
            max_span_days: Some(3),
            ..Default::default()
        });
        let report = check(d(2025, 6, 2), Some(d(2025, 6, 8)), &opts);
        assert_eq!(report.code, Some("MAX_SPAN_EXCEEDED"));
    }

    #[test]
    fn test_outside_bounds() {
        let opts = resolved(PickerOptions {
            min_date: Some(d(2025, 6, 5).and_hms_opt(0, 0, 0).unwrap()),
            ..Default::default()
        });
        let report = check(d(2025, 6, 2), Some(d(2025, 6, 8)), &opts);
        assert_eq!(report.code, Some("OUT_OF_BOUNDS"));
    }

    #[test]
    fn test_json_report() {
        let report = check(d(2025, 6, 2), None, &resolved(PickerOptions::default()));
        let out = render(&report, true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["start"], "2025-06-02");
        assert_eq!(value["valid"], true);
        assert!(value["code"].is_null());
        assert!(value.get("end").is_none());
    }
}
