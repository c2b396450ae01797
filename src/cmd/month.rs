use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use datex::calc::build_month_matrix;
use datex::data::{HolidayData, Locale, Persistable, PickerConfig};

pub fn run(month: &str) -> Result<()> {
    let config = PickerConfig::load()?;
    let holidays = HolidayData::load()?;
    let anchor = parse_month(month)?;
    write_month(anchor, &config.locale(), &holidays, &mut std::io::stdout())
}

/// Accepts `YYYY-MM`.
fn parse_month(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", text.trim()), "%Y-%m-%d")
        .with_context(|| format!("'{text}' is not a YYYY-MM month"))
}

/// Prints the 6×7 grid. Days from the neighbouring months are shown in
/// parentheses; holidays carry a trailing `*`.
pub(crate) fn write_month<W: std::io::Write>(
    month: NaiveDate,
    locale: &Locale,
    holidays: &HolidayData,
    out: &mut W,
) -> Result<()> {
    let matrix = build_month_matrix(month, locale.first_day);
    let title = format!("{} {}", locale.month_name(month.month()), month.year());
    writeln!(out, "{:^28}", title)?;

    let header: Vec<String> = locale
        .weekday_header()
        .iter()
        .map(|day| format!(" {:<3}", day.chars().take(2).collect::<String>()))
        .collect();
    writeln!(out, "{}", header.concat().trim_end())?;

    for week in matrix.weeks() {
        let row: String = week
            .iter()
            .map(|date| {
                if matrix.is_overflow(*date) {
                    format!("({:>2})", date.day())
                } else if holidays.lookup(*date).is_some() {
                    format!(" {:>2}*", date.day())
                } else {
                    format!(" {:>2} ", date.day())
                }
            })
            .collect();
        writeln!(out, "{}", row.trim_end())?;
    }

    let listed: Vec<_> = holidays
        .sorted()
        .into_iter()
        .filter(|h| !matrix.is_overflow(h.date) && matrix.contains(h.date))
        .collect();
    if !listed.is_empty() {
        writeln!(out, "---")?;
        for h in listed {
            writeln!(out, "  {:>2}* {}", h.date.day(), h.name)?;
        }
    }
    Ok(())
}
