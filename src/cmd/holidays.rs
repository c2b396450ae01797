use anyhow::Result;
use datex::data::{HolidayData, Persistable};

pub fn run() -> Result<()> {
    let holiday_data = HolidayData::load()?;
    write_holidays(&holiday_data, &mut std::io::stdout())
}

pub(crate) fn write_holidays<W: std::io::Write>(data: &HolidayData, out: &mut W) -> Result<()> {
    writeln!(out, "Holidays")?;
    writeln!(out, "---")?;
    writeln!(out, "  {:<14} {:<4} {}", "Date", "Day", "Name")?;
    for h in data.sorted() {
        writeln!(
            out,
            "  {:<14} {:<4} {}",
            h.date.format("%Y-%m-%d"),
            h.date.format("%a"),
            h.name
        )?;
    }
    writeln!(out, "---")?;
    writeln!(out, "Total: {} holiday(s)", data.holidays.len())?;
    Ok(())
}
