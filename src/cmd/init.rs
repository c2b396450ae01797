use anyhow::{Context, Result};
use chrono::NaiveDate;
use datex::data::{Holiday, HolidayData, Persistable, PickerConfig};
use std::fs;
use std::path::Path;

const DEFAULT_HOLIDAYS: &[(&str, &str)] = &[
    ("New Year's Day", "2025-01-01"),
    ("Martin Luther King Jr. Day", "2025-01-20"),
    ("Presidents' Day", "2025-02-17"),
    ("Memorial Day", "2025-05-26"),
    ("Juneteenth", "2025-06-19"),
    ("Independence Day", "2025-07-04"),
    ("Labor Day", "2025-09-01"),
    ("Columbus Day", "2025-10-13"),
    ("Veterans Day", "2025-11-11"),
    ("Thanksgiving Day", "2025-11-27"),
    ("Christmas Day", "2025-12-25"),
    ("New Year's Day", "2026-01-01"),
    ("Martin Luther King Jr. Day", "2026-01-19"),
    ("Presidents' Day", "2026-02-16"),
    ("Memorial Day", "2026-05-25"),
    ("Juneteenth", "2026-06-19"),
    ("Independence Day", "2026-07-03"),
    ("Labor Day", "2026-09-07"),
    ("Columbus Day", "2026-10-12"),
    ("Veterans Day", "2026-11-11"),
    ("Thanksgiving Day", "2026-11-26"),
    ("Christmas Day", "2026-12-25"),
    ("New Year's Day", "2027-01-01"),
    ("Martin Luther King Jr. Day", "2027-01-18"),
    ("Presidents' Day", "2027-02-15"),
    ("Memorial Day", "2027-05-31"),
    ("Juneteenth", "2027-06-18"),
    ("Independence Day", "2027-07-05"),
    ("Labor Day", "2027-09-06"),
    ("Columbus Day", "2027-10-11"),
    ("Veterans Day", "2027-11-11"),
    ("Thanksgiving Day", "2027-11-25"),
    ("Christmas Day", "2027-12-24"),
];

pub fn run() -> Result<()> {
    let dir = datex::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)?;
    run_in_dir(&dir)?;
    println!("Data files initialized successfully.");
    Ok(())
}

/// Writes all default data files into `dir`. Exposed for unit testing.
pub(crate) fn run_in_dir(dir: &Path) -> Result<()> {
    write_config(dir)?;
    write_holidays(dir)?;
    Ok(())
}

fn write_config(dir: &Path) -> Result<()> {
    PickerConfig::default().save_to(dir)
}

fn write_holidays(dir: &Path) -> Result<()> {
    default_holidays()?.save_to(dir)
}

/// US federal holidays (observed dates) for the bundled years.
fn default_holidays() -> Result<HolidayData> {
    let mut data = HolidayData::default();
    for (name, date) in DEFAULT_HOLIDAYS {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("bad built-in holiday date {date}"))?;
        data.add(Holiday::new(name, date));
    }
    Ok(data)
}
