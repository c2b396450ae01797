use crate::data::persistence::Persistable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Holiday {
    pub name: String,
    pub date: NaiveDate,
}

impl Holiday {
    pub fn new(name: &str, date: NaiveDate) -> Self {
        Holiday {
            name: name.to_string(),
            date,
        }
    }
}

/// `holidays.yaml`. Merged into the validation rules' holiday set.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct HolidayData {
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

impl Persistable for HolidayData {
    fn filename() -> &'static str {
        "holidays.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl HolidayData {
    pub fn add(&mut self, holiday: Holiday) {
        self.holidays.push(holiday);
    }

    pub fn holiday_dates(&self) -> BTreeSet<NaiveDate> {
        self.holidays.iter().map(|h| h.date).collect()
    }

    pub fn lookup(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|h| h.date == date)
    }

    /// Holidays in date order.
    pub fn sorted(&self) -> Vec<&Holiday> {
        let mut sorted: Vec<&Holiday> = self.holidays.iter().collect();
        sorted.sort_by_key(|h| h.date);
        sorted
    }
}
