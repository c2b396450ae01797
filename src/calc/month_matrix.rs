use crate::calc::date_math::{add_days, first_of_month, is_same_date, start_of_week, DateUnit};
use chrono::NaiveDate;

pub const WEEKS: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;
pub const CELLS: usize = WEEKS * DAYS_PER_WEEK;

/// A fixed 6×7 grid for one month. Always 42 contiguous days, starting on the
/// configured first weekday on or before the 1st.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthMatrix {
    anchor: NaiveDate,
    days: [NaiveDate; CELLS],
}

impl MonthMatrix {
    /// First of the month this grid is built for.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn days(&self) -> &[NaiveDate; CELLS] {
        &self.days
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[NaiveDate]> {
        self.days.chunks(DAYS_PER_WEEK)
    }

    pub fn first(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.days[CELLS - 1]
    }

    /// True for cells that belong to an adjacent month.
    pub fn is_overflow(&self, date: NaiveDate) -> bool {
        !is_same_date(&date, &self.anchor, DateUnit::Month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first() && date <= self.last()
    }

    pub fn position(&self, date: NaiveDate) -> Option<(usize, usize)> {
        if !self.contains(date) {
            return None;
        }
        let idx = (date - self.first()).num_days() as usize;
        Some((idx / DAYS_PER_WEEK, idx % DAYS_PER_WEEK))
    }
}

pub fn build_month_matrix(month_anchor: NaiveDate, first_day: u32) -> MonthMatrix {
    let anchor = first_of_month(month_anchor);
    let start = start_of_week(anchor, first_day);
    let days = std::array::from_fn(|i| add_days(start, i as i64));
    MonthMatrix { anchor, days }
}
