pub mod date_math;
pub mod month_matrix;
pub mod validation;
pub mod workday;

pub use date_math::{
    add_days, add_months, add_months_dt, compare_dates, days_between, end_of_day, end_of_month,
    first_of_month, format_date, is_same_date, parse_date, start_of_day, start_of_week, DateUnit,
};
pub use month_matrix::{build_month_matrix, MonthMatrix};
pub use validation::{validate_date, validate_range, ValidationError, ValidationRules};
pub use workday::{add_business_days, count_business_days, is_business_day};
