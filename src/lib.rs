//! Date range picker core: date math and validation, the selection state
//! machine, the two-calendar coordinator and keyboard navigation, driven by
//! [`picker::Command`]s from whatever UI hosts it.

pub mod calc;
pub mod data;
pub mod error;
pub mod picker;
pub mod theme;

pub use error::{PickerError, Result};
pub use picker::{Command, DateRangePicker, Outcome, PickerOptions};
