use crate::calc::ValidationError;
use thiserror::Error;

/// datex error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickerError {
    /// The host selector resolved to nothing
    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    /// Text did not parse as a date
    #[error("cannot parse '{input}' as {pattern}")]
    InvalidDateParse { input: String, pattern: String },

    /// A rule rejected the date or range
    #[error("validation failed ({code}): {0}", code = .0.code())]
    Validation(#[from] ValidationError),

    /// The picker was destroyed
    #[error("picker has been destroyed")]
    Destroyed,
}

/// Result type alias for datex
pub type Result<T> = std::result::Result<T, PickerError>;
