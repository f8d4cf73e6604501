//! Error types for the payroll engine.
//!
//! Calculations never fail: bad numeric input is treated as zero and missing
//! rates fall back to defaults. The variants below only cover the edges that
//! genuinely can fail, namely configuration loading, the rate source, and the
//! explicit parse entry points for dates and year-months.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/rates.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/rates.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The rate source could not answer a lookup.
    #[error("Rate lookup failed for '{category}.{key}': {message}")]
    RateLookup {
        /// The rate category (e.g. "tax").
        category: String,
        /// The rate key within the category.
        key: String,
        /// A description of the failure.
        message: String,
    },

    /// A year-month string was not of the form `YYYY-MM`.
    #[error("Invalid year-month '{value}', expected YYYY-MM")]
    InvalidYearMonth {
        /// The rejected input.
        value: String,
    },

    /// A date string was not of the form `YYYY-MM-DD`.
    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
