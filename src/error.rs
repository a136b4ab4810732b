//! Error types for the tax-credit engine.
//!
//! Recognition misses during extraction are not errors: they resolve to zero
//! or `None`. Only structural failures (unreadable documents, broken
//! configuration, unusable settings) surface through [`EngineError`].

use thiserror::Error;

/// The main error type for the tax-credit engine.
///
/// # Example
///
/// ```
/// use tax_credit_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/credit_tables.yaml".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Configuration file not found: /missing/credit_tables.yaml"
/// );
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

    /// A document could not be opened or decoded at all.
    #[error("Document '{file_name}' is unreadable: {message}")]
    DocumentUnreadable {
        /// The file name of the document.
        file_name: String,
        /// A description of what went wrong.
        message: String,
    },

    /// A page's content could not be retrieved from its document.
    #[error("Page {page} of '{file_name}' is unavailable")]
    PageUnavailable {
        /// The file name of the document.
        file_name: String,
        /// Zero-based page index.
        page: usize,
    },

    /// Company settings could not be used for a calculation.
    #[error("Invalid settings: {message}")]
    InvalidSettings {
        /// A description of the problem.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
