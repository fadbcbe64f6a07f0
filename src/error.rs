// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The listing page answered with something other than 200
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// Page bytes could not be decoded with the configured encoding
    #[error("Failed to decode page as {encoding}")]
    Decode { encoding: String },

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Spreadsheet could not be read
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    /// Condition file rejected before or after reading
    #[error("Condition file error: {0}")]
    ConditionFile(String),

    /// Condition expression could not be parsed
    #[error("Condition error: {0}")]
    Condition(#[from] ConditionError),

    /// Notification could not be delivered
    #[error("Notification error: {0}")]
    Notify(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a condition file error.
    pub fn condition_file(message: impl Into<String>) -> Self {
        Self::ConditionFile(message.into())
    }

    /// Create a notification delivery error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }
}

/// Reasons a condition expression cannot be evaluated.
///
/// Positions are byte offsets into the expression that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("condition is empty")]
    Empty,

    #[error("empty group at {position}")]
    EmptyGroup { position: usize },

    #[error("unclosed '(' at {position}")]
    UnclosedGroup { position: usize },

    #[error("unexpected ')' at {position}")]
    UnexpectedClose { position: usize },

    #[error("groups nested too deeply at {position}")]
    TooDeep { position: usize },
}
