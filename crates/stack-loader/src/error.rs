//! Error taxonomy for the stacking engine.

use std::path::PathBuf;

use thiserror::Error;

use stack_common::TimeParseError;

/// Errors surfaced by catalog, resolver, alignment, and loader operations.
#[derive(Error, Debug)]
pub enum StackError {
    /// A directory or file could not be accessed.
    #[error("path not accessible '{path}': {message}")]
    Path { path: PathBuf, message: String },

    /// A filename did not match the expected date format.
    #[error("filename '{name}' does not match date format '{format}'")]
    Format { name: String, format: String },

    /// No reference grid can be derived or accepted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A source could not be opened or reprojected onto the target grid,
    /// or the aligned stack could not be assembled.
    #[error("alignment failed: {0}")]
    Alignment(String),

    /// An operation was invoked out of sequence. Always a usage fault,
    /// never retried.
    #[error("operation out of sequence: {0}")]
    Precondition(String),
}

impl StackError {
    /// Create a Path error.
    pub fn path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Path {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an Alignment error.
    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    /// Create a Precondition error.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }
}

impl From<TimeParseError> for StackError {
    fn from(err: TimeParseError) -> Self {
        match err {
            TimeParseError::NoMatch { name, format } => Self::Format { name, format },
        }
    }
}

/// Result type for stacking engine operations.
pub type Result<T> = std::result::Result<T, StackError>;
