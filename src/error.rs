//! Error types for the mock driver.

use crate::database::types::Value;
use thiserror::Error;

/// Result type alias for mock driver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which prepared-statement call site rejected its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Exec,
    Query,
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallKind::Exec => write!(f, "exec"),
            CallKind::Query => write!(f, "query"),
        }
    }
}

/// Error types for the mock driver
///
/// Every mismatch is surfaced to the immediate caller; nothing is retried or
/// recovered internally.
#[derive(Debug, Error)]
pub enum Error {
    /// More statements were issued than were declared
    #[error("dbmock: unexpected query: got {query}, want <none>")]
    QueueEmpty { query: String },

    /// Statement text does not satisfy the next expectation's pattern
    #[error("dbmock: unexpected query: got {query}, want {pattern}")]
    PatternMismatch { query: String, pattern: String },

    /// Statement was (or was not) issued through a transaction, contrary to the expectation
    #[error("dbmock: in tx mismatch for {query}: got {actual}, want {expected}")]
    TransactionContextMismatch {
        query: String,
        expected: bool,
        actual: bool,
    },

    /// Bound arguments differ from the expected ones
    #[error("dbmock: unexpected {call} args: {reason}: want {expected:?}, got {actual:?}")]
    ArgMismatch {
        call: CallKind,
        reason: String,
        expected: Vec<Value>,
        actual: Vec<Value>,
    },

    /// Destination width differs from the current row width
    #[error("dbmock: failed to set row data: column mismatch, got {actual}, want {expected}")]
    ArityMismatch { expected: usize, actual: usize },

    /// An expectation pattern is not a valid regular expression
    #[error("dbmock: invalid pattern {pattern:?} in expectation #{index}: {source}")]
    PatternCompile {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Fixture file content is malformed
    #[error("dbmock: invalid fixture: {0}")]
    InvalidFixture(String),

    /// Loading a named fixture file failed
    #[error("dbmock: fixture {path}: {source}")]
    Fixture {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Fixture file extension is not one of json, toml, yaml, yml
    #[error("dbmock: unsupported fixture format: {0}")]
    UnsupportedFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl Error {
    /// True for the errors produced by matching a call against the expectation queue
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            Error::QueueEmpty { .. }
                | Error::PatternMismatch { .. }
                | Error::TransactionContextMismatch { .. }
                | Error::ArgMismatch { .. }
                | Error::ArityMismatch { .. }
        )
    }
}
