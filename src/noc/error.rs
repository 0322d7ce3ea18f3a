//! Configuration errors raised while building an interconnect.

use thiserror::Error;

/// Result type for topology construction.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Every way a construction request can be rejected. Each variant carries the
/// expected and actual values so the caller can report what to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("invalid mesh dimensions: expected at least 1x1, got {xdim}x{ydim}")]
    Dimensions { xdim: usize, ydim: usize },

    #[error(
        "connectivity map length mismatch: expected {expected} entries (one per router), got {actual}"
    )]
    MapLength { expected: usize, actual: usize },

    #[error("connectivity map sum mismatch: expected sum {expected}, got {actual}")]
    MapSum { expected: usize, actual: usize },

    #[error("router index out of range: expected index below {routers}, got {actual}")]
    RouterIndex { routers: usize, actual: usize },

    #[error("name prefix clash: expected a prefix that neither equals nor extends '{expected}', got '{actual}'")]
    PrefixClash { expected: String, actual: String },

    #[error("invalid {what}: expected one of {expected}, got '{actual}'")]
    UnknownName {
        what: &'static str,
        expected: &'static str,
        actual: String,
    },

    #[error("invalid {what}: expected {expected}, got '{actual}'")]
    InvalidValue {
        what: &'static str,
        expected: &'static str,
        actual: String,
    },
}

impl ConfigurationError {
    pub(crate) fn unknown(what: &'static str, expected: &'static str, actual: &str) -> Self {
        Self::UnknownName {
            what,
            expected,
            actual: actual.to_string(),
        }
    }

    pub(crate) fn invalid(what: &'static str, expected: &'static str, actual: impl ToString) -> Self {
        Self::InvalidValue {
            what,
            expected,
            actual: actual.to_string(),
        }
    }
}
