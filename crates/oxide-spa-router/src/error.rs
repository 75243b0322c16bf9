//! Error types for routing.

use thiserror::Error;

/// Boxed error returned by a failing handler unit.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The route pattern could not be compiled.
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern string.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A handler unit failed and aborted its chain.
    #[error("handler for '{pattern}' failed: {source}")]
    Handler {
        /// Pattern whose chain was running.
        pattern: String,
        /// The error raised by the unit.
        #[source]
        source: BoxError,
    },
}

impl RouterError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
