//! Error types for rfc-link.
//!
//! Provides the crate-wide error enum and `Result` alias. Configuration
//! problems are detected before any remote call is issued; upstream call
//! failures carry the chunk/batch position so callers can decide whether to
//! retry the whole logical query.

use std::fmt;

/// Result type for rfc-link operations
pub type Result<T> = std::result::Result<T, RfcLinkError>;

/// Errors that can occur when talking to an SAP R/3 system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RfcLinkError {
    /// Invalid query or connection configuration (bad limits, unknown field).
    /// Detected locally, before any remote call is issued. Never retried.
    InvalidConfiguration(String),

    /// An underlying RFC call of a partitioned query failed.
    ///
    /// `chunk` and `batch` are the zero-based position of the failed call.
    /// Rows gathered by earlier calls of the same logical query are
    /// discarded; a partial result would misrepresent the table state.
    QueryFailure {
        /// Zero-based index of the where-clause chunk being executed
        chunk: usize,
        /// Zero-based index of the row batch within that chunk
        batch: usize,
        /// Message reported by the underlying call
        message: String,
    },

    /// Failure reported by the RFC SDK transport itself
    /// (connect, teardown, or function invocation plumbing)
    Transport(String),

    /// A function module response was missing a table or field its
    /// contract promises
    Protocol(String),
}

impl RfcLinkError {
    /// Create an InvalidConfiguration error with a message
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a QueryFailure error for the given chunk/batch position
    pub fn query_failure(chunk: usize, batch: usize, msg: impl Into<String>) -> Self {
        Self::QueryFailure {
            chunk,
            batch,
            message: msg.into(),
        }
    }

    /// Create a Transport error with a message
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a Protocol error with a message
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

impl fmt::Display for RfcLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::QueryFailure {
                chunk,
                batch,
                message,
            } => write!(
                f,
                "Query failed at chunk {}, batch {}: {}",
                chunk, batch, message
            ),
            Self::Transport(msg) => write!(f, "RFC transport error: {}", msg),
            Self::Protocol(msg) => write!(f, "Unexpected RFC response: {}", msg),
        }
    }
}

impl std::error::Error for RfcLinkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failure_display_includes_position() {
        let err = RfcLinkError::query_failure(2, 1, "connection reset");
        let text = err.to_string();
        assert!(text.contains("chunk 2"), "missing chunk index: {}", text);
        assert!(text.contains("batch 1"), "missing batch index: {}", text);
        assert!(text.contains("connection reset"));
    }

    #[test]
    fn test_helper_constructors() {
        assert_eq!(
            RfcLinkError::invalid_configuration("bad"),
            RfcLinkError::InvalidConfiguration("bad".to_string())
        );
        assert_eq!(
            RfcLinkError::transport("down"),
            RfcLinkError::Transport("down".to_string())
        );
    }
}
