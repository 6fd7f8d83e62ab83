//! Error types for backing-store operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized Result type for backing-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a backing store.
///
/// Data providers propagate these unchanged; whether a failure is worth
/// retrying is decided on the store side (see [`StoreError::is_retryable`]
/// and [`crate::RetryingStore`]).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or is temporarily unable to answer.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The store rejected or failed to execute a query.
    #[error("query failed: {message}")]
    Query {
        /// Description of the failure.
        message: String,
    },

    /// A record does not fit the schema it is being stored under.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the mismatch.
        message: String,
    },

    /// A dataset file could not be parsed.
    #[error("dataset error: {0}")]
    Dataset(#[from] serde_json::Error),

    /// A dataset file could not be read.
    #[error("failed to read dataset '{path}': {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a query error.
    pub fn query(message: impl Into<String>) -> Self {
        StoreError::Query {
            message: message.into(),
        }
    }

    /// Creates an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        StoreError::InvalidRecord {
            message: message.into(),
        }
    }

    /// Returns true if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_is_retryable() {
        assert!(StoreError::unavailable("connection reset").is_retryable());
    }

    #[test]
    fn test_query_and_record_errors_are_not_retryable() {
        assert!(!StoreError::query("bad column").is_retryable());
        assert!(!StoreError::invalid_record("missing key").is_retryable());
    }

    #[test]
    fn test_display_includes_message() {
        let error = StoreError::query("unknown column 'age'");
        assert_eq!(error.to_string(), "query failed: unknown column 'age'");
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let error = StoreError::Io {
            path: PathBuf::from("/tmp/data.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let display = error.to_string();
        assert!(display.contains("/tmp/data.json"));
        assert!(display.contains("no such file"));
    }

    #[test]
    fn test_dataset_error_from_serde() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: StoreError = parse_error.into();
        assert!(matches!(error, StoreError::Dataset(_)));
        assert!(!error.is_retryable());
    }
}
