//! Error types for the Microsearch library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`MicrosearchError`] enum. Errors fall into two families that callers can
//! branch on:
//!
//! - validation errors, raised before any storage mutation when the caller
//!   supplies unusable input (an empty document id, a bad gram range)
//! - storage errors, raised when the on-disk index cannot be read or written,
//!   including malformed persisted content
//!
//! # Examples
//!
//! ```
//! use microsearch::error::{MicrosearchError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(MicrosearchError::validation("document id must not be empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => assert!(e.is_validation()),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Microsearch operations.
#[derive(Error, Debug)]
pub enum MicrosearchError {
    /// Caller supplied unusable input. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The index could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O errors surfaced from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Persisted content that does not parse.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with MicrosearchError.
pub type Result<T> = std::result::Result<T, MicrosearchError>;

impl MicrosearchError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        MicrosearchError::Validation(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        MicrosearchError::Storage(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        MicrosearchError::Validation(format!("Invalid configuration: {}", msg.into()))
    }

    /// Whether this error was caused by caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self, MicrosearchError::Validation(_))
    }

    /// Whether this error came from the underlying store.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            MicrosearchError::Storage(_) | MicrosearchError::Io(_) | MicrosearchError::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = MicrosearchError::validation("empty id");
        assert_eq!(error.to_string(), "Validation error: empty id");

        let error = MicrosearchError::storage("shard unreadable");
        assert_eq!(error.to_string(), "Storage error: shard unreadable");

        let error = MicrosearchError::invalid_config("max_gram < min_gram");
        assert_eq!(
            error.to_string(),
            "Validation error: Invalid configuration: max_gram < min_gram"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error = MicrosearchError::from(io_error);

        match error {
            MicrosearchError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
        assert!(error.is_storage());
        assert!(!error.is_validation());
    }

    #[test]
    fn test_json_error_is_storage() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = MicrosearchError::from(json_error);

        assert!(error.is_storage());
    }
}
