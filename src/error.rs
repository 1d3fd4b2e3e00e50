//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror.
//!
//! A cache miss is not an error anywhere in this crate: lookups return
//! `Option` and reserve `CacheError` for conditions the caller may want
//! to act on (mode misuse, I/O faults, a store that failed to open).

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for both cache tiers.
#[derive(Error, Debug)]
pub enum CacheError {
    /// An empty key was passed to an operation that requires one
    #[error("invalid key: key must not be empty")]
    InvalidKey,

    /// The requested storage location is not allowed by the store's mode
    #[error("storage mode violation: {0}")]
    ModeViolation(String),

    /// A filesystem read/write/delete failed
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// A manifest database operation failed
    #[error("manifest database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The caller-supplied value codec failed
    #[error("codec failure: {0}")]
    Codec(String),

    /// The manifest database could not be opened, even after one reset
    #[error("storage initialization failed: {0}")]
    Initialization(String),
}

// == Result Type Alias ==
/// Convenience Result type for the tiered cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CacheError = io_err.into();
        assert!(matches!(err, CacheError::Io(_)));
    }

    #[test]
    fn test_error_messages_name_the_condition() {
        let err = CacheError::ModeViolation("inline save in file mode".to_string());
        assert!(err.to_string().contains("storage mode violation"));

        let err = CacheError::InvalidKey;
        assert!(err.to_string().contains("empty"));
    }
}
