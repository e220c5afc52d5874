//! Error types for fetching raw messages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an [`ObjectSource`](crate::ObjectSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// Object does not exist at the resolved location.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Key would resolve outside the bucket directory.
    #[error("invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Failed to read the object.
    #[error("failed to read object {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::NotFound {
            bucket: "lab-inbox".to_string(),
            key: "2024/msg.hl7".to_string(),
        };
        assert_eq!(err.to_string(), "object not found: lab-inbox/2024/msg.hl7");
    }
}
