use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing results.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write item: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to serialize item: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SinkError>;
