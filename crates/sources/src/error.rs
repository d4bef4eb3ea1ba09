//! Source error types

use std::path::PathBuf;

use thiserror::Error;

/// Source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to open the input file
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed line, returned only when `continue_on_error` is off
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Input queue closed before the source finished
    #[error("flow channel closed")]
    ChannelClosed,
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;
