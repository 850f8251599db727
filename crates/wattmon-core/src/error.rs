//! Domain-specific error types following panic-free policy.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a sensor's backing files.
#[derive(Debug, Error)]
pub enum SensorError {
    /// Failed to read a source file (counter or label)
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The counter file did not contain a parseable unsigned integer
    #[error("invalid counter value in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Result type for sensor read operations.
pub type SensorResult<T> = Result<T, SensorError>;
