//! Configuration and data-loading errors.

use std::path::PathBuf;

/// Error type for setup failures that stop a run before any job executes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The shot data set could not be read.
    #[error("failed to read shot data from {}: {source}", path.display())]
    DataIo {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The shot data set is not valid JSON for the expected record shape.
    #[error("failed to parse shot data from {}: {source}", path.display())]
    DataParse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}
