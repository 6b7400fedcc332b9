//! Error types for tray-telemetry
//!
//! None of these ever escape [`Telemetry`](crate::Telemetry): they are handed
//! to an [`ErrorSink`](crate::ErrorSink) at the point of failure and the
//! component carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Telemetry error type
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Reading one of the identity files failed
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing one of the identity files failed
    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        /// File (or directory) that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Identity could not be serialized for hashing
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Analytics backend rejected or failed to deliver a message
    #[error("backend error: {0}")]
    Backend(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl TelemetryError {
    /// Whether this error originated in the on-disk identity store
    pub fn is_io(&self) -> bool {
        matches!(self, Self::FileRead { .. } | Self::FileWrite { .. })
    }
}

impl From<reqwest::Error> for TelemetryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TelemetryError>;
