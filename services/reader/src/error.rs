//! services/reader/src/error.rs
//!
//! Defines the primary error type for the reader client.

use crate::config::ConfigError;
use auraread_core::ports::PortError;

/// The primary error type for the `reader` client.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("{0}")]
    Port(#[from] PortError),

    /// Represents an error from building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a JSON (de)serialization failure outside of a request.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Represents a standard Input/Output error (e.g., reading a file to upload).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ReaderError {
    /// Whether the backend rejected the stored credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ReaderError::Port(e) if e.is_unauthorized())
    }
}
