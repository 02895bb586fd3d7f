//! Error types for sartrack.

use thiserror::Error;

/// Errors raised at the sartrack-core boundary.
///
/// Problems inside individual records never surface here; those are
/// quarantined by [`crate::ingest`] instead.
#[derive(Error, Debug)]
pub enum SarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid calendar month: {year}-{month:02} (month must be 1-12)")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unexpected data shape: {0}")]
    Shape(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for sartrack operations.
pub type SarResult<T> = Result<T, SarError>;
