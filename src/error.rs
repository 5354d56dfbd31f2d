//! Error types for Bitewatch

use thiserror::Error;

/// Errors that can occur at the pipeline's edges.
///
/// Per-frame processing itself never fails: malformed observations degrade
/// to no-detection and persistence failures are swallowed by the event log.
/// These variants surface only from storage and replay-input handling.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed frame record: {0}")]
    MalformedRecord(String),
}
