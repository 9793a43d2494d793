//! Error types for the OCR pipeline.

use thiserror::Error;

/// Errors the OCR pipeline can surface. `relief-geometry`'s internal
/// degenerate-geometry drops (non-convex hulls, zero-area offsets, and
/// similar) never reach here — they are logged and skipped at the point a
/// box is discarded, per the geometry pipeline's contract.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Malformed input (unreadable image, empty dictionary, mismatched
    /// tensor shape).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The backend failed to produce a usable result.
    #[error("inference failed: {0}")]
    InferenceFailed(#[from] relief_inference::InferenceError),

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type for the OCR pipeline.
pub type Result<T> = std::result::Result<T, OcrError>;
