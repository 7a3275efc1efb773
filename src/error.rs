// Error types module

use thiserror::Error;

/// Errors surfaced by the image pipeline.
///
/// Categorizes failures into the three outcomes a caller has to react to
/// differently:
/// - `InvalidImage` / `InvalidWatermarkSpec`: the input is wrong, retrying
///   the same request reproduces the failure.
/// - `ProcessingFailure`: something broke mid-pipeline; the caller may retry
///   with different parameters (e.g. a lower tier).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// Decode failed or metadata reports zero width/height
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    /// Watermark text, opacity or tier rejected at pipeline entry
    #[error("Invalid watermark '{field}': {message}")]
    InvalidWatermarkSpec { field: String, message: String },

    /// Unexpected failure during resize, overlay rendering, composite or encode
    #[error("{stage} failed: {message}")]
    ProcessingFailure { stage: String, message: String },
}

impl ProcessingError {
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        ProcessingError::InvalidImage {
            reason: reason.into(),
        }
    }

    pub fn invalid_spec(field: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessingError::InvalidWatermarkSpec {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn failure(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessingError::ProcessingFailure {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Whether the caller has to fix its input before retrying.
    ///
    /// Client errors get a validation message; everything else a generic
    /// retry-later message.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProcessingError::InvalidImage { .. } | ProcessingError::InvalidWatermarkSpec { .. }
        )
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::InvalidImage { .. } => "invalid_image",
            ProcessingError::InvalidWatermarkSpec { .. } => "invalid_watermark_spec",
            ProcessingError::ProcessingFailure { .. } => "processing_failure",
        }
    }
}

/// Errors from the service layer wrapped around the pipeline
/// (object retrieval, storage, worker dispatch).
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Source object does not exist
    #[error("Object not found: {key}")]
    NotFound { key: String },

    /// Key is not a valid relative object key
    #[error("Invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Object store read/write failed
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// The pipeline itself rejected or failed the image
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// The pipeline did not finish within the configured budget
    #[error("Processing timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The blocking worker panicked or was cancelled
    #[error("Worker error: {message}")]
    Worker { message: String },
}

impl ServiceError {
    pub fn storage(message: impl Into<String>) -> Self {
        ServiceError::Storage {
            message: message.into(),
        }
    }

    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ServiceError::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller has to fix its input before retrying.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::NotFound { .. } | ServiceError::InvalidKey { .. } => true,
            ServiceError::Processing(e) => e.is_client_error(),
            _ => false,
        }
    }
}
