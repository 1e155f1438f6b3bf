//! Error types for Strand

use thiserror::Error;

/// The main error type for Strand operations
#[derive(Debug, Error)]
pub enum StrandError {
    #[error("Terrain not found: {0}")]
    TerrainNotFound(String),

    #[error("Resource not ready: {0}")]
    ResourceNotReady(String),

    #[error("Missing resource: {0}")]
    MissingResource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Image error: {0}")]
    ImageError(String),
}

impl StrandError {
    /// Transient failures are retried on the next tick instead of being reported.
    pub fn is_transient(&self) -> bool {
        matches!(self, StrandError::ResourceNotReady(_))
    }
}

/// Result type alias for Strand operations
pub type Result<T> = std::result::Result<T, StrandError>;
