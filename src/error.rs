//! Error types shared across the crate

use thiserror::Error;

/// Errors raised by the projection core and its loaders
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Caller supplied an amount, term, profile or choice the core cannot use
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A loaded calibration table breaks its own invariants
    #[error("Invalid assumption table: {0}")]
    InvalidAssumption(String),

    /// Persistence collaborator has no record under the requested key
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectionError {
    /// Shorthand for an `InvalidInput` error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a caller input problem
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ProjectionError::InvalidInput { .. })
    }
}

/// Result alias used throughout the crate
pub type CoreResult<T> = Result<T, ProjectionError>;
