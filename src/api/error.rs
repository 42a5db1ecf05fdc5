// ==========================================
// Asset Inventory - API layer errors
// ==========================================
// Converts engine and repository errors into caller-facing messages.
// ==========================================

use crate::engine::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API layer errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// A batch-level import failure (nothing was written).
    #[error("import rejected: {0}")]
    ImportRejected(#[from] ImportError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} with id={}", entity, id))
            }
            other => ApiError::Storage(other.to_string()),
        }
    }
}
