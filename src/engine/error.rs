// ==========================================
// Asset Inventory - import error taxonomy
// ==========================================
// One structured error kind per user-visible failure class. Every
// variant carries the offending parameter name/value and an "expected"
// description, so the API layer can surface it without translation.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Import pipeline errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// A mandatory column or field is missing entirely.
    #[error("required parameter '{param}' is missing")]
    ParamRequired { param: String },

    /// A field value is malformed or out of range.
    #[error("parameter '{param}' has bad value '{value}', expected {expected}")]
    BadParams {
        param: String,
        value: String,
        expected: String,
    },

    /// Structural conflict in the request document (duplicate id,
    /// empty document, forbidden type/subtype change).
    #[error("request document is invalid: {0}")]
    BadRequestDocument(String),

    /// A referenced id or name does not exist.
    #[error("element '{name}' not found")]
    ElementNotFound { name: String },

    /// Licensing policy blocks the whole operation.
    #[error("action is forbidden: {0}")]
    ActionForbidden(String),

    /// Post-commit activation failed; the asset row stays persisted.
    #[error("licensing-err: {0}")]
    Licensing(String),

    /// A lower-layer failure (catalog load, placement, database).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ImportError {
    pub fn param_required(param: impl Into<String>) -> Self {
        ImportError::ParamRequired {
            param: param.into(),
        }
    }

    pub fn bad_params(
        param: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ImportError::BadParams {
            param: param.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        ImportError::ElementNotFound { name: name.into() }
    }
}

impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ImportError::ElementNotFound {
                name: format!("{}={}", entity, id),
            },
            RepositoryError::UniqueConstraintViolation(msg) => {
                ImportError::BadRequestDocument(format!("conflicting unique value: {}", msg))
            }
            other => ImportError::Internal(other.to_string()),
        }
    }
}

impl From<crate::importer::TableError> for ImportError {
    fn from(err: crate::importer::TableError) -> Self {
        ImportError::Internal(err.to_string())
    }
}
