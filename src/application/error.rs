//! Application error taxonomy.
//!
//! Cache failures never appear here — the cache layer absorbs them and the
//! request falls through to the store. Store failures do surface, as
//! `Store`: there is no fallback for the source of truth.

use thiserror::Error;

use crate::application::pagination::PaginationError;
use crate::application::repos::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{message}")]
    Conflict { message: String },
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error(transparent)]
    InvalidCursor(#[from] PaginationError),
    #[error("store error: {0}")]
    Store(RepoError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound { entity: "resource" },
            RepoError::Duplicate { constraint } => Self::Conflict {
                message: format!("duplicate value for `{constraint}`"),
            },
            RepoError::InvalidInput { message } => Self::Validation { message },
            RepoError::Pagination(err) => Self::InvalidCursor(err),
            other => Self::Store(other),
        }
    }
}
