use thiserror::Error;
use validator::ValidationErrors;

use crate::database::StoreError;

use super::password::PasswordError;

/// Domain-level failures, translated to HTTP responses at the handler boundary
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Business rule violation (duplicate category, unknown category, taken email)
    #[error("{0}")]
    Business(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn business(message: impl Into<String>) -> Self {
        ServiceError::Business(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ServiceError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
