pub mod category_service;
pub mod error;
pub mod password;
pub mod profile_service;
pub mod transaction_service;

use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

pub use category_service::CategoryService;
pub use error::{ServiceError, ServiceResult};
pub use profile_service::ProfileService;
pub use transaction_service::TransactionService;

/// Trimmed text; blank reads as absent so `required` reports it
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Unwraps a field that already passed its `required` check
pub(crate) fn checked<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationErrors> {
    value.ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(field, ValidationError::new("required"));
        errors
    })
}
