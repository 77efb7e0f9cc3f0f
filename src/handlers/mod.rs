// handlers/mod.rs - HTTP surface of the downstream services
//
// Each service gets its own router and state; the gateway reaches them by
// path prefix (/user_service, /transaction_service) with the prefix removed.

pub mod health;
pub mod transaction;
pub mod user;

use crate::error::ApiError;

/// Numeric path id; anything else is a 400 with the API error body
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}
