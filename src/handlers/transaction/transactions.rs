// handlers/transaction/transactions.rs - /transactions/* handlers

use axum::extract::{Path, State};

use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, CurrentProfile, JsonBody};
use crate::services::transaction_service::{TransactionCreateRequest, TransactionList, TransactionView};

use super::TransactionState;

/// POST /transactions/create
///
/// Expected Input:
/// ```json
/// {
///   "type": "expense",
///   "categoryIds": [1],
///   "description": "점심",
///   "amount": 9000,
///   "date": "2024-05-01T12:00:00.000Z"
/// }
/// ```
///
/// All fields are required and `amount` must be positive. Each category id
/// must be a live category of the caller.
pub async fn create_post(
    State(state): State<TransactionState>,
    CurrentProfile(profile_id): CurrentProfile,
    JsonBody(request): JsonBody<TransactionCreateRequest>,
) -> ApiResult<TransactionView> {
    let transaction = state.transactions.create(profile_id, request).await?;
    Ok(ApiResponse::created(transaction))
}

/// GET /transactions/profile - newest first
pub async fn list_get(
    State(state): State<TransactionState>,
    CurrentProfile(profile_id): CurrentProfile,
) -> ApiResult<TransactionList> {
    Ok(ApiResponse::success(state.transactions.list(profile_id).await?))
}

/// PUT /transactions/edit/:id - full replacement, same rules as create
pub async fn edit_put(
    State(state): State<TransactionState>,
    CurrentProfile(profile_id): CurrentProfile,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<TransactionCreateRequest>,
) -> ApiResult<TransactionView> {
    let transaction = state.transactions.update(profile_id, parse_id(&id)?, request).await?;
    Ok(ApiResponse::success(transaction))
}

pub async fn transaction_delete(
    State(state): State<TransactionState>,
    CurrentProfile(profile_id): CurrentProfile,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.transactions.delete(profile_id, parse_id(&id)?).await?;
    Ok(ApiResponse::no_content())
}
