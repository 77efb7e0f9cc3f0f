// handlers/transaction/categories.rs - /categories/* handlers

use axum::extract::{Path, State};

use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, CurrentProfile, JsonBody};
use crate::services::category_service::{CategoryCreateRequest, CategoryList, CategoryView};

use super::TransactionState;

/// POST /categories/create - `{ "content": "식비" }`
///
/// A live duplicate for the same profile answers 409. Re-creating a deleted
/// category brings the old one back.
pub async fn create_post(
    State(state): State<TransactionState>,
    CurrentProfile(profile_id): CurrentProfile,
    JsonBody(request): JsonBody<CategoryCreateRequest>,
) -> ApiResult<CategoryView> {
    let category = state.categories.create(profile_id, request).await?;
    Ok(ApiResponse::created(category))
}

/// GET /categories/get
pub async fn list_get(
    State(state): State<TransactionState>,
    CurrentProfile(profile_id): CurrentProfile,
) -> ApiResult<CategoryList> {
    Ok(ApiResponse::success(state.categories.list(profile_id).await?))
}

/// DELETE /categories/:id - soft delete
pub async fn category_delete(
    State(state): State<TransactionState>,
    CurrentProfile(profile_id): CurrentProfile,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.categories.delete(profile_id, parse_id(&id)?).await?;
    Ok(ApiResponse::no_content())
}
