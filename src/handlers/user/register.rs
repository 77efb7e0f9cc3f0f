// handlers/user/register.rs - POST /profile/register handler

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::profile_service::{ProfileView, RegisterRequest};

use super::UserState;

/// POST /profile/register - create a profile
///
/// Expected Input:
/// ```json
/// { "email": "user@example.com", "password": "at least 6 chars" }
/// ```
///
/// Responds 201 with `{id, email, createdAt}`; 409 when the email is taken.
pub async fn register_post(
    State(state): State<UserState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<ProfileView> {
    let profile = state.profiles.register(request).await?;
    Ok(ApiResponse::created(profile))
}
