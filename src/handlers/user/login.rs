// handlers/user/login.rs - POST /profile/login handler

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::profile_service::{LoginRequest, LoginResponse};

use super::UserState;

/// POST /profile/login - exchange credentials for a session id
///
/// The returned `sessionId` goes in the `X-Session-ID` header of later
/// requests. Unknown emails and wrong passwords both answer 401.
pub async fn login_post(
    State(state): State<UserState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = state.profiles.login(request).await?;
    Ok(ApiResponse::success(response))
}
