use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, SessionToken};
use crate::services::profile_service::SessionPrincipal;

use super::UserState;

/// POST /profile/logout - 204 whether or not the session existed
pub async fn logout_post(State(state): State<UserState>, SessionToken(session_id): SessionToken) -> ApiResult<()> {
    state.profiles.logout(&session_id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /profile/session - resolve `X-Session-ID` and slide its expiry.
/// The gateway calls this to authenticate secured requests.
pub async fn session_get(
    State(state): State<UserState>,
    SessionToken(session_id): SessionToken,
) -> ApiResult<SessionPrincipal> {
    let principal = state.profiles.resolve_session(&session_id).await?;
    Ok(ApiResponse::success(principal))
}
