use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, CurrentProfile};
use crate::services::profile_service::ProfileView;

use super::UserState;

/// GET /profile/me
pub async fn me_get(State(state): State<UserState>, CurrentProfile(profile_id): CurrentProfile) -> ApiResult<ProfileView> {
    let profile = state.profiles.get_profile(profile_id).await?;
    Ok(ApiResponse::success(profile))
}
