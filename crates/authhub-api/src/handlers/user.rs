//! User handlers.

use axum::Json;
use axum::extract::State;

use authhub_entity::user::UserProfile;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, Language};
use crate::state::AppState;

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    lang: Language,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = state
        .user_service
        .profile(auth.context())
        .await
        .map_err(|e| lang.error(e))?;

    Ok(Json(ApiResponse::ok(profile)))
}
