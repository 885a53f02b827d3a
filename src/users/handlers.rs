use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use super::dto::{ProfileResponse, UpdateProfileRequest};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, Envelope},
    extract::ApiJson,
    state::AppState,
};

/// Active records embedded in the profile view.
const PROFILE_HISTORY_LIMIT: i64 = 20;

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/user/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<ProfileResponse>>, ApiError> {
    let history = state
        .analyses
        .list_active(user.id, PROFILE_HISTORY_LIMIT, 0)
        .await?;
    Ok(Envelope::success("Profile fetched", ProfileResponse { user, history }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let name = payload.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let dob = payload.dob.as_deref().map(str::trim).filter(|s| !s.is_empty());
    state.users.update_profile(user.id, name, dob).await?;
    info!("profile updated");
    Ok(Envelope::success("Profile updated", ()))
}
