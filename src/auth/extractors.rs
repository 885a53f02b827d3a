use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{jwt::JwtKeys, repo_types::PublicUser};
use crate::{error::ApiError, state::AppState};

/// Validates the bearer token and resolves the user it names.
pub struct AuthUser(pub PublicUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("No token, authorization denied".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthorized("Token is not valid".into())
        })?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token for missing user");
                ApiError::Unauthorized("Token is not valid".into())
            })?;

        Ok(AuthUser(user.into()))
    }
}
