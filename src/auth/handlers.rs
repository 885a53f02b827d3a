use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{EmailResponse, LoginRequest, LoginResponse, RegisterRequest, VerifyOtpRequest},
        jwt::JwtKeys,
        services,
    },
    error::{ApiError, Envelope},
    extract::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<Envelope<EmailResponse>>, ApiError> {
    let email = services::register(state.users.as_ref(), state.mailer.as_ref(), payload).await?;
    Ok(Envelope::success("OTP sent to email", EmailResponse { email }))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<VerifyOtpRequest>,
) -> Result<Json<Envelope<EmailResponse>>, ApiError> {
    let email = services::verify_otp(state.users.as_ref(), &payload.email, &payload.otp).await?;
    Ok(Envelope::success("OTP verified successfully", EmailResponse { email }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<Envelope<LoginResponse>>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let (token, user) = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Envelope::success(
        "User login successful",
        LoginResponse {
            token,
            user: user.into(),
        },
    ))
}
