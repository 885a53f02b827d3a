use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
}

/// Errors every handler can return, with their HTTP mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Authentication required: {0}")]
    Unauthorized(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email not verified")]
    EmailNotVerified,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("User already registered and verified")]
    Conflict,
    #[error("User already verified")]
    AlreadyVerified,
    #[error("Invalid OTP")]
    OtpMismatch,
    #[error("No valid medical images")]
    NoValidMedicalImages,
    #[error("{message}: {detail}")]
    Provider {
        message: &'static str,
        detail: String,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn provider(message: &'static str, detail: impl std::fmt::Display) -> Self {
        Self::Provider {
            message,
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Unauthorized(detail) => (StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", detail),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            ApiError::EmailNotVerified => (
                StatusCode::UNAUTHORIZED,
                "EMAIL_NOT_VERIFIED",
                "Email not verified. Please verify the OTP sent to your email".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                "ALREADY_REGISTERED",
                "User already registered and verified".to_string(),
            ),
            ApiError::AlreadyVerified => (
                StatusCode::BAD_REQUEST,
                "ALREADY_VERIFIED",
                "User already verified".to_string(),
            ),
            ApiError::OtpMismatch => (StatusCode::BAD_REQUEST, "INVALID_OTP", "Invalid OTP".to_string()),
            ApiError::NoValidMedicalImages => (
                StatusCode::BAD_REQUEST,
                "NO_VALID_IMAGES",
                "No valid medical images found. Please upload a valid X-ray, CT, MRI or medical report"
                    .to_string(),
            ),
            ApiError::Provider { message, detail } => {
                tracing::error!(%detail, message, "provider call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROVIDER_FAILED",
                    message.to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            status: if status.is_server_error() { "error" } else { "fail" },
            code,
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{err:#}"))
    }
}

/// Success envelope shared by every route.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.into(),
            data,
        })
    }
}
