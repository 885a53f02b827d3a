use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    dto::{LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    otp::{generate_otp, OtpMailer},
    password::{check_policy, hash_password, verify_password},
    repo::UserRepo,
    repo_types::{NewUser, User},
};
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("user already registered and verified")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("user already verified")]
    AlreadyVerified,
    #[error("otp mismatch")]
    Mismatch,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email not verified")]
    NotVerified,
    #[error("otp delivery failed: {0}")]
    Delivery(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Invalid(msg) => ApiError::BadRequest(msg.into()),
            AuthError::Conflict => ApiError::Conflict,
            AuthError::NotFound => ApiError::NotFound("User not found".into()),
            AuthError::AlreadyVerified => ApiError::AlreadyVerified,
            AuthError::Mismatch => ApiError::OtpMismatch,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::NotVerified => ApiError::EmailNotVerified,
            AuthError::Delivery(e) => ApiError::provider("Failed to send OTP. Please try again later", e),
            AuthError::Internal(e) => ApiError::from(e),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Issue a passcode for a new or still-unverified account. Returns the normalized email.
pub async fn register(
    users: &dyn UserRepo,
    mailer: &dyn OtpMailer,
    req: RegisterRequest,
) -> Result<String, AuthError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(AuthError::Invalid("Invalid email"));
    }
    check_policy(&req.password).map_err(AuthError::Invalid)?;

    let existing = users.find_by_email(&email).await?;
    if existing.as_ref().is_some_and(User::is_verified) {
        warn!(%email, "registration for verified email");
        return Err(AuthError::Conflict);
    }

    let otp = generate_otp();
    let new = NewUser {
        name: non_blank(req.name),
        dob: non_blank(req.dob),
        email: email.clone(),
        password_hash: hash_password(&req.password)?,
        otp: otp.clone(),
    };

    mailer
        .send_otp(&email, &otp)
        .await
        .map_err(AuthError::Delivery)?;

    match existing {
        Some(user) => {
            if !users.reissue_otp(user.id, new).await? {
                warn!(user_id = %user.id, "account verified during registration");
                return Err(AuthError::Conflict);
            }
            info!(user_id = %user.id, "otp reissued");
        }
        None => {
            let user = users.create(new).await?;
            info!(user_id = %user.id, "user registered");
        }
    }
    Ok(email)
}

/// Clear the passcode of an unverified account when the code matches.
pub async fn verify_otp(users: &dyn UserRepo, email: &str, otp: &str) -> Result<String, AuthError> {
    let email = normalize_email(email);
    if email.is_empty() || otp.is_empty() {
        return Err(AuthError::Invalid("Email and OTP are required"));
    }
    let user = users.find_by_email(&email).await?.ok_or(AuthError::NotFound)?;
    let stored = match user.otp.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => return Err(AuthError::AlreadyVerified),
    };
    if stored != otp {
        warn!(user_id = %user.id, "otp mismatch");
        return Err(AuthError::Mismatch);
    }
    users.set_otp(user.id, None).await?;
    info!(user_id = %user.id, "email verified");
    Ok(user.email)
}

/// Check credentials and sign a session token.
pub async fn login(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<(String, User), AuthError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AuthError::Invalid("Email and password are required"));
    }

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password(&req.password, user.password_hash.as_deref())? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }
    if !user.is_verified() {
        return Err(AuthError::NotVerified);
    }

    let token = keys.sign(user.id, user.name.as_deref())?;
    info!(user_id = %user.id, "user logged in");
    Ok((token, user))
}
