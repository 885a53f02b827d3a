use serde::{Deserialize, Deserializer, Serialize};

use super::repo_types::PublicUser;

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub email: String,
    pub password: String,
}

/// Request body for passcode verification. Clients send the code either as a
/// string or as a bare number.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtpRequest {
    pub email: String,
    #[serde(deserialize_with = "string_or_number")]
    pub otp: String,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.trim().to_string(),
        Raw::Number(n) => n.to_string(),
    })
}
