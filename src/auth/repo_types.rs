use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub dob: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>, // None for external-identity accounts
    pub google_id: Option<String>,
    #[serde(skip_serializing)]
    pub otp: Option<String>, // None once the email is verified
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn is_verified(&self) -> bool {
        self.otp.as_deref().map_or(true, str::is_empty)
    }
}

/// Fields written on registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub otp: String,
}

/// User as exposed to clients and to downstream handlers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub dob: Option<String>,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            dob: u.dob,
            email: u.email,
            created_at: u.created_at,
        }
    }
}
