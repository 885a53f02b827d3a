use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Rule for passwords chosen at registration.
pub fn check_policy(plain: &str) -> Result<(), &'static str> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password too short");
    }
    if plain.trim().is_empty() {
        return Err("Password must not be blank");
    }
    Ok(())
}

/// Argon2id PHC string with a fresh salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            anyhow::anyhow!("hash password: {e}")
        })
}

/// Accounts without a stored hash (external sign-in) never match.
pub fn verify_password(plain: &str, stored: Option<&str>) -> anyhow::Result<bool> {
    let Some(stored) = stored else {
        return Ok(false);
    };
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow::anyhow!("parse password hash: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
