use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::{AppError, Result};

/// Argon2id with the crate's default cost parameters.
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AppError::Internal(anyhow::anyhow!("hash failed: {e}"))
        })?
        .to_string();
    Ok(hash)
}

/// A wrong password is `Ok(false)`; only an unreadable stored hash is an error.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        AppError::Internal(anyhow::anyhow!("stored hash unreadable: {e}"))
    })?;
    Ok(hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
}
