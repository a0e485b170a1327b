//! Password hashing and verification using bcrypt

use crate::core::error::{CareError, Result};

/// Hash a password using bcrypt with a fresh random salt
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| CareError::TaskError(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored digest.
///
/// A digest that bcrypt cannot parse counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::debug!("Password digest could not be verified: {}", e);
            false
        }
    }
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| CareError::TaskError(format!("Password hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_password_blocking(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Password verification task failed: {}", e);
            false
        })
}
