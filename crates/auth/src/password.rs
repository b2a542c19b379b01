//! Salted password hashing (bcrypt).
//!
//! Both functions are CPU-bound; async callers should run them on a blocking
//! thread.

use crate::AuthError;

/// Lowest cost bcrypt accepts. Only suitable for tests.
pub const MIN_COST: u32 = 4;

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))
}

/// Verify `password` against a stored bcrypt hash.
///
/// A malformed stored hash is treated like a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    match bcrypt::verify(password, password_hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::InvalidCredentials),
        Err(e) => {
            tracing::warn!("stored password hash could not be checked: {e}");
            Err(AuthError::InvalidCredentials)
        }
    }
}
