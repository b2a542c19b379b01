//! Role guard.
//!
//! - No IO
//! - No panics
//! - Exact role match, no hierarchy

use chrono::{DateTime, Utc};

use crate::{AuthError, JwtValidator, Principal, Role};

/// Authorize an already-authenticated principal against a required role.
pub fn authorize(principal: &Principal, required: &Role) -> Result<(), AuthError> {
    if principal.role == *required {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Full guard: token presence, signature, expiry, then role.
///
/// Fails fast in that order: a missing token is `Unauthenticated`, a bad
/// token is `InvalidToken`/`Expired`, and only a valid token with the wrong
/// role is `Forbidden`.
pub fn authorize_bearer(
    validator: &dyn JwtValidator,
    token: Option<&str>,
    required: &Role,
    now: DateTime<Utc>,
) -> Result<Principal, AuthError> {
    let token = token.ok_or(AuthError::Unauthenticated)?;
    let principal = Principal::from(validator.validate(token, now)?);
    authorize(&principal, required)?;
    Ok(principal)
}
