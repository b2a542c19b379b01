use thiserror::Error;

/// Authentication / authorization failure.
///
/// `InvalidCredentials` is deliberately uniform: it never says whether the
/// login or the password was wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing or malformed bearer token")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    Expired,

    #[error("Access forbidden: You do not have the required role")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signing or hashing failed; not the caller's fault.
    #[error("auth internal error: {0}")]
    Internal(String),
}
