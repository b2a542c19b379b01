//! HS256 token signing and verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{AuthError, JwtClaims, TokenValidationError, validate_claims};

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError>;
}

/// Signs claims into a bearer token.
pub trait JwtIssuer: Send + Sync {
    fn issue(&self, claims: &JwtClaims) -> Result<String, AuthError>;
}

/// Shared-secret HS256 signer/verifier.
///
/// Expiry is checked by [`validate_claims`] rather than by `jsonwebtoken`, so
/// an expired token surfaces as [`AuthError::Expired`] instead of a generic
/// decode failure.
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Jwt {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").finish_non_exhaustive()
    }
}

impl JwtIssuer for Hs256Jwt {
    fn issue(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!("token rejected: {e}");
                AuthError::InvalidToken
            })?;

        validate_claims(&data.claims, now).map_err(|e| match e {
            TokenValidationError::Expired => AuthError::Expired,
            TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => {
                AuthError::InvalidToken
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::Role;

    #[test]
    fn round_trips_claims() {
        let jwt = Hs256Jwt::new("test-secret");
        let claims = JwtClaims::new("alice", Role::new("user"), Utc::now(), Duration::minutes(15));

        let token = jwt.issue(&claims).unwrap();
        let decoded = jwt.validate(&token, Utc::now()).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = Hs256Jwt::new("secret-a");
        let validator = Hs256Jwt::new("secret-b");
        let claims = JwtClaims::new("admin", Role::admin(), Utc::now(), Duration::minutes(15));

        let token = issuer.issue(&claims).unwrap();
        assert_eq!(validator.validate(&token, Utc::now()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn reports_expiry_distinctly() {
        let jwt = Hs256Jwt::new("test-secret");
        let issued = Utc::now() - Duration::hours(2);
        let claims = JwtClaims::new("admin", Role::admin(), issued, Duration::hours(1));

        let token = jwt.issue(&claims).unwrap();
        assert_eq!(jwt.validate(&token, Utc::now()), Err(AuthError::Expired));
    }

    #[test]
    fn garbage_is_invalid() {
        let jwt = Hs256Jwt::new("test-secret");
        assert_eq!(jwt.validate("not.a.jwt", Utc::now()), Err(AuthError::InvalidToken));
    }
}
