//! `accessctl-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! sign and check tokens, hash and verify passwords, and compare a principal's
//! role against a requirement. Resolving a login to a stored user is the
//! caller's job.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, authorize_bearer};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use jwt::{Hs256Jwt, JwtIssuer, JwtValidator};
pub use password::{hash_password, verify_password};
pub use principal::Principal;
pub use roles::Role;
