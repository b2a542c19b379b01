use serde::{Deserialize, Serialize};

use crate::{JwtClaims, Role};

/// Identity of an authenticated caller, as established by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Login of the authenticated user.
    pub subject: String,
    pub role: Role,
}

impl Principal {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }
}

impl From<JwtClaims> for Principal {
    fn from(claims: JwtClaims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
        }
    }
}
