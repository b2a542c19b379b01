//! Role ↔ facility access matrix.
//!
//! The matrix is stored and exposed for inspection; nothing in the request
//! path consults it when deciding whether a call is allowed.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DomainError, FacilityId, RoleId};

const ALLOWED: &str = "CRUDW";

/// CRUD permission value held by a role over a facility (e.g. `R`, `RW`, `CRUD`).
///
/// Upper-case letters from `C R U D W`, each at most once, non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessLevel(String);

impl AccessLevel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccessLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_uppercase();
        if value.is_empty() {
            return Err(DomainError::validation("crud_value must not be empty"));
        }
        let mut seen = String::with_capacity(value.len());
        for c in value.chars() {
            if !ALLOWED.contains(c) {
                return Err(DomainError::validation(format!(
                    "crud_value may only contain the letters {ALLOWED}"
                )));
            }
            if seen.contains(c) {
                return Err(DomainError::validation("crud_value must not repeat a letter"));
            }
            seen.push(c);
        }
        Ok(Self(value))
    }
}

impl TryFrom<String> for AccessLevel {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccessLevel> for String {
    fn from(value: AccessLevel) -> Self {
        value.0
    }
}

impl core::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cell of the access matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRight {
    pub role_id: RoleId,
    pub facility_id: FacilityId,
    pub crud_value: AccessLevel,
}
