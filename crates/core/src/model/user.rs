//! User read models and write inputs.
//!
//! A user references its role only through `role_id`; the role's name and
//! description are resolved by the store on read.

use serde::{Deserialize, Serialize};

use crate::{RoleId, UserId};

/// List entry: one user with its role description resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub role_description: String,
}

/// Full user record (never includes the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub other_details: String,
    pub role_id: RoleId,
    pub role_description: String,
}

/// What authentication needs to know about a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub id: UserId,
    pub login: String,
    pub password_hash: String,
    pub role_name: String,
}

/// A validated, ready-to-insert user. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub password_hash: String,
    pub other_details: String,
    pub role_id: RoleId,
}

/// Partial update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub login: Option<String>,
    pub password_hash: Option<String>,
    pub other_details: Option<String>,
    pub role_id: Option<RoleId>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.login.is_none()
            && self.password_hash.is_none()
            && self.other_details.is_none()
            && self.role_id.is_none()
    }

    /// Merge the patch over an existing record.
    pub fn apply_to(&self, view: &mut UserView) {
        if let Some(v) = &self.first_name {
            view.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            view.last_name = v.clone();
        }
        if let Some(v) = &self.login {
            view.login = v.clone();
        }
        if let Some(v) = &self.other_details {
            view.other_details = v.clone();
        }
        if let Some(v) = self.role_id {
            view.role_id = v;
        }
    }
}
