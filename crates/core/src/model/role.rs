use serde::{Deserialize, Serialize};

use crate::RoleId;

/// A role users are assigned to.
///
/// `name` is the tag carried in the token's role claim (e.g. `admin`);
/// `description` is what user listings display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
}

/// Input for seeding a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub description: String,
}
