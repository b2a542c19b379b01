//! Data-access contract for the access-control entities.
//!
//! Handlers receive an `Arc<dyn AccessControlStore>`; nothing else touches the
//! database. Every write method runs in its own transaction: it either commits
//! all of its statements or none of them.

use async_trait::async_trait;
use thiserror::Error;

use accessctl_core::{
    AccessLevel, AccessRight, DomainError, Facility, FacilityId, FacilityPatch, FacilityType, FacilityTypeId,
    FunctionalArea, FunctionalAreaId, FunctionalAreaPatch, NewFacility, NewFacilityType,
    NewFunctionalArea, NewRole, NewUser, Role, RoleId, UserCredentials, UserId, UserPatch,
    UserSummary, UserView,
};

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// ## Error Categories
///
/// - **NotFound**: the addressed row does not exist (carries a caller-facing message)
/// - **Integrity**: a foreign-key, uniqueness, not-null or check constraint rejected the write
/// - **Invariant**: a domain rule checked inside the transaction failed (e.g. hierarchy cycle)
/// - **Database**: anything else (connection, pool, corrupt row)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("{0}")]
    Invariant(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvariantViolation(msg) => StoreError::Invariant(msg),
            other => StoreError::Invariant(other.to_string()),
        }
    }
}

#[async_trait]
pub trait AccessControlStore: Send + Sync {
    // Roles (reference data)
    async fn create_role(&self, role: NewRole) -> StoreResult<RoleId>;
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;
    async fn get_role(&self, id: RoleId) -> StoreResult<Option<Role>>;
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    // Facility types (reference data)
    async fn create_facility_type(&self, facility_type: NewFacilityType) -> StoreResult<FacilityTypeId>;
    async fn list_facility_types(&self) -> StoreResult<Vec<FacilityType>>;

    // Users
    async fn list_users(&self) -> StoreResult<Vec<UserSummary>>;
    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserView>>;
    async fn find_credentials(&self, login: &str) -> StoreResult<Option<UserCredentials>>;
    async fn create_user(&self, user: NewUser) -> StoreResult<UserId>;
    async fn update_user(&self, id: UserId, patch: UserPatch) -> StoreResult<()>;
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;

    // Facilities
    async fn list_facilities(&self) -> StoreResult<Vec<Facility>>;
    async fn get_facility(&self, id: FacilityId) -> StoreResult<Option<Facility>>;
    async fn create_facility(&self, facility: NewFacility) -> StoreResult<FacilityId>;
    async fn update_facility(&self, id: FacilityId, patch: FacilityPatch) -> StoreResult<()>;
    /// Deletes the facility together with its functional-area links and access rights.
    async fn delete_facility(&self, id: FacilityId) -> StoreResult<()>;

    // Functional areas
    async fn list_functional_areas(&self) -> StoreResult<Vec<FunctionalArea>>;
    async fn get_functional_area(&self, id: FunctionalAreaId) -> StoreResult<Option<FunctionalArea>>;
    async fn create_functional_area(&self, area: NewFunctionalArea) -> StoreResult<FunctionalAreaId>;
    /// Applies the patch; a new parent is checked against the hierarchy first.
    async fn update_functional_area(&self, id: FunctionalAreaId, patch: FunctionalAreaPatch) -> StoreResult<()>;
    /// Refused with `Integrity` while the area still has children.
    async fn delete_functional_area(&self, id: FunctionalAreaId) -> StoreResult<()>;

    // Facility <-> functional area links
    async fn list_facility_functional_areas(&self, facility: FacilityId) -> StoreResult<Vec<FunctionalArea>>;
    /// Idempotent.
    async fn link_functional_area(&self, facility: FacilityId, area: FunctionalAreaId) -> StoreResult<()>;
    async fn unlink_functional_area(&self, facility: FacilityId, area: FunctionalAreaId) -> StoreResult<()>;

    // Role <-> facility access matrix
    async fn list_access_rights(&self, role: RoleId) -> StoreResult<Vec<AccessRight>>;
    /// Inserts or replaces the role's access level over the facility.
    async fn grant_access(&self, role: RoleId, facility: FacilityId, level: AccessLevel) -> StoreResult<()>;
    async fn revoke_access(&self, role: RoleId, facility: FacilityId) -> StoreResult<()>;
}
