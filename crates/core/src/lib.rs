//! `accessctl-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! typed identifiers, entity models, and the write inputs the persistence
//! layer accepts.

pub mod error;
pub mod id;
pub mod model;

pub use error::{DomainError, DomainResult};
pub use id::{FacilityId, FacilityTypeId, FunctionalAreaId, RoleId, UserId};
pub use model::{
    AccessLevel, AccessRight, Facility, FacilityPatch, FacilityType, FunctionalArea,
    FunctionalAreaPatch, NewFacility, NewFacilityType, NewFunctionalArea, NewRole, NewUser, Role,
    UserCredentials, UserPatch, UserSummary, UserView, ensure_acyclic,
};
