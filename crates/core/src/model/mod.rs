//! Entity models and the write inputs accepted by the persistence layer.

pub mod access_right;
pub mod facility;
pub mod functional_area;
pub mod role;
pub mod user;

pub use access_right::{AccessLevel, AccessRight};
pub use facility::{Facility, FacilityPatch, FacilityType, NewFacility, NewFacilityType};
pub use functional_area::{FunctionalArea, FunctionalAreaPatch, NewFunctionalArea, ensure_acyclic};
pub use role::{NewRole, Role};
pub use user::{NewUser, UserCredentials, UserPatch, UserSummary, UserView};
