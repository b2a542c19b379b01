use serde::{Deserialize, Serialize};

use crate::{FacilityId, FacilityTypeId};

/// Reference category a facility belongs to (menus, records, screens, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityType {
    pub id: FacilityTypeId,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFacilityType {
    pub description: String,
    pub category: String,
}

/// A securable facility. Roles are granted access over facilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub facility_type_id: FacilityTypeId,
    pub access_count: i64,
    pub name: String,
    pub description: String,
    pub other_details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFacility {
    pub facility_type_id: FacilityTypeId,
    pub access_count: i64,
    pub name: String,
    pub description: String,
    pub other_details: String,
}

/// Partial update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilityPatch {
    pub facility_type_id: Option<FacilityTypeId>,
    pub access_count: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub other_details: Option<String>,
}

impl FacilityPatch {
    pub fn apply_to(&self, facility: &mut Facility) {
        if let Some(v) = self.facility_type_id {
            facility.facility_type_id = v;
        }
        if let Some(v) = self.access_count {
            facility.access_count = v;
        }
        if let Some(v) = &self.name {
            facility.name = v.clone();
        }
        if let Some(v) = &self.description {
            facility.description = v.clone();
        }
        if let Some(v) = &self.other_details {
            facility.other_details = v.clone();
        }
    }
}
