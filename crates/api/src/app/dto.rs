use serde::{Deserialize, Deserializer};

use accessctl_core::{
    AccessLevel, AccessRight, DomainError, Facility, FacilityPatch, FacilityType, FacilityTypeId, FunctionalArea,
    FunctionalAreaId, FunctionalAreaPatch, NewFacility, NewFunctionalArea, NewUser, Role, RoleId, UserPatch,
    UserSummary, UserView,
};

use crate::app::errors::{ApiError, ApiResult};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(username, password)`.
    pub fn validate(self) -> ApiResult<(String, String)> {
        let mut missing = MissingFields::default();
        let username = missing.text("username", self.username);
        let password = missing.text("password", self.password);
        missing.finish()?;
        Ok((username, password))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub other_details: Option<String>,
    pub role_id: Option<i64>,
}

/// A create-user request with every required field present; the password is
/// still plain text.
#[derive(Debug)]
pub struct ValidCreateUser {
    pub password: String,
    first_name: String,
    last_name: String,
    login: String,
    other_details: String,
    role_id: RoleId,
}

impl ValidCreateUser {
    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            login: self.login,
            password_hash,
            other_details: self.other_details,
            role_id: self.role_id,
        }
    }
}

impl CreateUserRequest {
    pub fn validate(self) -> ApiResult<ValidCreateUser> {
        let mut missing = MissingFields::default();
        let first_name = missing.text("first_name", self.first_name);
        let last_name = missing.text("last_name", self.last_name);
        let login = missing.text("login", self.login);
        let password = missing.text("password", self.password);
        let other_details = missing.text("other_details", self.other_details);
        let role_id = missing.value("role_id", self.role_id);
        missing.finish()?;

        Ok(ValidCreateUser {
            password,
            first_name,
            last_name,
            login,
            other_details,
            role_id: RoleId::new(role_id),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub other_details: Option<String>,
    pub role_id: Option<i64>,
}

impl UpdateUserRequest {
    /// Split into the store patch (without a hash yet) and an optional new password.
    pub fn into_patch(self) -> ApiResult<(UserPatch, Option<String>)> {
        let mut blank = BlankFields::default();
        let first_name = blank.check("first_name", self.first_name);
        let last_name = blank.check("last_name", self.last_name);
        let login = blank.check("login", self.login);
        let password = blank.check("password", self.password);
        let other_details = blank.check("other_details", self.other_details);
        blank.finish()?;

        let patch = UserPatch {
            first_name,
            last_name,
            login,
            password_hash: None,
            other_details,
            role_id: self.role_id.map(RoleId::new),
        };
        Ok((patch, password))
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFacilityRequest {
    pub facility_type_id: Option<i64>,
    pub access_count: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub other_details: Option<String>,
}

impl CreateFacilityRequest {
    pub fn validate(self) -> ApiResult<NewFacility> {
        let mut missing = MissingFields::default();
        let facility_type_id = missing.value("facility_type_id", self.facility_type_id);
        let access_count = missing.value("access_count", self.access_count);
        let name = missing.text("name", self.name);
        let description = missing.text("description", self.description);
        let other_details = missing.text("other_details", self.other_details);
        missing.finish()?;

        Ok(NewFacility {
            facility_type_id: FacilityTypeId::new(facility_type_id),
            access_count: non_negative(access_count)?,
            name,
            description,
            other_details,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateFacilityRequest {
    pub facility_type_id: Option<i64>,
    pub access_count: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub other_details: Option<String>,
}

impl UpdateFacilityRequest {
    pub fn into_patch(self) -> ApiResult<FacilityPatch> {
        let mut blank = BlankFields::default();
        let name = blank.check("name", self.name);
        let description = blank.check("description", self.description);
        let other_details = blank.check("other_details", self.other_details);
        blank.finish()?;

        Ok(FacilityPatch {
            facility_type_id: self.facility_type_id.map(FacilityTypeId::new),
            access_count: self.access_count.map(non_negative).transpose()?,
            name,
            description,
            other_details,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFunctionalAreaRequest {
    pub parent_id: Option<i64>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl CreateFunctionalAreaRequest {
    pub fn validate(self) -> ApiResult<NewFunctionalArea> {
        let mut missing = MissingFields::default();
        let description = missing.text("description", self.description);
        let category = missing.text("category", self.category);
        missing.finish()?;

        Ok(NewFunctionalArea {
            parent_id: self.parent_id.map(FunctionalAreaId::new),
            description,
            category,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateFunctionalAreaRequest {
    /// Absent: keep; `null`: make root; number: reparent.
    #[serde(default, deserialize_with = "present_or_null")]
    pub parent_id: Option<Option<i64>>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl UpdateFunctionalAreaRequest {
    pub fn into_patch(self) -> ApiResult<FunctionalAreaPatch> {
        let mut blank = BlankFields::default();
        let description = blank.check("description", self.description);
        let category = blank.check("category", self.category);
        blank.finish()?;

        Ok(FunctionalAreaPatch {
            parent_id: self.parent_id.map(|p| p.map(FunctionalAreaId::new)),
            description,
            category,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GrantAccessRequest {
    pub crud_value: Option<String>,
}

impl GrantAccessRequest {
    pub fn validate(self) -> ApiResult<AccessLevel> {
        let mut missing = MissingFields::default();
        let raw = missing.text("crud_value", self.crud_value);
        missing.finish()?;
        Ok(raw.parse::<AccessLevel>()?)
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`, via `default`).
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

fn non_negative(access_count: i64) -> ApiResult<i64> {
    if access_count < 0 {
        return Err(DomainError::validation("access_count must not be negative").into());
    }
    Ok(access_count)
}

/// Collects required fields that are absent, `null`, or blank, in declaration order.
#[derive(Default)]
struct MissingFields(Vec<&'static str>);

impl MissingFields {
    fn text(&mut self, name: &'static str, value: Option<String>) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                self.0.push(name);
                String::new()
            }
        }
    }

    fn value<T: Default>(&mut self, name: &'static str, value: Option<T>) -> T {
        value.unwrap_or_else(|| {
            self.0.push(name);
            T::default()
        })
    }

    fn finish(self) -> ApiResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::missing_fields(&self.0).into())
        }
    }
}

/// Optional fields that were supplied but blank; `null` counts as absent.
#[derive(Default)]
struct BlankFields(Vec<&'static str>);

impl BlankFields {
    fn check(&mut self, name: &'static str, value: Option<String>) -> Option<String> {
        match value {
            Some(v) if v.trim().is_empty() => {
                self.0.push(name);
                None
            }
            other => other,
        }
    }

    fn finish(self) -> ApiResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(format!("Fields must not be blank: {}", self.0.join(", "))))
        }
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn user_summary_to_json(u: UserSummary) -> serde_json::Value {
    serde_json::json!({
        "user_id": u.id.get(),
        "first_name": u.first_name,
        "last_name": u.last_name,
        "login": u.login,
        "role": u.role_description,
    })
}

pub fn user_to_json(u: UserView) -> serde_json::Value {
    serde_json::json!({
        "user_id": u.id.get(),
        "first_name": u.first_name,
        "last_name": u.last_name,
        "login": u.login,
        "other_details": u.other_details,
        "role_id": u.role_id.get(),
        "role": u.role_description,
    })
}

pub fn role_to_json(r: Role) -> serde_json::Value {
    serde_json::json!({
        "role_id": r.id.get(),
        "name": r.name,
        "description": r.description,
    })
}

pub fn facility_type_to_json(t: FacilityType) -> serde_json::Value {
    serde_json::json!({
        "facility_type_id": t.id.get(),
        "description": t.description,
        "category": t.category,
    })
}

pub fn facility_to_json(f: Facility) -> serde_json::Value {
    serde_json::json!({
        "facility_id": f.id.get(),
        "facility_type_id": f.facility_type_id.get(),
        "access_count": f.access_count,
        "name": f.name,
        "description": f.description,
        "other_details": f.other_details,
    })
}

pub fn functional_area_to_json(a: FunctionalArea) -> serde_json::Value {
    serde_json::json!({
        "functional_area_id": a.id.get(),
        "parent_id": a.parent_id.map(FunctionalAreaId::get),
        "description": a.description,
        "category": a.category,
    })
}

pub fn access_right_to_json(r: AccessRight) -> serde_json::Value {
    serde_json::json!({
        "role_id": r.role_id.get(),
        "facility_id": r.facility_id.get(),
        "crud_value": r.crud_value.as_str(),
    })
}
