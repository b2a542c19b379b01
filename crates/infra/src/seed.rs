//! Reference data and bootstrap administrator.
//!
//! Both entry points are idempotent and safe to run on every start.

use anyhow::Context;

use accessctl_auth::{Role as RoleClaim, hash_password};
use accessctl_core::{NewFacilityType, NewRole, NewUser};

use crate::store::AccessControlStore;

pub const USER_ROLE: &str = "user";

const ROLES: &[(&str, &str)] = &[(RoleClaim::ADMIN, "Administrator"), (USER_ROLE, "Standard user")];

const FACILITY_TYPES: &[(&str, &str)] = &[("Menu", "Menus"), ("Record", "Records"), ("Screen", "Screens")];

/// Insert the standard roles and facility types that are not present yet.
pub async fn seed_reference_data(store: &dyn AccessControlStore) -> anyhow::Result<()> {
    for (name, description) in ROLES {
        if store.find_role_by_name(name).await?.is_none() {
            store
                .create_role(NewRole { name: (*name).to_string(), description: (*description).to_string() })
                .await
                .with_context(|| format!("failed to seed role {name}"))?;
            tracing::info!(role = name, "seeded role");
        }
    }

    let existing = store.list_facility_types().await?;
    for (description, category) in FACILITY_TYPES {
        if existing.iter().any(|t| t.description == *description) {
            continue;
        }
        store
            .create_facility_type(NewFacilityType {
                description: (*description).to_string(),
                category: (*category).to_string(),
            })
            .await
            .with_context(|| format!("failed to seed facility type {description}"))?;
        tracing::info!(facility_type = description, "seeded facility type");
    }

    Ok(())
}

/// Create the bootstrap administrator unless a user with `login` already exists.
///
/// Returns `true` when a user was created. An existing account is never
/// modified, so a changed password survives restarts.
pub async fn ensure_admin(
    store: &dyn AccessControlStore,
    login: &str,
    password: &str,
    bcrypt_cost: u32,
) -> anyhow::Result<bool> {
    if store.find_credentials(login).await?.is_some() {
        return Ok(false);
    }

    let role = store
        .find_role_by_name(RoleClaim::ADMIN)
        .await?
        .context("admin role missing; seed reference data first")?;

    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, bcrypt_cost))
        .await
        .context("password hashing task failed")??;

    store
        .create_user(NewUser {
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            login: login.to_string(),
            password_hash,
            other_details: "bootstrap account".to_string(),
            role_id: role.id,
        })
        .await
        .context("failed to create bootstrap admin")?;

    tracing::info!(login, "created bootstrap admin");
    Ok(true)
}
