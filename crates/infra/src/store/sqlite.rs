//! SQLite-backed `AccessControlStore`.
//!
//! ## Transactions
//!
//! Every write opens one transaction, runs all of its statements on it and
//! commits at the end. Any early `?` return drops the transaction, which rolls
//! it back.
//!
//! ## Foreign keys
//!
//! SQLite only enforces `REFERENCES` clauses with `PRAGMA foreign_keys = ON`;
//! the connect options set it on every pooled connection.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::instrument;

use accessctl_core::{
    AccessLevel, AccessRight, Facility, FacilityId, FacilityPatch, FacilityType,
    FacilityTypeId, FunctionalArea, FunctionalAreaId, FunctionalAreaPatch, NewFacility,
    NewFacilityType, NewFunctionalArea, NewRole, NewUser, Role, RoleId, UserCredentials, UserId,
    UserPatch, UserSummary, UserView, ensure_acyclic,
};

use super::schema::init_schema;
use super::{AccessControlStore, StoreError, StoreResult};

const USER_NOT_FOUND: &str = "User not found";
const ROLE_NOT_FOUND: &str = "Role not found";
const FACILITY_NOT_FOUND: &str = "Facility not found";
const AREA_NOT_FOUND: &str = "Functional area not found";
const LINK_NOT_FOUND: &str = "Functional area is not linked to this facility";
const ACCESS_RIGHT_NOT_FOUND: &str = "Access right not found";

const SELECT_USER_VIEW: &str = r#"
    SELECT u.id, u.first_name, u.last_name, u.login, u.other_details, u.role_id,
           r.description AS role_description
    FROM users u
    JOIN roles r ON r.id = u.role_id
    WHERE u.id = ?
"#;

const SELECT_FACILITY: &str = r#"
    SELECT id, facility_type_id, access_count, name, description, other_details
    FROM facilities
    WHERE id = ?
"#;

const SELECT_AREA: &str = r#"
    SELECT id, parent_id, description, category
    FROM functional_areas
    WHERE id = ?
"#;

/// SQLite store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and bootstrap the schema.
    ///
    /// In-memory URLs get a single, never-recycled connection so every query
    /// sees the same database.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| map_sqlx_error("parse_url", e))?
            .foreign_keys(true)
            .create_if_missing(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool. The schema is created if absent.
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        init_schema(&pool)
            .await
            .map_err(|e| map_sqlx_error("init_schema", e))?;
        tracing::debug!("access-control schema ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AccessControlStore for SqliteStore {
    #[instrument(skip(self), err)]
    async fn create_role(&self, role: NewRole) -> StoreResult<RoleId> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let id = sqlx::query("INSERT INTO roles (name, description) VALUES (?, ?)")
            .bind(&role.name)
            .bind(&role.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_role", e))?
            .last_insert_rowid();
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(RoleId::new(id))
    }

    #[instrument(skip(self), err)]
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query("SELECT id, name, description FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_roles", e))?;
        collect_rows(&rows, role_from_row, "list_roles")
    }

    #[instrument(skip(self), err)]
    async fn get_role(&self, id: RoleId) -> StoreResult<Option<Role>> {
        let row = sqlx::query("SELECT id, name, description FROM roles WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_role", e))?;
        row.as_ref()
            .map(role_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_role", e))
    }

    #[instrument(skip(self), err)]
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let row = sqlx::query("SELECT id, name, description FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role_by_name", e))?;
        row.as_ref()
            .map(role_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_role_by_name", e))
    }

    #[instrument(skip(self), err)]
    async fn create_facility_type(&self, facility_type: NewFacilityType) -> StoreResult<FacilityTypeId> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let id = sqlx::query("INSERT INTO facility_types (description, category) VALUES (?, ?)")
            .bind(&facility_type.description)
            .bind(&facility_type.category)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_facility_type", e))?
            .last_insert_rowid();
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(FacilityTypeId::new(id))
    }

    #[instrument(skip(self), err)]
    async fn list_facility_types(&self) -> StoreResult<Vec<FacilityType>> {
        let rows = sqlx::query("SELECT id, description, category FROM facility_types ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_facility_types", e))?;
        collect_rows(&rows, facility_type_from_row, "list_facility_types")
    }

    #[instrument(skip(self), err)]
    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.first_name, u.last_name, u.login, r.description AS role_description
            FROM users u
            JOIN roles r ON r.id = u.role_id
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;
        collect_rows(&rows, user_summary_from_row, "list_users")
    }

    #[instrument(skip(self), err)]
    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserView>> {
        let row = sqlx::query(SELECT_USER_VIEW)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref()
            .map(user_view_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_user", e))
    }

    #[instrument(skip(self), err)]
    async fn find_credentials(&self, login: &str) -> StoreResult<Option<UserCredentials>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.login, u.password_hash, r.name AS role_name
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.login = ?
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_credentials", e))?;

        row.as_ref()
            .map(|row| -> Result<UserCredentials, sqlx::Error> {
                Ok(UserCredentials {
                    id: UserId::new(row.try_get("id")?),
                    login: row.try_get("login")?,
                    password_hash: row.try_get("password_hash")?,
                    role_name: row.try_get("role_name")?,
                })
            })
            .transpose()
            .map_err(|e| map_sqlx_error("find_credentials", e))
    }

    #[instrument(skip(self, user), fields(login = %user.login, role_id = %user.role_id), err)]
    async fn create_user(&self, user: NewUser) -> StoreResult<UserId> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let id = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, login, password_hash, other_details, role_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.login)
        .bind(&user.password_hash)
        .bind(&user.other_details)
        .bind(user.role_id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?
        .last_insert_rowid();
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(UserId::new(id))
    }

    #[instrument(skip(self, patch), err)]
    async fn update_user(&self, id: UserId, patch: UserPatch) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut user = fetch_user_view(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound(USER_NOT_FOUND))?;
        if patch.is_empty() {
            return Ok(());
        }
        patch.apply_to(&mut user);

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, login = ?, other_details = ?, role_id = ?,
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.login)
        .bind(&user.other_details)
        .bind(user.role_id.get())
        .bind(patch.password_hash.as_deref())
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let affected = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound(USER_NOT_FOUND));
        }
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn list_facilities(&self) -> StoreResult<Vec<Facility>> {
        let rows = sqlx::query(
            "SELECT id, facility_type_id, access_count, name, description, other_details FROM facilities ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_facilities", e))?;
        collect_rows(&rows, facility_from_row, "list_facilities")
    }

    #[instrument(skip(self), err)]
    async fn get_facility(&self, id: FacilityId) -> StoreResult<Option<Facility>> {
        let row = sqlx::query(SELECT_FACILITY)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_facility", e))?;
        row.as_ref()
            .map(facility_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_facility", e))
    }

    #[instrument(skip(self), err)]
    async fn create_facility(&self, facility: NewFacility) -> StoreResult<FacilityId> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let id = sqlx::query(
            r#"
            INSERT INTO facilities (facility_type_id, access_count, name, description, other_details)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(facility.facility_type_id.get())
        .bind(facility.access_count)
        .bind(&facility.name)
        .bind(&facility.description)
        .bind(&facility.other_details)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_facility", e))?
        .last_insert_rowid();
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(FacilityId::new(id))
    }

    #[instrument(skip(self), err)]
    async fn update_facility(&self, id: FacilityId, patch: FacilityPatch) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(SELECT_FACILITY)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_facility", e))?
            .ok_or(StoreError::NotFound(FACILITY_NOT_FOUND))?;
        let mut facility = facility_from_row(&row).map_err(|e| map_sqlx_error("update_facility", e))?;
        patch.apply_to(&mut facility);

        sqlx::query(
            r#"
            UPDATE facilities
            SET facility_type_id = ?, access_count = ?, name = ?, description = ?, other_details = ?
            WHERE id = ?
            "#,
        )
        .bind(facility.facility_type_id.get())
        .bind(facility.access_count)
        .bind(&facility.name)
        .bind(&facility.description)
        .bind(&facility.other_details)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_facility", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn delete_facility(&self, id: FacilityId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let affected = sqlx::query("DELETE FROM facilities WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_facility", e))?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound(FACILITY_NOT_FOUND));
        }
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn list_functional_areas(&self) -> StoreResult<Vec<FunctionalArea>> {
        let rows = sqlx::query("SELECT id, parent_id, description, category FROM functional_areas ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_functional_areas", e))?;
        collect_rows(&rows, area_from_row, "list_functional_areas")
    }

    #[instrument(skip(self), err)]
    async fn get_functional_area(&self, id: FunctionalAreaId) -> StoreResult<Option<FunctionalArea>> {
        let row = sqlx::query(SELECT_AREA)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_functional_area", e))?;
        row.as_ref()
            .map(area_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_functional_area", e))
    }

    #[instrument(skip(self), err)]
    async fn create_functional_area(&self, area: NewFunctionalArea) -> StoreResult<FunctionalAreaId> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let id = sqlx::query("INSERT INTO functional_areas (parent_id, description, category) VALUES (?, ?, ?)")
            .bind(area.parent_id.map(FunctionalAreaId::get))
            .bind(&area.description)
            .bind(&area.category)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_functional_area", e))?
            .last_insert_rowid();
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(FunctionalAreaId::new(id))
    }

    #[instrument(skip(self), err)]
    async fn update_functional_area(&self, id: FunctionalAreaId, patch: FunctionalAreaPatch) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(SELECT_AREA)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_functional_area", e))?
            .ok_or(StoreError::NotFound(AREA_NOT_FOUND))?;
        let mut area = area_from_row(&row).map_err(|e| map_sqlx_error("update_functional_area", e))?;

        if let Some(Some(new_parent)) = patch.parent_id {
            let parents = load_parent_map(&mut *tx).await?;
            ensure_acyclic(&parents, id, new_parent).map_err(StoreError::from)?;
        }
        patch.apply_to(&mut area);

        sqlx::query("UPDATE functional_areas SET parent_id = ?, description = ?, category = ? WHERE id = ?")
            .bind(area.parent_id.map(FunctionalAreaId::get))
            .bind(&area.description)
            .bind(&area.category)
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_functional_area", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn delete_functional_area(&self, id: FunctionalAreaId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let children: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM functional_areas WHERE parent_id = ?")
            .bind(id.get())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_functional_area", e))?;
        if children > 0 {
            return Err(StoreError::Integrity(format!(
                "functional area {id} still has {children} child area(s)"
            )));
        }

        let affected = sqlx::query("DELETE FROM functional_areas WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_functional_area", e))?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound(AREA_NOT_FOUND));
        }
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn list_facility_functional_areas(&self, facility: FacilityId) -> StoreResult<Vec<FunctionalArea>> {
        let mut conn = self.pool.acquire().await.map_err(|e| map_sqlx_error("acquire", e))?;
        if !exists(&mut *conn, "SELECT 1 FROM facilities WHERE id = ?", facility.get()).await? {
            return Err(StoreError::NotFound(FACILITY_NOT_FOUND));
        }

        let rows = sqlx::query(
            r#"
            SELECT a.id, a.parent_id, a.description, a.category
            FROM facility_functional_areas l
            JOIN functional_areas a ON a.id = l.functional_area_id
            WHERE l.facility_id = ?
            ORDER BY a.id
            "#,
        )
        .bind(facility.get())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("list_facility_functional_areas", e))?;
        collect_rows(&rows, area_from_row, "list_facility_functional_areas")
    }

    #[instrument(skip(self), err)]
    async fn link_functional_area(&self, facility: FacilityId, area: FunctionalAreaId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        sqlx::query(
            r#"
            INSERT INTO facility_functional_areas (facility_id, functional_area_id)
            VALUES (?, ?)
            ON CONFLICT (facility_id, functional_area_id) DO NOTHING
            "#,
        )
        .bind(facility.get())
        .bind(area.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("link_functional_area", e))?;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn unlink_functional_area(&self, facility: FacilityId, area: FunctionalAreaId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let affected = sqlx::query(
            "DELETE FROM facility_functional_areas WHERE facility_id = ? AND functional_area_id = ?",
        )
        .bind(facility.get())
        .bind(area.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("unlink_functional_area", e))?
        .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound(LINK_NOT_FOUND));
        }
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn list_access_rights(&self, role: RoleId) -> StoreResult<Vec<AccessRight>> {
        let mut conn = self.pool.acquire().await.map_err(|e| map_sqlx_error("acquire", e))?;
        if !exists(&mut *conn, "SELECT 1 FROM roles WHERE id = ?", role.get()).await? {
            return Err(StoreError::NotFound(ROLE_NOT_FOUND));
        }

        let rows = sqlx::query(
            r#"
            SELECT role_id, facility_id, crud_value
            FROM role_facility_access_rights
            WHERE role_id = ?
            ORDER BY facility_id
            "#,
        )
        .bind(role.get())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("list_access_rights", e))?;
        collect_rows(&rows, access_right_from_row, "list_access_rights")
    }

    #[instrument(skip(self), err)]
    async fn grant_access(&self, role: RoleId, facility: FacilityId, level: AccessLevel) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        sqlx::query(
            r#"
            INSERT INTO role_facility_access_rights (role_id, facility_id, crud_value)
            VALUES (?, ?, ?)
            ON CONFLICT (role_id, facility_id) DO UPDATE SET crud_value = excluded.crud_value
            "#,
        )
        .bind(role.get())
        .bind(facility.get())
        .bind(level.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("grant_access", e))?;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(skip(self), err)]
    async fn revoke_access(&self, role: RoleId, facility: FacilityId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))?;
        let affected = sqlx::query("DELETE FROM role_facility_access_rights WHERE role_id = ? AND facility_id = ?")
            .bind(role.get())
            .bind(facility.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("revoke_access", e))?
            .rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound(ACCESS_RIGHT_NOT_FOUND));
        }
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }
}

// ---------------------------------------------------------------------------
// Helpers

async fn fetch_user_view(conn: &mut SqliteConnection, id: UserId) -> StoreResult<Option<UserView>> {
    let row = sqlx::query(SELECT_USER_VIEW)
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("fetch_user", e))?;
    row.as_ref()
        .map(user_view_from_row)
        .transpose()
        .map_err(|e| map_sqlx_error("fetch_user", e))
}

async fn load_parent_map(
    conn: &mut SqliteConnection,
) -> StoreResult<HashMap<FunctionalAreaId, Option<FunctionalAreaId>>> {
    let rows = sqlx::query("SELECT id, parent_id FROM functional_areas")
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("load_parent_map", e))?;

    rows.iter()
        .map(|row| -> Result<_, sqlx::Error> {
            let id: i64 = row.try_get("id")?;
            let parent: Option<i64> = row.try_get("parent_id")?;
            Ok((FunctionalAreaId::new(id), parent.map(FunctionalAreaId::new)))
        })
        .collect::<Result<_, _>>()
        .map_err(|e| map_sqlx_error("load_parent_map", e))
}

async fn exists(conn: &mut SqliteConnection, sql: &str, id: i64) -> StoreResult<bool> {
    let found = sqlx::query(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("exists", e))?;
    Ok(found.is_some())
}

fn collect_rows<T>(
    rows: &[SqliteRow],
    map: fn(&SqliteRow) -> Result<T, sqlx::Error>,
    operation: &str,
) -> StoreResult<Vec<T>> {
    rows.iter()
        .map(map)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_sqlx_error(operation, e))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{} in {}", db_err.message(), operation);
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StoreError::Integrity(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Database(format!("connection pool closed in {}", operation)),
        sqlx::Error::PoolTimedOut => StoreError::Database(format!("connection pool timed out in {}", operation)),
        other => StoreError::Database(format!("{} failed: {}", operation, other)),
    }
}

// SQLx row mappers

fn role_from_row(row: &SqliteRow) -> Result<Role, sqlx::Error> {
    Ok(Role {
        id: RoleId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

fn facility_type_from_row(row: &SqliteRow) -> Result<FacilityType, sqlx::Error> {
    Ok(FacilityType {
        id: FacilityTypeId::new(row.try_get("id")?),
        description: row.try_get("description")?,
        category: row.try_get("category")?,
    })
}

fn user_summary_from_row(row: &SqliteRow) -> Result<UserSummary, sqlx::Error> {
    Ok(UserSummary {
        id: UserId::new(row.try_get("id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        login: row.try_get("login")?,
        role_description: row.try_get("role_description")?,
    })
}

fn user_view_from_row(row: &SqliteRow) -> Result<UserView, sqlx::Error> {
    Ok(UserView {
        id: UserId::new(row.try_get("id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        login: row.try_get("login")?,
        other_details: row.try_get("other_details")?,
        role_id: RoleId::new(row.try_get("role_id")?),
        role_description: row.try_get("role_description")?,
    })
}

fn facility_from_row(row: &SqliteRow) -> Result<Facility, sqlx::Error> {
    Ok(Facility {
        id: FacilityId::new(row.try_get("id")?),
        facility_type_id: FacilityTypeId::new(row.try_get("facility_type_id")?),
        access_count: row.try_get("access_count")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        other_details: row.try_get("other_details")?,
    })
}

fn area_from_row(row: &SqliteRow) -> Result<FunctionalArea, sqlx::Error> {
    let parent: Option<i64> = row.try_get("parent_id")?;
    Ok(FunctionalArea {
        id: FunctionalAreaId::new(row.try_get("id")?),
        parent_id: parent.map(FunctionalAreaId::new),
        description: row.try_get("description")?,
        category: row.try_get("category")?,
    })
}

fn access_right_from_row(row: &SqliteRow) -> Result<AccessRight, sqlx::Error> {
    let raw: String = row.try_get("crud_value")?;
    let crud_value = raw
        .parse::<AccessLevel>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(AccessRight {
        role_id: RoleId::new(row.try_get("role_id")?),
        facility_id: FacilityId::new(row.try_get("facility_id")?),
        crud_value,
    })
}
