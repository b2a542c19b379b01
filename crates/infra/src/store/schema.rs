//! Schema bootstrap (idempotent, `IF NOT EXISTS` throughout).

use sqlx::SqlitePool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS facility_types (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        description TEXT NOT NULL,
        category    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        login         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        other_details TEXT NOT NULL,
        role_id       INTEGER NOT NULL REFERENCES roles(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS facilities (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        facility_type_id INTEGER NOT NULL REFERENCES facility_types(id),
        access_count     INTEGER NOT NULL DEFAULT 0,
        name             TEXT NOT NULL,
        description      TEXT NOT NULL,
        other_details    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS functional_areas (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        parent_id   INTEGER NULL REFERENCES functional_areas(id),
        description TEXT NOT NULL,
        category    TEXT NOT NULL,
        CHECK (parent_id IS NULL OR parent_id <> id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS facility_functional_areas (
        facility_id        INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
        functional_area_id INTEGER NOT NULL REFERENCES functional_areas(id) ON DELETE CASCADE,
        PRIMARY KEY (facility_id, functional_area_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS role_facility_access_rights (
        role_id     INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
        facility_id INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
        crud_value  TEXT NOT NULL,
        PRIMARY KEY (role_id, facility_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role_id)",
    "CREATE INDEX IF NOT EXISTS idx_functional_areas_parent ON functional_areas(parent_id)",
];

/// Create every table and index in one transaction.
pub(crate) async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}
