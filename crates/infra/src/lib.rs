//! Infrastructure layer: persistence and reference-data bootstrap.

pub mod seed;
pub mod store;

pub use store::{AccessControlStore, SqliteStore, StoreError, StoreResult};
