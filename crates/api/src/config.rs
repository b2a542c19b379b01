//! Process configuration from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the API binary.
#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub admin_login: String,
    pub admin_password: String,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("jwt_ttl_minutes", &self.jwt_ttl_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("admin_login", &self.admin_login)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_var(&lookup, "BIND_ADDR", "0.0.0.0:8080", |raw| {
            raw.parse::<SocketAddr>().map_err(|e| e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://access_control.db?mode=rwc".to_string());

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let jwt_ttl_minutes = parse_var(&lookup, "JWT_TTL_MINUTES", "15", |raw| match raw.parse::<i64>() {
            Ok(v) if v > 0 => Ok(v),
            Ok(_) => Err("must be positive".to_string()),
            Err(e) => Err(e.to_string()),
        })?;

        let bcrypt_cost = parse_var(&lookup, "BCRYPT_COST", "12", |raw| match raw.parse::<u32>() {
            Ok(v) if (4..=31).contains(&v) => Ok(v),
            Ok(_) => Err("must be between 4 and 31".to_string()),
            Err(e) => Err(e.to_string()),
        })?;

        let admin_login = lookup("ADMIN_LOGIN").unwrap_or_else(|| "admin".to_string());
        let admin_password = lookup("ADMIN_PASSWORD").unwrap_or_else(|| {
            tracing::warn!("ADMIN_PASSWORD not set; bootstrap admin uses insecure dev default");
            "admin".to_string()
        });

        Ok(Self {
            bind_addr,
            database_url,
            jwt_secret,
            jwt_ttl_minutes,
            bcrypt_cost,
            admin_login,
            admin_password,
        })
    }

    /// In-memory store, cheap hashing; for tests.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_ttl_minutes: 15,
            bcrypt_cost: accessctl_auth::password::MIN_COST,
            admin_login: "admin".to_string(),
            admin_password: "admin".to_string(),
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    parse(value.trim()).map_err(|reason| ConfigError::Invalid { name, value, reason })
}
