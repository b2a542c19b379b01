//! Shared request-time dependencies: the store, the token signer, hashing.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};

use accessctl_auth::{AuthError, Hs256Jwt, JwtClaims, JwtIssuer, Role, hash_password, verify_password};
use accessctl_infra::{AccessControlStore, SqliteStore, seed};

use crate::app::errors::{ApiError, ApiResult};
use crate::config::ApiConfig;

const UNKNOWN_LOGIN_PASSWORD: &str = "unknown-login-placeholder";

/// Handler dependencies, shared behind an `Arc` via `Extension`.
pub struct AppServices {
    pub store: Arc<dyn AccessControlStore>,
    pub jwt: Arc<Hs256Jwt>,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Hash at `bcrypt_cost` checked when the login is unknown, so both
    /// failure paths pay one bcrypt verification.
    unknown_login_hash: String,
}

/// Connect the store, seed reference data and the bootstrap admin.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store = SqliteStore::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open store at {}", config.database_url))?;

    seed::seed_reference_data(&store).await?;
    seed::ensure_admin(&store, &config.admin_login, &config.admin_password, config.bcrypt_cost).await?;

    let cost = config.bcrypt_cost;
    let unknown_login_hash = tokio::task::spawn_blocking(move || hash_password(UNKNOWN_LOGIN_PASSWORD, cost))
        .await
        .context("unknown-login hash task failed")??;

    Ok(AppServices {
        store: Arc::new(store),
        jwt: Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes())),
        token_ttl: Duration::minutes(config.jwt_ttl_minutes),
        bcrypt_cost: config.bcrypt_cost,
        unknown_login_hash,
    })
}

impl AppServices {
    /// Check `login`/`password` and issue a bearer token carrying the user's role.
    ///
    /// Unknown login and wrong password fail identically.
    pub async fn login(&self, login: &str, password: &str) -> ApiResult<String> {
        let credentials = self.store.find_credentials(login).await?;
        let password_hash = match &credentials {
            Some(credentials) => credentials.password_hash.clone(),
            None => self.unknown_login_hash.clone(),
        };

        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| ApiError::Internal(format!("password verification task failed: {e}")))?;

        let credentials = match (credentials, verified) {
            (Some(credentials), Ok(())) => credentials,
            (Some(_), Err(e)) => {
                tracing::warn!(login, "login failed: wrong password");
                return Err(e.into());
            }
            (None, _) => {
                tracing::warn!(login, "login failed: unknown user");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let claims = JwtClaims::new(credentials.login, Role::new(credentials.role_name), Utc::now(), self.token_ttl);
        let token = self.jwt.issue(&claims)?;
        tracing::info!(login, role = %claims.role, "issued access token");
        Ok(token)
    }

    /// Hash a new password on the blocking pool.
    pub async fn hash_password(&self, password: String) -> ApiResult<String> {
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))??;
        Ok(hashed)
    }
}
