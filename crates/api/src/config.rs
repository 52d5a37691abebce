use std::str::FromStr;

use quilt_core::claims::{DEFAULT_DRAW_DURATION_SECS, DEFAULT_RENEW_INTERVAL_SECS};
use quilt_core::grid::DEFAULT_BOARD_SIZE;
use quilt_core::settings::{CollageSettings, DEFAULT_FEED_KEEPALIVE_SECS};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Claim protocol and change-feed tunables.
    pub collage: CollageSettings,
    /// Admin session signing.
    pub jwt: JwtConfig,
    /// The single admin login, if configured.
    pub admin: Option<AdminCredential>,
}

/// Email and argon2id PHC hash of the admin account.
#[derive(Clone)]
pub struct AdminCredential {
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredential")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl AdminCredential {
    /// Read `ADMIN_EMAIL` and `ADMIN_PASSWORD_HASH`; both must be set.
    pub fn from_env() -> Option<Self> {
        let email = std::env::var("ADMIN_EMAIL").ok()?;
        let password_hash = std::env::var("ADMIN_PASSWORD_HASH").ok()?;
        let email = email.trim().to_lowercase();
        if email.is_empty() || password_hash.is_empty() {
            return None;
        }
        Some(Self {
            email,
            password_hash,
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `DATABASE_URL`         | unset (in-memory store) |
    /// | `DRAW_DURATION_SECS`   | `300`                   |
    /// | `RENEW_INTERVAL_SECS`  | `20`                    |
    /// | `FEED_KEEPALIVE_SECS`  | `20`                    |
    /// | `DEFAULT_BOARD_SIZE`   | `5`                     |
    /// | `ADMIN_EMAIL`          | unset                   |
    /// | `ADMIN_PASSWORD_HASH`  | unset                   |
    ///
    /// See [`JwtConfig::from_env`] for the session variables.
    ///
    /// # Panics
    ///
    /// Panics if a value does not parse or the collage settings are
    /// inconsistent.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let collage = CollageSettings {
            draw_duration_secs: env_or("DRAW_DURATION_SECS", DEFAULT_DRAW_DURATION_SECS),
            renew_interval_secs: env_or("RENEW_INTERVAL_SECS", DEFAULT_RENEW_INTERVAL_SECS),
            feed_keepalive_secs: env_or("FEED_KEEPALIVE_SECS", DEFAULT_FEED_KEEPALIVE_SECS),
            default_board_size: env_or("DEFAULT_BOARD_SIZE", DEFAULT_BOARD_SIZE),
        };
        if let Err(e) = collage.validate() {
            panic!("Invalid collage settings: {e}");
        }

        let jwt = JwtConfig::from_env();

        let admin = AdminCredential::from_env();
        if admin.is_none() {
            tracing::warn!("ADMIN_EMAIL / ADMIN_PASSWORD_HASH not set, admin login is disabled");
        }

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            collage,
            jwt,
            admin,
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse as `T`.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
