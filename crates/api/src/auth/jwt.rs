//! HS256 session tokens for the admin surface.
//!
//! The same token is returned in the login body and set as the
//! `admin_session` cookie.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role name carried by every admin session.
pub const ADMIN_ROLE: &str = "admin";

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the admin's email.
    pub sub: String,
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Configuration for session token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Session lifetime in minutes (default: 7 days).
    pub expiry_mins: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("expiry_mins", &self.expiry_mins)
            .finish_non_exhaustive()
    }
}

/// Default session lifetime in minutes.
const DEFAULT_EXPIRY_MINS: i64 = 7 * 24 * 60;

/// Signing key used when `JWT_SECRET` is unset. Development only.
const DEV_SECRET: &str = "quilt-dev-secret-change-me";

impl JwtConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var           | Default              |
    /// |-------------------|----------------------|
    /// | `JWT_SECRET`      | development secret   |
    /// | `JWT_EXPIRY_MINS` | `10080`              |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_EXPIRY_MINS` is not a positive integer.
    pub fn from_env() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development signing key");
                DEV_SECRET.to_string()
            }
        };

        let expiry_mins: i64 = std::env::var("JWT_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_EXPIRY_MINS must be a valid i64");
        assert!(expiry_mins > 0, "JWT_EXPIRY_MINS must be positive");

        Self {
            secret,
            expiry_mins,
        }
    }

    /// Session lifetime in seconds, as used for the cookie `Max-Age`.
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_mins * 60
    }
}

/// Generate an HS256 session token for `email` with `role`.
pub fn generate_access_token(
    email: &str,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: email.to_string(),
        role: role.to_string(),
        exp: now + config.expiry_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a session token, returning the embedded [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_mins: 60,
        }
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = test_config();
        let token = generate_access_token("admin@example.com", ADMIN_ROLE, &config)
            .expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, "admin@example.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_expired_token_fails() {
        let config = test_config();

        // Well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "admin@example.com".to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed");

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = JwtConfig {
            secret: "secret-alpha".to_string(),
            expiry_mins: 15,
        };
        let config_b = JwtConfig {
            secret: "secret-bravo".to_string(),
            expiry_mins: 15,
        };

        let token = generate_access_token("a@example.com", ADMIN_ROLE, &config_a)
            .expect("token generation should succeed");

        assert!(
            validate_token(&token, &config_b).is_err(),
            "token signed with a different secret must fail"
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("test-secret"));
    }
}
