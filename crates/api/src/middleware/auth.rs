//! Admin session extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use quilt_core::error::CoreError;

use crate::auth::jwt::{validate_token, Claims, JwtConfig, ADMIN_ROLE};
use crate::error::AppError;
use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "admin_session";

/// Authenticated admin, from `Authorization: Bearer <token>` or the
/// `admin_session` cookie.
///
/// ```ignore
/// async fn my_handler(admin: AdminUser) -> AppResult<Json<()>> {
///     tracing::info!(email = %admin.email, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
    pub role: String,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = session_claims(&parts.headers, &state.config.jwt)?;

        if claims.role != ADMIN_ROLE {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }

        Ok(AdminUser {
            email: claims.sub,
            role: claims.role,
        })
    }
}

/// Decode the session presented in `headers`. The bearer header wins over
/// the cookie when both are present.
pub fn session_claims(headers: &HeaderMap, jwt: &JwtConfig) -> Result<Claims, AppError> {
    let token = bearer_token(headers)?
        .or_else(|| cookie_value(headers, SESSION_COOKIE))
        .ok_or_else(|| AppError::unauthorized("Missing admin session"))?;

    validate_token(&token, jwt).map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim().to_string()))
        .ok_or_else(|| {
            AppError::unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
