//! Handlers for the `/auth` resource (login, me, logout).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::DateTime;
use quilt_core::types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, ADMIN_ROLE};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{session_claims, SESSION_COOKIE};
use crate::response::{Ack, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Session lifetime in seconds.
    pub expires_in: i64,
    pub email: String,
    pub role: String,
}

/// Body of `GET /auth/me`. Anonymous callers get `authenticated: false`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Verify the admin credential and open a session (body token + cookie).
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let email = input.email.trim().to_lowercase();
    if email.is_empty() || input.password.is_empty() {
        return Err(AppError::BadRequest("Email and password required".into()));
    }

    let admin = state
        .config
        .admin
        .as_ref()
        .filter(|admin| admin.email == email)
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    let matches = verify_password(&input.password, &admin.password_hash)
        .map_err(|e| AppError::InternalError(format!("Stored admin hash is invalid: {e}")))?;
    if !matches {
        tracing::warn!(email = %email, "Admin login rejected");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let jwt = &state.config.jwt;
    let token = generate_access_token(&admin.email, ADMIN_ROLE, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(email = %admin.email, "Admin logged in");

    let cookie = session_cookie(&token, jwt.expiry_secs());
    Ok((
        [(SET_COOKIE, cookie)],
        Json(DataResponse {
            data: LoginResponse {
                access_token: token,
                expires_in: jwt.expiry_secs(),
                email: admin.email.clone(),
                role: ADMIN_ROLE.to_string(),
            },
        }),
    ))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<DataResponse<SessionInfo>> {
    let info = match session_claims(&headers, &state.config.jwt) {
        Ok(claims) => SessionInfo {
            authenticated: true,
            email: Some(claims.sub),
            role: Some(claims.role),
            expires_at: DateTime::from_timestamp(claims.exp, 0),
        },
        Err(_) => SessionInfo {
            authenticated: false,
            email: None,
            role: None,
            expires_at: None,
        },
    };
    Json(DataResponse { data: info })
}

/// POST /api/v1/auth/logout
///
/// Clears the session cookie. Tokens are stateless, so a copied bearer
/// token stays valid until it expires.
pub async fn logout() -> impl IntoResponse {
    (
        [(SET_COOKIE, session_cookie("", 0))],
        Json(DataResponse { data: Ack::ok() }),
    )
}
