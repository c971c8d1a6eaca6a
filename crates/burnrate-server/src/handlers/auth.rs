//! Login and token verification handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::read_json;
use crate::{bearer_token, create_token, verify_password, verify_token, AppError, AppState, TOKEN_SUBJECT};

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/auth/login - Exchange the password for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(password_hash), Some(secret)) =
        (&state.config.password_hash, &state.config.jwt_secret)
    else {
        return Err(AppError::service_unavailable("Login is not configured"));
    };

    let req: LoginRequest = read_json(request.into_body(), 1024).await?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::bad_request("Password required"))?;

    if !verify_password(&password, password_hash) {
        warn!("Failed login attempt");
        return Err(AppError::unauthorized("Invalid password"));
    }

    let (token, expires_at) = create_token(secret)?;

    state
        .db
        .log_audit(TOKEN_SUBJECT, "login", Some("session"), None, None)?;
    info!(expires_at = %expires_at, "Session token issued");

    Ok(Json(LoginResponse { token, expires_at }))
}

/// GET /api/auth/verify - Check the bearer token and report its expiry
pub async fn verify(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<VerifyResponse>, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::unauthorized("No token provided"))?;

    let expires_at = state
        .config
        .jwt_secret
        .as_deref()
        .and_then(|secret| verify_token(token, secret))
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

    Ok(Json(VerifyResponse {
        valid: true,
        expires_at,
    }))
}
