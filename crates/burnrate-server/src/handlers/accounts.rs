//! Account management handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Deserialize;

use super::read_json;
use crate::{get_actor, AppError, AppState};
use burnrate_core::models::{Account, CsvFormat};

/// Request body for creating an account
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    /// `credit_card` or `checking`
    pub format: String,
}

/// GET /api/accounts - List all accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Account>>, AppError> {
    Ok(Json(state.db.list_accounts()?))
}

/// POST /api/accounts - Create an account (returns the existing one on a repeat)
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Account>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: CreateAccountRequest = read_json(request.into_body(), 1024 * 10).await?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Account name cannot be empty"));
    }
    let format: CsvFormat = req
        .format
        .parse()
        .map_err(|e: String| AppError::bad_request(&e))?;

    let account_id = state.db.upsert_account(name, format)?;

    state.db.log_audit(
        &actor,
        "create",
        Some("account"),
        Some(account_id),
        Some(&format!("name={}, format={}", name, format)),
    )?;

    let account = state
        .db
        .get_account(account_id)?
        .ok_or_else(|| AppError::internal("Account not found after creation"))?;

    Ok(Json(account))
}
