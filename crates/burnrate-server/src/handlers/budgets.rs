//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::read_json;
use crate::{get_actor, AppError, AppState, SuccessResponse};
use burnrate_core::models::{Budget, BudgetStatus, NewBudget};

/// Query parameters for listing budgets
#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    /// `YYYY-MM`; all months when absent
    pub month: Option<String>,
}

/// GET /api/budgets - Budgets with the month's actual spending
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BudgetQuery>,
) -> Result<Json<Vec<BudgetStatus>>, AppError> {
    let month = params
        .month
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    if let Some(m) = month {
        let valid = NaiveDate::parse_from_str(&format!("{}-01", m), "%Y-%m-%d").is_ok();
        if m.len() != 7 || !valid {
            return Err(AppError::bad_request("Invalid month format (use YYYY-MM)"));
        }
    }

    Ok(Json(state.db.list_budgets(month)?))
}

/// POST /api/budgets - Set a category's budget for the month of `effective_date`
pub async fn upsert_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: NewBudget = read_json(request.into_body(), 1024).await?;

    let budget = state.db.upsert_budget(&req).map_err(AppError::from_core)?;

    state.db.log_audit(
        &actor,
        "upsert",
        Some("budget"),
        Some(budget.id),
        Some(&format!(
            "category_id={}, month={}, amount={:.2}",
            budget.category_id, budget.month, budget.monthly_amount
        )),
    )?;

    Ok(Json(budget))
}

/// DELETE /api/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let actor = get_actor(request.headers(), &state.config);

    state.db.delete_budget(id).map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&actor, "delete", Some("budget"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
