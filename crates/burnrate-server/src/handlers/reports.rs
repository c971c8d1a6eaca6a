//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, Local};
use serde::Deserialize;

use super::parse_date;
use crate::{AppError, AppState};
use burnrate_core::models::Dashboard;

/// Query parameters for the dashboard
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub account_id: Option<i64>,
}

/// GET /api/dashboard - Spending summary, breakdown and trend
///
/// Defaults to the current month through today.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let today = Local::now().date_naive();

    let to = parse_date(params.to.as_deref(), "to")?.unwrap_or(today);
    let from = match parse_date(params.from.as_deref(), "from")? {
        Some(from) => from,
        None => to.with_day(1).unwrap_or(to),
    };

    let dashboard = state
        .db
        .get_dashboard(from, to, params.account_id)
        .map_err(AppError::from_core)?;

    Ok(Json(dashboard))
}
