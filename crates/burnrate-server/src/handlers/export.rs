//! Transaction export handler

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Response, StatusCode},
};
use serde::Deserialize;
use tracing::info;

use super::parse_date;
use crate::{get_actor, AppError, AppState};
use burnrate_core::ExportOptions;

/// Query parameters for transaction export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// End date (YYYY-MM-DD)
    pub to: Option<String>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
}

/// GET /api/export - Download transactions as CSV
pub async fn export_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ExportQuery>,
) -> Result<Response<Body>, AppError> {
    let actor = get_actor(&headers, &state.config);

    let opts = ExportOptions {
        from: parse_date(params.from.as_deref(), "from")?,
        to: parse_date(params.to.as_deref(), "to")?,
        account_id: params.account_id,
        category_id: params.category_id,
    };

    let csv = state
        .db
        .export_transactions_csv(&opts)
        .map_err(AppError::from_core)?;
    let lines = csv.lines().count().saturating_sub(1);
    info!("Exported {} transactions to CSV", lines);

    state.db.log_audit(
        &actor,
        "export",
        Some("transaction"),
        None,
        Some(&format!(
            "from={:?}, to={:?}, account_id={:?}, category_id={:?}, rows={}",
            opts.from, opts.to, opts.account_id, opts.category_id, lines
        )),
    )?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"transactions.csv\"",
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&e.to_string()))
}
