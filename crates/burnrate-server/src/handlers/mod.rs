//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod accounts;
pub mod auth;
pub mod budgets;
pub mod burn_rate;
pub mod categories;
pub mod export;
pub mod reports;
pub mod rules;
pub mod status;
pub mod transactions;

// Re-export all handlers for use in router
pub use accounts::*;
pub use auth::*;
pub use budgets::*;
pub use burn_rate::*;
pub use categories::*;
pub use export::*;
pub use reports::*;
pub use rules::*;
pub use status::*;
pub use transactions::*;

use axum::body::Body;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::AppError;

/// Read and deserialize a JSON request body of at most `limit` bytes
pub(crate) async fn read_json<T: DeserializeOwned>(body: Body, limit: usize) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// Parse an optional `YYYY-MM-DD` query parameter; blank counts as absent
pub(crate) fn parse_date(value: Option<&str>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::bad_request(&format!("Invalid {} date format (use YYYY-MM-DD)", name)))
}
