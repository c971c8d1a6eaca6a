//! Transaction handlers: listing, upload, review queue, categorization

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::read_json;
use crate::{get_actor, AppError, AppState, MAX_PAGE_LIMIT, MAX_UPLOAD_SIZE};
use burnrate_core::models::{CsvFormat, NewRule, Transaction, TransactionQuery, DEFAULT_RULE_PRIORITY};
use burnrate_core::{ingest, suggest_pattern, ImportSummary};

/// GET /api/transactions - List transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(mut query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    // Input validation: clamp pagination parameters
    query.limit = Some(query.limit.unwrap_or(100).clamp(1, MAX_PAGE_LIMIT));
    query.offset = Some(query.offset.unwrap_or(0).max(0));

    Ok(Json(state.db.list_transactions(&query)?))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))?;

    Ok(Json(transaction))
}

/// POST /api/transactions/upload - Import a Bank of America CSV export
///
/// Expects multipart form with:
/// - file: CSV file (required, max 10MB)
/// - account_id: Account ID to import into (required)
/// - format: `credit_card` or `checking` (optional, auto-detected)
pub async fn upload_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut account_id: Option<i64> = None;
    let mut format: Option<CsvFormat> = None;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;

                // Check file size limit
                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "account_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read account_id"))?;
                account_id = Some(value.trim().parse().map_err(|_| {
                    AppError::bad_request(&format!("Invalid account_id: {}", value))
                })?);
            }
            "format" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read format"))?;
                if !value.trim().is_empty() {
                    format = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|e: String| AppError::bad_request(&e))?,
                    );
                }
            }
            _ => {}
        }
    }

    // Validate required fields
    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let account_id = account_id.ok_or_else(|| AppError::bad_request("Missing account_id field"))?;

    import_csv_core(&state, &headers, file_data, account_id, format)
}

/// Import logic separated from multipart parsing
pub fn import_csv_core(
    state: &AppState,
    headers: &HeaderMap,
    file_data: Vec<u8>,
    account_id: i64,
    format: Option<CsvFormat>,
) -> Result<Json<ImportSummary>, AppError> {
    let actor = get_actor(headers, &state.config);

    let content =
        String::from_utf8(file_data).map_err(|_| AppError::bad_request("File is not valid UTF-8"))?;

    let summary =
        ingest(&state.db, account_id, content.as_bytes(), format).map_err(AppError::from_core)?;

    state.db.log_audit(
        &actor,
        "import",
        Some("transactions"),
        Some(account_id),
        Some(&format!(
            "new={}, duplicates={}, review={}, errors={}",
            summary.new_count, summary.duplicate_count, summary.review_count, summary.error_count
        )),
    )?;

    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub limit: Option<i64>,
}

/// GET /api/transactions/review - Transactions no rule could categorize
pub async fn review_queue(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReviewQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let limit = params.limit.unwrap_or(100).clamp(1, MAX_PAGE_LIMIT);
    Ok(Json(state.db.review_queue(limit)?))
}

/// Request body for updating one transaction
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    pub category_id: Option<i64>,
    pub is_recurring: Option<bool>,
    pub is_explosion: Option<bool>,
}

/// PATCH /api/transactions/:id - Set category and burn rate flags
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: UpdateTransactionRequest = read_json(request.into_body(), 1024).await?;

    state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))?;

    if let Some(category_id) = req.category_id {
        state
            .db
            .set_transaction_category(id, category_id)
            .map_err(AppError::from_core)?;
    }
    if req.is_recurring.is_some() || req.is_explosion.is_some() {
        state
            .db
            .set_transaction_flags(id, req.is_recurring, req.is_explosion)
            .map_err(AppError::from_core)?;
    }

    state.db.log_audit(
        &actor,
        "update",
        Some("transaction"),
        Some(id),
        Some(&format!(
            "category_id={:?}, recurring={:?}, explosion={:?}",
            req.category_id, req.is_recurring, req.is_explosion
        )),
    )?;

    let transaction = state
        .db
        .get_transaction(id)?
        .ok_or_else(|| AppError::internal("Transaction not found after update"))?;

    Ok(Json(transaction))
}

/// Request body for batch categorization
#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    pub transaction_ids: Vec<i64>,
    pub category_id: i64,
    /// Also create a rule so future imports match
    #[serde(default)]
    pub create_rule: bool,
    /// Rule pattern; suggested from the first transaction when absent
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategorizeResponse {
    pub updated: usize,
    pub rule_id: Option<i64>,
    pub pattern: Option<String>,
}

/// POST /api/transactions/categorize - Categorize several transactions at once
pub async fn categorize_transactions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CategorizeResponse>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: CategorizeRequest = read_json(request.into_body(), 1024 * 100).await?;

    if req.transaction_ids.is_empty() {
        return Err(AppError::bad_request("transaction_ids cannot be empty"));
    }

    let updated = state
        .db
        .categorize_transactions(&req.transaction_ids, req.category_id)
        .map_err(AppError::from_core)?;

    let mut rule_id = None;
    let mut pattern = None;
    if req.create_rule {
        let rule_pattern = match req.pattern.filter(|p| !p.trim().is_empty()) {
            Some(p) => Some(p),
            None => state
                .db
                .get_transaction(req.transaction_ids[0])?
                .and_then(|tx| suggest_pattern(&tx.description)),
        };

        let rule_pattern = rule_pattern
            .ok_or_else(|| AppError::bad_request("No pattern supplied and none could be suggested"))?;

        let id = state
            .db
            .create_rule(&NewRule {
                pattern: rule_pattern.clone(),
                pattern_type: Default::default(),
                category_id: req.category_id,
                priority: DEFAULT_RULE_PRIORITY,
                account_id: None,
            })
            .map_err(AppError::from_core)?;

        info!(rule_id = id, pattern = %rule_pattern, "Rule created from batch categorization");
        rule_id = Some(id);
        pattern = Some(rule_pattern);
    }

    state.db.log_audit(
        &actor,
        "categorize",
        Some("transaction"),
        None,
        Some(&format!(
            "count={}, category_id={}, rule_id={:?}",
            updated, req.category_id, rule_id
        )),
    )?;

    Ok(Json(CategorizeResponse {
        updated,
        rule_id,
        pattern,
    }))
}
