//! Burn rate, feedback, intensity and target handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::read_json;
use crate::{get_actor, AppError, AppState, MAX_PAGE_LIMIT};
use burnrate_core::burn::BurnRateReport;
use burnrate_core::models::{FeedbackEntry, GroupTarget, SpendingGroup};
use burnrate_core::{BurnRateEngine, FeedbackOutcome};

/// Query parameters for the burn rate curve
#[derive(Debug, Deserialize)]
pub struct BurnRateQuery {
    /// Curve intensity override; the stored setting is used when absent or blank
    pub intensity: Option<String>,
}

/// GET /api/burn-rate - Curves for every spending group
pub async fn get_burn_rate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BurnRateQuery>,
) -> Result<Json<BurnRateReport>, AppError> {
    let intensity = params
        .intensity
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| AppError::bad_request(&format!("Invalid intensity: {}", raw)))
        })
        .transpose()?;

    let engine = BurnRateEngine::new(&state.db, &state.config.engine);
    let report = engine
        .compute(intensity, Local::now().date_naive())
        .map_err(AppError::from_core)?;

    Ok(Json(report))
}

/// Request body for burn rate feedback
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub group: String,
    pub sentiment: String,
}

/// POST /api/burn-rate/feedback - Rate the current burn rate for a group
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<FeedbackOutcome>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: FeedbackRequest = read_json(request.into_body(), 1024).await?;

    let engine = BurnRateEngine::new(&state.db, &state.config.engine);
    let outcome = engine
        .submit_feedback(&req.group, &req.sentiment, Local::now().date_naive())
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &actor,
        "feedback",
        Some("burn_rate"),
        None,
        Some(&format!(
            "group={}, sentiment={}, new_target={:?}",
            req.group, req.sentiment, outcome.new_target
        )),
    )?;

    Ok(Json(outcome))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntensityBody {
    pub intensity: f64,
}

/// GET /api/settings/intensity - Stored curve intensity
pub async fn get_intensity(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IntensityBody>, AppError> {
    let engine = BurnRateEngine::new(&state.db, &state.config.engine);
    let intensity = engine.stored_intensity().map_err(AppError::from_core)?;
    Ok(Json(IntensityBody { intensity }))
}

/// PUT /api/settings/intensity - Persist the curve intensity (clamped to [0, 1])
pub async fn set_intensity(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<IntensityBody>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: IntensityBody = read_json(request.into_body(), 1024).await?;

    let engine = BurnRateEngine::new(&state.db, &state.config.engine);
    let intensity = engine
        .set_intensity(req.intensity)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &actor,
        "update",
        Some("setting"),
        None,
        Some(&format!("curve_intensity={}", intensity)),
    )?;

    Ok(Json(IntensityBody { intensity }))
}

/// GET /api/targets - Current daily target per group
pub async fn list_targets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GroupTarget>>, AppError> {
    Ok(Json(state.db.list_targets()?))
}

/// Query parameters for the feedback log
#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    pub group: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/feedback - Recent feedback, newest first
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedbackQuery>,
) -> Result<Json<Vec<FeedbackEntry>>, AppError> {
    let group: Option<SpendingGroup> = params
        .group
        .as_deref()
        .map(|g| g.parse().map_err(|e: String| AppError::bad_request(&e)))
        .transpose()?;
    let limit = params.limit.unwrap_or(50).clamp(1, MAX_PAGE_LIMIT);

    Ok(Json(state.db.list_feedback(group, limit)?))
}
