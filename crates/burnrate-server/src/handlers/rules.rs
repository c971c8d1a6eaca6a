//! Categorization rule handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_json;
use crate::{get_actor, AppError, AppState, SuccessResponse};
use burnrate_core::categorize::test_pattern;
use burnrate_core::models::{CategorizationRule, NewRule, PatternType, RuleUpdate};
use burnrate_core::suggest_pattern;

/// GET /api/rules - List rules in evaluation order
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategorizationRule>>, AppError> {
    Ok(Json(state.db.list_rules()?))
}

/// POST /api/rules - Create a rule
pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CategorizationRule>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: NewRule = read_json(request.into_body(), 1024 * 10).await?;

    // Reject patterns that would fail at categorization time
    test_pattern(&req.pattern, req.pattern_type, "").map_err(AppError::from_core)?;

    let id = state.db.create_rule(&req).map_err(AppError::from_core)?;

    state.db.log_audit(
        &actor,
        "create",
        Some("rule"),
        Some(id),
        Some(&format!(
            "pattern={}, type={}, category_id={}",
            req.pattern,
            req.pattern_type.as_str(),
            req.category_id
        )),
    )?;

    let rule = state
        .db
        .get_rule(id)?
        .ok_or_else(|| AppError::internal("Rule not found after creation"))?;

    Ok(Json(rule))
}

/// PATCH /api/rules/:id - Update a rule
pub async fn update_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<CategorizationRule>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: RuleUpdate = read_json(request.into_body(), 1024 * 10).await?;

    let current = state
        .db
        .get_rule(id)?
        .ok_or_else(|| AppError::not_found(&format!("Rule {} not found", id)))?;

    if req.pattern.is_some() || req.pattern_type.is_some() {
        let pattern = req.pattern.as_deref().unwrap_or(&current.pattern);
        let pattern_type = req.pattern_type.unwrap_or(current.pattern_type);
        test_pattern(pattern, pattern_type, "").map_err(AppError::from_core)?;
    }

    let rule = state
        .db
        .update_rule(id, &req)
        .map_err(AppError::from_core)?;

    state.db.log_audit(
        &actor,
        "update",
        Some("rule"),
        Some(id),
        Some(&format!(
            "pattern={}, priority={}, active={}",
            rule.pattern, rule.priority, rule.is_active
        )),
    )?;

    Ok(Json(rule))
}

/// DELETE /api/rules/:id - Delete a rule
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let actor = get_actor(request.headers(), &state.config);

    state.db.delete_rule(id).map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&actor, "delete", Some("rule"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Request body for the rule tester
#[derive(Debug, Deserialize)]
pub struct TestRuleRequest {
    pub pattern: String,
    #[serde(default)]
    pub pattern_type: PatternType,
    pub description: String,
}

#[derive(Serialize)]
pub struct TestRuleResponse {
    pub matches: bool,
}

/// POST /api/rules/test - Check a pattern against a sample description
pub async fn test_rule(request: Request) -> Result<Json<TestRuleResponse>, AppError> {
    let req: TestRuleRequest = read_json(request.into_body(), 1024 * 10).await?;

    let matches = test_pattern(&req.pattern, req.pattern_type, &req.description)
        .map_err(AppError::from_core)?;

    Ok(Json(TestRuleResponse { matches }))
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub description: String,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub pattern: Option<String>,
}

/// GET /api/rules/suggest - Suggest a contains-pattern for a description
pub async fn suggest_rule(Query(params): Query<SuggestQuery>) -> Json<SuggestResponse> {
    Json(SuggestResponse {
        pattern: suggest_pattern(&params.description),
    })
}
