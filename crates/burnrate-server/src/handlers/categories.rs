//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::{Deserialize, Deserializer};

use super::read_json;
use crate::{get_actor, AppError, AppState, SuccessResponse};
use burnrate_core::models::{Category, CategoryUpdate, NewCategory, SpendingGroup};

/// GET /api/categories - List categories in display order
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.db.list_categories()?))
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: NewCategory = read_json(request.into_body(), 1024 * 10).await?;

    let id = state.db.create_category(&req).map_err(AppError::from_core)?;

    state.db.log_audit(
        &actor,
        "create",
        Some("category"),
        Some(id),
        Some(&format!("name={}", req.name)),
    )?;

    let category = state
        .db
        .get_category(id)?
        .ok_or_else(|| AppError::internal("Category not found after creation"))?;

    Ok(Json(category))
}

/// Request body for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(flatten)]
    pub update: CategoryUpdate,
    /// Absent leaves the group alone; `null` removes the category from its group
    #[serde(default, deserialize_with = "present")]
    pub burn_rate_group: Option<Option<SpendingGroup>>,
}

/// Distinguish an explicit `null` from a missing field
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// PATCH /api/categories/:id - Rename, reorder, toggle or regroup a category
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let actor = get_actor(request.headers(), &state.config);
    let req: UpdateCategoryRequest = read_json(request.into_body(), 1024 * 10).await?;

    let mut category = state
        .db
        .update_category(id, &req.update)
        .map_err(AppError::from_core)?;

    if let Some(group) = req.burn_rate_group {
        state
            .db
            .set_category_group(id, group)
            .map_err(AppError::from_core)?;
        category.burn_rate_group = group;
    }

    state.db.log_audit(
        &actor,
        "update",
        Some("category"),
        Some(id),
        Some(&format!(
            "name={}, group={}, active={}",
            category.name,
            category.burn_rate_group.map(|g| g.as_str()).unwrap_or("none"),
            category.is_active
        )),
    )?;

    Ok(Json(category))
}

/// DELETE /api/categories/:id - Delete an unused category with its rules and budgets
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let actor = get_actor(request.headers(), &state.config);

    state.db.delete_category(id).map_err(AppError::from_core)?;

    state
        .db
        .log_audit(&actor, "delete", Some("category"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
