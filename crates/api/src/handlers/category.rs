//! Handlers for resource-library categories.

use atelier_core::category_tree::{build_tree, would_create_cycle, CategoryNode, CategoryRef};
use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_core::validation::{reject_blank, require_non_empty};
use atelier_db::models::category::{Category, CreateCategory, UpdateCategory};
use atelier_db::repositories::CategoryRepo;
use atelier_db::DbPool;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireAgency};
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(CategoryRepo::list(&state.pool).await?))
}

/// GET /api/v1/categories/tree
pub async fn tree(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<CategoryNode>>> {
    let refs = load_refs(&state.pool).await?;
    Ok(Json(build_tree(&refs)))
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    RequireAgency(_user): RequireAgency,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    require_non_empty("name", &input.name).map_err(AppError::validation)?;
    let input = CreateCategory {
        name: input.name.trim().to_string(),
        ..input
    };

    ensure_name_free(&state.pool, &input.name, None).await?;
    if let Some(parent_id) = input.parent_id {
        ensure_parent_exists(&state.pool, parent_id).await?;
    }

    let category = CategoryRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/v1/categories/{id}
///
/// Rename, reorder or move a category. `"parent_id": null` moves it to the
/// root; omitting the field leaves the parent unchanged. A move that would
/// put a category under itself is rejected.
pub async fn update(
    State(state): State<AppState>,
    RequireAgency(_user): RequireAgency,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Category", id))?;
    reject_blank("name", input.name.as_deref()).map_err(AppError::validation)?;
    let input = UpdateCategory {
        name: input.name.map(|n| n.trim().to_string()),
        ..input
    };

    if let Some(name) = input.name.as_deref() {
        ensure_name_free(&state.pool, name, Some(id)).await?;
    }
    if let Some(Some(parent_id)) = input.parent_id {
        ensure_parent_exists(&state.pool, parent_id).await?;
        let refs = load_refs(&state.pool).await?;
        if would_create_cycle(&refs, id, Some(parent_id)) {
            return Err(AppError::validation(
                "A category cannot be moved under itself or one of its descendants",
            ));
        }
    }

    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Category", id))?;
    Ok(Json(category))
}

/// DELETE /api/v1/categories/{id}
///
/// Only empty categories (no children, no library entries) can be deleted.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Category", id))?;

    let children = CategoryRepo::child_count(&state.pool, id).await?;
    if children > 0 {
        return Err(AppError::conflict(format!(
            "Category has {children} subcategories"
        )));
    }
    let entries = CategoryRepo::usage_count(&state.pool, id).await?;
    if entries > 0 {
        return Err(AppError::conflict(format!(
            "Category is used by {entries} library entries"
        )));
    }

    CategoryRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn load_refs(pool: &DbPool) -> AppResult<Vec<CategoryRef>> {
    let categories = CategoryRepo::list(pool).await?;
    Ok(categories.iter().map(Category::to_tree_ref).collect())
}

/// Category names are unique across the whole tree. `current` is the
/// category being renamed, which may keep its own name.
async fn ensure_name_free(pool: &DbPool, name: &str, current: Option<DbId>) -> AppResult<()> {
    let taken = CategoryRepo::find_by_name(pool, name)
        .await?
        .is_some_and(|existing| Some(existing.id) != current);
    if taken {
        return Err(AppError::conflict(format!(
            "A category named '{name}' already exists"
        )));
    }
    Ok(())
}

async fn ensure_parent_exists(pool: &DbPool, parent_id: DbId) -> AppResult<()> {
    if CategoryRepo::find_by_id(pool, parent_id).await?.is_none() {
        return Err(AppError::validation(format!(
            "Parent category {parent_id} does not exist"
        )));
    }
    Ok(())
}
