//! Handlers for the shared resource library (`/library`).
//!
//! Agencies see public entries plus their own private ones; admins see
//! everything. Only the creator or an admin may change an entry.

use atelier_core::category_tree::descendants_of;
use atelier_core::error::CoreError;
use atelier_core::prescription::validate_unit_price;
use atelier_core::types::DbId;
use atelier_core::validation::{reject_blank, require_non_empty};
use atelier_db::models::resource::{CreateResource, Resource, ResourceSearch, UpdateResource};
use atelier_db::repositories::{CategoryRepo, ResourceRepo};
use atelier_db::DbPool;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::category::load_refs;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAgency;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /library`.
#[derive(Debug, Deserialize)]
pub struct LibrarySearchParams {
    /// Matched against name, brand and reference.
    pub q: Option<String>,
    /// Restricts to this category and everything below it.
    pub category_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/library
pub async fn search(
    State(state): State<AppState>,
    RequireAgency(user): RequireAgency,
    Query(params): Query<LibrarySearchParams>,
) -> AppResult<Json<DataResponse<Vec<Resource>>>> {
    let category_ids = match params.category_id {
        Some(category_id) => {
            let refs = load_refs(&state.pool).await?;
            if !refs.iter().any(|c| c.id == category_id) {
                return Err(AppError::validation(format!(
                    "Category {category_id} does not exist"
                )));
            }
            Some(descendants_of(&refs, category_id))
        }
        None => None,
    };

    let filter = ResourceSearch {
        q: params.q,
        category_ids,
        visible_to: (!user.is_admin()).then_some(user.user_id),
        limit: atelier_db::clamp_limit(params.limit),
        offset: atelier_db::clamp_offset(params.offset),
    };
    let resources = ResourceRepo::search(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: resources }))
}

/// POST /api/v1/library
pub async fn create(
    State(state): State<AppState>,
    RequireAgency(user): RequireAgency,
    Json(input): Json<CreateResource>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    require_non_empty("name", &input.name).map_err(AppError::validation)?;
    validate_fields(&state.pool, input.unit_price_cents, input.category_id).await?;

    let resource = ResourceRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(resource_id = resource.id, user_id = user.user_id, "Library entry created");
    Ok((StatusCode::CREATED, Json(resource)))
}

/// GET /api/v1/library/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAgency(user): RequireAgency,
    Path(id): Path<DbId>,
) -> AppResult<Json<Resource>> {
    let resource = load_visible(&state.pool, &user, id).await?;
    Ok(Json(resource))
}

/// PUT /api/v1/library/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAgency(user): RequireAgency,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateResource>,
) -> AppResult<Json<Resource>> {
    load_editable(&state.pool, &user, id).await?;
    reject_blank("name", input.name.as_deref()).map_err(AppError::validation)?;
    validate_fields(&state.pool, input.unit_price_cents, input.category_id).await?;

    let resource = ResourceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Resource", id))?;
    Ok(Json(resource))
}

/// DELETE /api/v1/library/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAgency(user): RequireAgency,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_editable(&state.pool, &user, id).await?;
    ResourceRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_visible(resource: &Resource, user: &AuthUser) -> bool {
    resource.is_public || resource.created_by == Some(user.user_id) || user.is_admin()
}

async fn load_visible(pool: &DbPool, user: &AuthUser, id: DbId) -> AppResult<Resource> {
    ResourceRepo::find_by_id(pool, id)
        .await?
        .filter(|r| is_visible(r, user))
        .ok_or_else(|| CoreError::not_found("Resource", id).into())
}

async fn load_editable(pool: &DbPool, user: &AuthUser, id: DbId) -> AppResult<Resource> {
    let resource = load_visible(pool, user, id).await?;
    if resource.created_by != Some(user.user_id) && !user.is_admin() {
        return Err(AppError::forbidden(
            "Only the creator can change this library entry",
        ));
    }
    Ok(resource)
}

async fn validate_fields(
    pool: &DbPool,
    unit_price_cents: Option<i64>,
    category_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(price) = unit_price_cents {
        validate_unit_price(price).map_err(AppError::validation)?;
    }
    if let Some(category_id) = category_id {
        if CategoryRepo::find_by_id(pool, category_id).await?.is_none() {
            return Err(AppError::validation(format!(
                "Category {category_id} does not exist"
            )));
        }
    }
    Ok(())
}
