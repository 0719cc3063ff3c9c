//! Handlers for project spaces (`/projects/{id}/spaces`, `/spaces/{id}`).

use atelier_core::error::CoreError;
use atelier_core::notification_kinds::SPACE_CREATED;
use atelier_core::types::DbId;
use atelier_core::validation::{reject_blank, require_non_empty};
use atelier_db::models::space::{CreateSpace, Space, UpdateSpace};
use atelier_db::repositories::SpaceRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::access::{load_project_for, load_space_for, Need};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::{Notice, Notifier};
use crate::state::AppState;

/// GET /api/v1/projects/{id}/spaces
pub async fn list_by_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Space>>> {
    load_project_for(&state.pool, &user, project_id, Need::View).await?;
    Ok(Json(SpaceRepo::list_by_project(&state.pool, project_id).await?))
}

/// POST /api/v1/projects/{id}/spaces
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateSpace>,
) -> AppResult<(StatusCode, Json<Space>)> {
    load_project_for(&state.pool, &user, project_id, Need::Manage).await?;
    require_non_empty("name", &input.name).map_err(AppError::validation)?;

    let space = SpaceRepo::create(&state.pool, project_id, &input).await?;

    Notifier::new(&state).record(&Notice::new(
        SPACE_CREATED,
        project_id,
        "space",
        space.id,
        user.user_id,
        format!("Space \"{}\" added", space.name),
    ));

    Ok((StatusCode::CREATED, Json(space)))
}

/// GET /api/v1/spaces/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Space>> {
    let (space, _) = load_space_for(&state.pool, &user, id, Need::View).await?;
    Ok(Json(space))
}

/// PUT /api/v1/spaces/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSpace>,
) -> AppResult<Json<Space>> {
    load_space_for(&state.pool, &user, id, Need::Manage).await?;
    reject_blank("name", input.name.as_deref()).map_err(AppError::validation)?;

    let space = SpaceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Space", id))?;
    Ok(Json(space))
}

/// DELETE /api/v1/spaces/{id}
///
/// Removes the space and, through cascades, its prescriptions.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_space_for(&state.pool, &user, id, Need::Manage).await?;
    if SpaceRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Space", id).into())
    }
}
