//! Handlers for the `/projects` resource.

use atelier_core::error::CoreError;
use atelier_core::notification_kinds::PROJECT_CREATED;
use atelier_core::project_status::validate_project_status;
use atelier_core::roles::{ROLE_ADMIN, ROLE_AGENCY};
use atelier_core::types::DbId;
use atelier_core::validation::{reject_blank, require_non_empty};
use atelier_db::models::address::{Address, AddressInput};
use atelier_db::models::event::Event;
use atelier_db::models::project::{CreateProject, Project, ProjectSummary, UpdateProject};
use atelier_db::repositories::{AddressRepo, EventRepo, ProjectRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::access::{load_project_for, Need};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAgency;
use crate::notifications::{Notice, Notifier};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A project with its site address and budget roll-up.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub address: Option<Address>,
    pub summary: ProjectSummary,
}

/// GET /api/v1/projects
///
/// Admins see every project, agencies the ones they own, clients the ones
/// they are assigned to.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Project>>> {
    let projects = match user.role.as_str() {
        ROLE_ADMIN => ProjectRepo::list_all(&state.pool).await?,
        ROLE_AGENCY => ProjectRepo::list_for_owner(&state.pool, user.user_id).await?,
        _ => ProjectRepo::list_for_client(&state.pool, user.user_id).await?,
    };
    Ok(Json(projects))
}

/// POST /api/v1/projects
///
/// The caller becomes the owner. An optional site address is created in the
/// same transaction.
pub async fn create(
    State(state): State<AppState>,
    RequireAgency(user): RequireAgency,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    require_non_empty("name", &input.name).map_err(AppError::validation)?;
    if let Some(status) = input.status.as_deref() {
        validate_project_status(status).map_err(AppError::validation)?;
    }
    validate_budget(input.budget_cents)?;
    if let Some(address) = &input.address {
        validate_address(address)?;
    }

    let mut tx = state.pool.begin().await?;
    let address_id = match &input.address {
        Some(address) => Some(AddressRepo::create(&mut *tx, address).await?.id),
        None => None,
    };
    let project = ProjectRepo::create(&mut *tx, user.user_id, &input, address_id).await?;
    tx.commit().await?;

    tracing::info!(project_id = project.id, owner_id = user.user_id, "Project created");
    Notifier::new(&state).record(&Notice::new(
        PROJECT_CREATED,
        project.id,
        "project",
        project.id,
        user.user_id,
        format!("Project \"{}\" created", project.name),
    ));

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectDetail>> {
    let access = load_project_for(&state.pool, &user, id, Need::View).await?;

    let address = match access.project.address_id {
        Some(address_id) => AddressRepo::find_by_id(&state.pool, address_id).await?,
        None => None,
    };
    let summary = ProjectRepo::summary(&state.pool, id).await?;

    Ok(Json(ProjectDetail {
        project: access.project,
        address,
        summary,
    }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    load_project_for(&state.pool, &user, id, Need::Manage).await?;

    reject_blank("name", input.name.as_deref()).map_err(AppError::validation)?;
    if let Some(status) = input.status.as_deref() {
        validate_project_status(status).map_err(AppError::validation)?;
    }
    validate_budget(input.budget_cents.flatten())?;

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
///
/// Soft delete; the project disappears from every listing but can be
/// restored until it is purged.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_project_for(&state.pool, &user, id, Need::Manage).await?;
    ProjectRepo::soft_delete(&state.pool, id).await?;
    tracing::info!(project_id = id, user_id = user.user_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/projects/{id}/address
///
/// Create the site address, or replace the existing one in place.
pub async fn set_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddressInput>,
) -> AppResult<Json<Address>> {
    let access = load_project_for(&state.pool, &user, id, Need::Manage).await?;
    validate_address(&input)?;

    if let Some(address_id) = access.project.address_id {
        if let Some(address) = AddressRepo::update(&state.pool, address_id, &input).await? {
            return Ok(Json(address));
        }
    }

    let mut tx = state.pool.begin().await?;
    let address = AddressRepo::create(&mut *tx, &input).await?;
    ProjectRepo::set_address(&mut *tx, id, address.id).await?;
    tx.commit().await?;

    Ok(Json(address))
}

/// GET /api/v1/projects/{id}/summary
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectSummary>> {
    load_project_for(&state.pool, &user, id, Need::View).await?;
    Ok(Json(ProjectRepo::summary(&state.pool, id).await?))
}

/// GET /api/v1/projects/{id}/activity
///
/// Activity log, newest first. Returns `{ data: [...] }`.
pub async fn activity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    load_project_for(&state.pool, &user, id, Need::View).await?;
    let (limit, offset) = params.clamped();
    let events = EventRepo::list_for_project(&state.pool, id, limit, offset).await?;
    Ok(Json(DataResponse { data: events }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_budget(budget_cents: Option<i64>) -> AppResult<()> {
    if budget_cents.is_some_and(|b| b < 0) {
        return Err(AppError::validation("Budget must not be negative"));
    }
    Ok(())
}

fn validate_address(address: &AddressInput) -> AppResult<()> {
    require_non_empty("street", &address.street).map_err(AppError::validation)?;
    require_non_empty("postal_code", &address.postal_code).map_err(AppError::validation)?;
    require_non_empty("city", &address.city).map_err(AppError::validation)?;
    Ok(())
}
