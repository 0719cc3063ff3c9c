//! Handlers for prescriptions: listing, CRUD, copy from the library, and
//! submission for client review.

use atelier_core::error::CoreError;
use atelier_core::notification_kinds::{PRESCRIPTION_CREATED, PRESCRIPTION_SUBMITTED};
use atelier_core::prescription::{
    can_submit, edit_resets_review, validate_quantity, validate_status, validate_unit_price,
    STATUS_PENDING,
};
use atelier_core::types::DbId;
use atelier_core::validation::{reject_blank, require_non_empty};
use atelier_db::models::prescription::{
    CreateFromResource, CreatePrescription, Prescription, PrescriptionWithSpace,
    UpdatePrescription,
};
use atelier_db::repositories::{
    ApprovalRepo, CategoryRepo, PrescriptionRepo, ProjectClientRepo, ResourceRepo,
};
use atelier_db::DbPool;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::access::{load_prescription_for, load_project_for, load_space_for, Need};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::{Notice, Notifier};
use crate::state::AppState;

/// Query parameters for `GET /projects/{id}/prescriptions`.
#[derive(Debug, Deserialize)]
pub struct PrescriptionListParams {
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/prescriptions
///
/// Every prescription of the project with its space name, optionally
/// filtered by `?status=`.
pub async fn list_by_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<PrescriptionListParams>,
) -> AppResult<Json<Vec<PrescriptionWithSpace>>> {
    load_project_for(&state.pool, &user, project_id, Need::View).await?;
    if let Some(status) = params.status.as_deref() {
        validate_status(status).map_err(AppError::validation)?;
    }

    let items =
        PrescriptionRepo::list_by_project(&state.pool, project_id, params.status.as_deref())
            .await?;
    Ok(Json(items))
}

/// GET /api/v1/spaces/{id}/prescriptions
pub async fn list_by_space(
    State(state): State<AppState>,
    user: AuthUser,
    Path(space_id): Path<DbId>,
) -> AppResult<Json<Vec<Prescription>>> {
    load_space_for(&state.pool, &user, space_id, Need::View).await?;
    Ok(Json(PrescriptionRepo::list_by_space(&state.pool, space_id).await?))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/spaces/{id}/prescriptions
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(space_id): Path<DbId>,
    Json(input): Json<CreatePrescription>,
) -> AppResult<(StatusCode, Json<Prescription>)> {
    let (space, _) = load_space_for(&state.pool, &user, space_id, Need::Manage).await?;

    require_non_empty("name", &input.name).map_err(AppError::validation)?;
    validate_line(input.quantity, input.unit_price_cents)?;
    ensure_category_exists(&state.pool, input.category_id).await?;

    let prescription = PrescriptionRepo::create(&state.pool, space_id, &input).await?;
    record_created(&state, space.project_id, &prescription, user.user_id);

    Ok((StatusCode::CREATED, Json(prescription)))
}

/// POST /api/v1/spaces/{id}/prescriptions/from-resource
///
/// Copy a library entry the caller can see into the space as a new draft.
pub async fn create_from_resource(
    State(state): State<AppState>,
    user: AuthUser,
    Path(space_id): Path<DbId>,
    Json(input): Json<CreateFromResource>,
) -> AppResult<(StatusCode, Json<Prescription>)> {
    let (space, _) = load_space_for(&state.pool, &user, space_id, Need::Manage).await?;

    let quantity = input.quantity.unwrap_or(1);
    validate_quantity(quantity).map_err(AppError::validation)?;

    let resource = ResourceRepo::find_by_id(&state.pool, input.resource_id)
        .await?
        .filter(|r| r.is_public || r.created_by == Some(user.user_id) || user.is_admin())
        .ok_or_else(|| CoreError::not_found("Resource", input.resource_id))?;

    let prescription =
        PrescriptionRepo::create_from_resource(&state.pool, space_id, resource.id, quantity)
            .await?
            .ok_or_else(|| CoreError::not_found("Resource", resource.id))?;
    record_created(&state, space.project_id, &prescription, user.user_id);

    Ok((StatusCode::CREATED, Json(prescription)))
}

// ---------------------------------------------------------------------------
// Read / update / delete
// ---------------------------------------------------------------------------

/// GET /api/v1/prescriptions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Prescription>> {
    let (prescription, _) = load_prescription_for(&state.pool, &user, id, Need::View).await?;
    Ok(Json(prescription))
}

/// PUT /api/v1/prescriptions/{id}
///
/// Changing the content of a prescription that is under review or decided
/// sends it back to `draft` and discards the recorded decisions. Reordering
/// alone keeps the status.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePrescription>,
) -> AppResult<Json<Prescription>> {
    let (current, _) = load_prescription_for(&state.pool, &user, id, Need::Manage).await?;

    reject_blank("name", input.name.as_deref()).map_err(AppError::validation)?;
    validate_line(input.quantity, input.unit_price_cents)?;
    ensure_category_exists(&state.pool, input.category_id.flatten()).await?;

    let reset = changes_content(&input) && edit_resets_review(&current.status);

    let mut tx = state.pool.begin().await?;
    let updated = PrescriptionRepo::update(&mut *tx, id, &input, reset)
        .await?
        .ok_or_else(|| CoreError::not_found("Prescription", id))?;
    if reset {
        let cleared = ApprovalRepo::delete_for_prescription(&mut *tx, id).await?;
        tracing::info!(
            prescription_id = id,
            previous_status = %current.status,
            cleared,
            "Prescription edited, review reset to draft"
        );
    }
    tx.commit().await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/prescriptions/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_prescription_for(&state.pool, &user, id, Need::Manage).await?;
    if PrescriptionRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Prescription", id).into())
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// POST /api/v1/prescriptions/{id}/submit
///
/// Move a `draft` or `rejected` prescription to `pending`, clearing earlier
/// decisions, and notify the project's approving clients.
pub async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Prescription>> {
    let (current, access) = load_prescription_for(&state.pool, &user, id, Need::Manage).await?;
    let project_id = access.project.id;

    if !can_submit(&current.status) {
        return Err(AppError::conflict(format!(
            "Cannot submit a prescription in status '{}'",
            current.status
        )));
    }

    let approvers = ProjectClientRepo::approver_ids(&state.pool, project_id).await?;
    if approvers.is_empty() {
        return Err(AppError::conflict(
            "The project has no client who can approve this prescription",
        ));
    }

    let mut tx = state.pool.begin().await?;
    ApprovalRepo::delete_for_prescription(&mut *tx, id).await?;
    let submitted = PrescriptionRepo::set_status(&mut *tx, id, STATUS_PENDING)
        .await?
        .ok_or_else(|| CoreError::not_found("Prescription", id))?;
    tx.commit().await?;

    tracing::info!(prescription_id = id, project_id, approvers = approvers.len(), "Prescription submitted");

    let notice = Notice::new(
        PRESCRIPTION_SUBMITTED,
        project_id,
        "prescription",
        id,
        user.user_id,
        format!("\"{}\" is awaiting your approval", submitted.name),
    )
    .with_body(format!("Project: {}", access.project.name));
    Notifier::new(&state).notify(notice, approvers).await;

    Ok(Json(submitted))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_line(quantity: Option<i32>, unit_price_cents: Option<i64>) -> AppResult<()> {
    if let Some(quantity) = quantity {
        validate_quantity(quantity).map_err(AppError::validation)?;
    }
    if let Some(price) = unit_price_cents {
        validate_unit_price(price).map_err(AppError::validation)?;
    }
    Ok(())
}

async fn ensure_category_exists(pool: &DbPool, category_id: Option<DbId>) -> AppResult<()> {
    if let Some(category_id) = category_id {
        if CategoryRepo::find_by_id(pool, category_id).await?.is_none() {
            return Err(AppError::validation(format!(
                "Category {category_id} does not exist"
            )));
        }
    }
    Ok(())
}

/// Whether an update touches anything a client may have decided on.
fn changes_content(input: &UpdatePrescription) -> bool {
    input.name.is_some()
        || input.description.is_some()
        || input.brand.is_some()
        || input.reference.is_some()
        || input.supplier_url.is_some()
        || input.image_url.is_some()
        || input.category_id.is_some()
        || input.quantity.is_some()
        || input.unit_price_cents.is_some()
}

fn record_created(state: &AppState, project_id: DbId, prescription: &Prescription, actor: DbId) {
    Notifier::new(state).record(&Notice::new(
        PRESCRIPTION_CREATED,
        project_id,
        "prescription",
        prescription.id,
        actor,
        format!("\"{}\" prescribed", prescription.name),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reordering_is_not_a_content_change() {
        let input = UpdatePrescription {
            sort_order: Some(3),
            ..Default::default()
        };
        assert!(!changes_content(&input));
    }

    #[test]
    fn price_change_is_a_content_change() {
        let input = UpdatePrescription {
            unit_price_cents: Some(12_000),
            ..Default::default()
        };
        assert!(changes_content(&input));
    }

    #[test]
    fn line_validation() {
        assert!(validate_line(Some(0), None).is_err());
        assert!(validate_line(Some(2), Some(-1)).is_err());
        assert!(validate_line(None, None).is_ok());
        assert!(validate_line(Some(2), Some(0)).is_ok());
    }
}
