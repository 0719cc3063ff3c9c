//! Handlers for client decisions on prescriptions.

use atelier_core::approval::{validate_decision, validate_rejection_has_comment};
use atelier_core::error::CoreError;
use atelier_core::notification_kinds::for_decision;
use atelier_core::prescription::{aggregate_status, STATUS_PENDING};
use atelier_core::types::DbId;
use atelier_db::models::approval::{ApprovalWithUser, PrescriptionApproval, SubmitDecision};
use atelier_db::models::prescription::Prescription;
use atelier_db::repositories::{ApprovalRepo, PrescriptionRepo, ProjectClientRepo};
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::access::{load_prescription_for, Need};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::{Notice, Notifier};
use crate::state::AppState;

/// Result of recording a decision: the decision itself and the
/// prescription with its recomputed status.
#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    pub approval: PrescriptionApproval,
    pub prescription: Prescription,
}

/// POST /api/v1/prescriptions/{id}/approval
///
/// Record the calling client's decision on a pending prescription. Deciding
/// again replaces the earlier decision. The prescription's status is
/// recomputed from every approver's decision in the same transaction: any
/// rejection rejects it, unanimous approval approves it.
pub async fn decide(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitDecision>,
) -> AppResult<Json<DecisionOutcome>> {
    let (_, access) = load_prescription_for(&state.pool, &user, id, Need::View).await?;
    let project_id = access.project.id;

    if !ProjectClientRepo::can_approve(&state.pool, project_id, user.user_id).await? {
        return Err(AppError::forbidden(
            "Only clients with approval rights on this project can decide",
        ));
    }

    validate_decision(&input.decision).map_err(AppError::validation)?;
    let comment = input
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    validate_rejection_has_comment(&input.decision, comment).map_err(AppError::validation)?;

    let approvers = ProjectClientRepo::approver_ids(&state.pool, project_id).await?;

    let mut tx = state.pool.begin().await?;
    let locked = PrescriptionRepo::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Prescription", id))?;
    if locked.status != STATUS_PENDING {
        return Err(AppError::conflict(format!(
            "Prescription is '{}', decisions are only accepted while pending",
            locked.status
        )));
    }

    let approval = ApprovalRepo::upsert(&mut *tx, id, user.user_id, &input.decision, comment).await?;
    let decisions = ApprovalRepo::decisions_for_prescription(&mut *tx, id).await?;
    let pairs: Vec<(DbId, &str)> = decisions
        .iter()
        .map(|(user_id, decision)| (*user_id, decision.as_str()))
        .collect();
    let status = aggregate_status(&pairs, &approvers);
    let prescription = PrescriptionRepo::set_status(&mut *tx, id, status)
        .await?
        .ok_or_else(|| CoreError::not_found("Prescription", id))?;
    tx.commit().await?;

    tracing::info!(
        prescription_id = id,
        user_id = user.user_id,
        decision = %input.decision,
        status,
        "Decision recorded"
    );

    let mut notice = Notice::new(
        for_decision(&input.decision),
        project_id,
        "prescription",
        id,
        user.user_id,
        format!("\"{}\" was {} by a client", prescription.name, input.decision),
    );
    if let Some(comment) = comment {
        notice = notice.with_body(comment);
    }
    Notifier::new(&state)
        .notify(notice, [access.project.owner_id])
        .await;

    Ok(Json(DecisionOutcome {
        approval,
        prescription,
    }))
}

/// GET /api/v1/prescriptions/{id}/approvals
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<ApprovalWithUser>>> {
    load_prescription_for(&state.pool, &user, id, Need::View).await?;
    Ok(Json(ApprovalRepo::list_for_prescription(&state.pool, id).await?))
}
