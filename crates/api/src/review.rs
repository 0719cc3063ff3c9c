//! Keeps pending prescriptions in step with the set of approvers.
//!
//! A prescription waits on every current approver. When an approver leaves
//! the project (removed, demoted or deactivated) the remaining decisions may
//! already settle it, so the status is recomputed in the caller's
//! transaction.

use atelier_core::prescription::{aggregate_status, STATUS_PENDING};
use atelier_core::types::DbId;
use atelier_db::repositories::{ApprovalRepo, PrescriptionRepo, ProjectClientRepo};
use sqlx::PgConnection;

/// Re-derive the status of every pending prescription of `project_id`.
/// Returns how many of them are no longer pending.
pub async fn settle_pending(
    conn: &mut PgConnection,
    project_id: DbId,
) -> Result<usize, sqlx::Error> {
    let approvers = ProjectClientRepo::approver_ids(&mut *conn, project_id).await?;
    let pending = PrescriptionRepo::pending_ids_in_project(&mut *conn, project_id).await?;

    let mut settled = 0;
    for prescription_id in pending {
        let decisions = ApprovalRepo::decisions_for_prescription(&mut *conn, prescription_id).await?;
        let pairs: Vec<(DbId, &str)> = decisions
            .iter()
            .map(|(user_id, decision)| (*user_id, decision.as_str()))
            .collect();
        let status = aggregate_status(&pairs, &approvers);
        if status == STATUS_PENDING {
            continue;
        }

        PrescriptionRepo::set_status(&mut *conn, prescription_id, status).await?;
        tracing::info!(prescription_id, project_id, status, "Pending prescription settled");
        settled += 1;
    }
    Ok(settled)
}
