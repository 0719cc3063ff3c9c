//! Repository for the `prescription_approvals` table.

use atelier_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::approval::{ApprovalWithUser, PrescriptionApproval};

const COLUMNS: &str = "id, prescription_id, user_id, decision, comment, created_at, updated_at";

pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Record a decision. A second decision by the same user replaces the first.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        prescription_id: DbId,
        user_id: DbId,
        decision: &str,
        comment: Option<&str>,
    ) -> Result<PrescriptionApproval, sqlx::Error> {
        let query = format!(
            "INSERT INTO prescription_approvals (prescription_id, user_id, decision, comment)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_prescription_approvals_prescription_user
             DO UPDATE SET decision = EXCLUDED.decision, comment = EXCLUDED.comment
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PrescriptionApproval>(&query)
            .bind(prescription_id)
            .bind(user_id)
            .bind(decision)
            .bind(comment)
            .fetch_one(executor)
            .await
    }

    /// Decisions with the deciding user's name, oldest first.
    pub async fn list_for_prescription(
        pool: &PgPool,
        prescription_id: DbId,
    ) -> Result<Vec<ApprovalWithUser>, sqlx::Error> {
        sqlx::query_as::<_, ApprovalWithUser>(
            "SELECT a.id, a.prescription_id, a.user_id, a.decision, a.comment,
                    a.created_at, a.updated_at, u.name AS user_name, u.email AS user_email
             FROM prescription_approvals a
             JOIN users u ON u.id = a.user_id
             WHERE a.prescription_id = $1
             ORDER BY a.created_at, a.id",
        )
        .bind(prescription_id)
        .fetch_all(pool)
        .await
    }

    /// `(user_id, decision)` pairs used to recompute the aggregate status.
    pub async fn decisions_for_prescription<'e>(
        executor: impl PgExecutor<'e>,
        prescription_id: DbId,
    ) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT user_id, decision FROM prescription_approvals WHERE prescription_id = $1",
        )
        .bind(prescription_id)
        .fetch_all(executor)
        .await
    }

    /// `(prescription_id, decision)` for one user across a whole project.
    pub async fn decisions_of_user_in_project(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT a.prescription_id, a.decision
             FROM prescription_approvals a
             JOIN prescriptions p ON p.id = a.prescription_id
             JOIN spaces s ON s.id = p.space_id
             WHERE s.project_id = $1 AND a.user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Drop every decision on a prescription, returning how many were removed.
    pub async fn delete_for_prescription<'e>(
        executor: impl PgExecutor<'e>,
        prescription_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prescription_approvals WHERE prescription_id = $1")
            .bind(prescription_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
