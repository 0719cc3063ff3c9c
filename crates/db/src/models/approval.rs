//! Prescription approval model.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `prescription_approvals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrescriptionApproval {
    pub id: DbId,
    pub prescription_id: DbId,
    pub user_id: DbId,
    pub decision: String,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An approval joined with the deciding user's name and email.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalWithUser {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub approval: PrescriptionApproval,
    pub user_name: String,
    pub user_email: String,
}

/// Request body for recording a decision.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitDecision {
    pub decision: String,
    pub comment: Option<String>,
}
