//! Project/client assignment model.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `project_clients` join table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectClient {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub can_approve: bool,
    pub created_at: Timestamp,
}

/// An assignment joined with the client's user record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectClientUser {
    pub user_id: DbId,
    pub email: String,
    pub name: String,
    pub company_name: Option<String>,
    pub can_approve: bool,
    pub assigned_at: Timestamp,
}
