//! Project entity model and DTOs.

use atelier_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::address::AddressInput;
use crate::models::double_option;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub budget_cents: Option<Cents>,
    pub address_id: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project. The owner comes from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `draft` if omitted.
    pub status: Option<String>,
    pub budget_cents: Option<Cents>,
    /// Optional site address, inserted before the project row.
    pub address: Option<AddressInput>,
}

/// DTO for updating an existing project. All fields are optional.
///
/// `description` and `budget_cents` distinguish `null` (clear) from an
/// omitted field (keep).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub budget_cents: Option<Option<Cents>>,
}

/// Aggregated counts and budget figures for one project.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct ProjectSummary {
    pub space_count: i64,
    pub client_count: i64,
    pub item_count: i64,
    pub total_cents: i64,
    pub approved_cents: i64,
    pub draft_count: i64,
    pub pending_count: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
}
