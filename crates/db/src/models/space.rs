//! Space entity model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A space row from the `spaces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Space {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new space. `project_id` comes from the route.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpace {
    pub name: String,
    pub description: Option<String>,
    /// Appended after the last space if omitted.
    pub sort_order: Option<i32>,
}

/// DTO for updating an existing space. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSpace {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}
