//! Stored upload models (client photos and project files).

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `client_photos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientPhoto {
    pub id: DbId,
    pub project_id: DbId,
    pub uploaded_by: Option<DbId>,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub caption: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `project_files` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectFile {
    pub id: DbId,
    pub project_id: DbId,
    pub uploaded_by: Option<DbId>,
    #[serde(skip_serializing)]
    pub file_path: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub label: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording a stored upload. `note` is the photo caption or the
/// file label depending on the target table.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub project_id: DbId,
    pub uploaded_by: DbId,
    pub file_path: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub note: Option<String>,
}
