//! Prescription comment model.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `prescription_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub prescription_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// A comment joined with its author's display name and role.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
    pub author_role: String,
}

/// DTO for posting a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub body: String,
}
