//! Repository for the `prescription_comments` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CommentWithAuthor};

const COLUMNS: &str = "id, prescription_id, author_id, body, created_at";

pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(
        pool: &PgPool,
        prescription_id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO prescription_comments (prescription_id, author_id, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(prescription_id)
            .bind(author_id)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// Thread of a prescription, oldest first, with author name and role.
    pub async fn list_for_prescription(
        pool: &PgPool,
        prescription_id: DbId,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT c.id, c.prescription_id, c.author_id, c.body, c.created_at,
                    u.name AS author_name, r.name AS author_role
             FROM prescription_comments c
             JOIN users u ON u.id = c.author_id
             JOIN roles r ON r.id = u.role_id
             WHERE c.prescription_id = $1
             ORDER BY c.created_at, c.id",
        )
        .bind(prescription_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prescription_comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prescription_comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
