//! Repository for the `spaces` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::space::{CreateSpace, Space, UpdateSpace};

const COLUMNS: &str = "id, project_id, name, description, sort_order, created_at, updated_at";

pub struct SpaceRepo;

impl SpaceRepo {
    /// Insert a space. Without an explicit `sort_order` it is placed after
    /// the project's current last space.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateSpace,
    ) -> Result<Space, sqlx::Error> {
        let query = format!(
            "INSERT INTO spaces (project_id, name, description, sort_order)
             VALUES ($1, $2, $3, COALESCE($4,
                (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM spaces WHERE project_id = $1)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Space>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM spaces WHERE id = $1");
        sqlx::query_as::<_, Space>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Space>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spaces WHERE project_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSpace,
    ) -> Result<Option<Space>, sqlx::Error> {
        let query = format!(
            "UPDATE spaces SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                sort_order = COALESCE($4, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a space and, by cascade, its prescriptions.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM spaces WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
