//! Repository for the `project_clients` assignment table.

use atelier_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::project_client::{ProjectClient, ProjectClientUser};

const COLUMNS: &str = "id, project_id, user_id, can_approve, created_at";

pub struct ProjectClientRepo;

impl ProjectClientRepo {
    /// Assign a client to a project. Re-assigning updates `can_approve`
    /// instead of failing.
    pub async fn add<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        user_id: DbId,
        can_approve: bool,
    ) -> Result<ProjectClient, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_clients (project_id, user_id, can_approve)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_project_clients_project_user
             DO UPDATE SET can_approve = EXCLUDED.can_approve
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectClient>(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(can_approve)
            .fetch_one(executor)
            .await
    }

    pub async fn remove<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_clients WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Assigned clients with their user details, in assignment order.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectClientUser>, sqlx::Error> {
        sqlx::query_as::<_, ProjectClientUser>(
            "SELECT u.id AS user_id, u.email, u.name, u.company_name, pc.can_approve,
                    pc.created_at AS assigned_at
             FROM project_clients pc
             JOIN users u ON u.id = pc.user_id
             WHERE pc.project_id = $1
             ORDER BY pc.created_at, pc.id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Whether `user_id` is assigned to `project_id`.
    pub async fn is_client<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM project_clients WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Whether `user_id` is an assigned client allowed to approve.
    pub async fn can_approve(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM project_clients
                WHERE project_id = $1 AND user_id = $2 AND can_approve = true)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Ids of active clients with approval rights on the project.
    pub async fn approver_ids<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT pc.user_id FROM project_clients pc
             JOIN users u ON u.id = pc.user_id
             WHERE pc.project_id = $1 AND pc.can_approve = true AND u.is_active = true
             ORDER BY pc.user_id",
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }

    /// Live projects a user is assigned to as a client.
    pub async fn project_ids_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT pc.project_id FROM project_clients pc
             JOIN projects p ON p.id = pc.project_id
             WHERE pc.user_id = $1 AND p.deleted_at IS NULL
             ORDER BY pc.project_id",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Ids of every assigned client regardless of approval rights.
    pub async fn client_ids(pool: &PgPool, project_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT user_id FROM project_clients WHERE project_id = $1 ORDER BY user_id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
