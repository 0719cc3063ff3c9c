//! Repository for the `projects` table.

use atelier_core::prescription::{
    STATUS_APPROVED, STATUS_DRAFT, STATUS_PENDING, STATUS_REJECTED,
};
use atelier_core::project_status::STATUS_DRAFT as PROJECT_DRAFT;
use atelier_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::project::{CreateProject, Project, ProjectSummary, UpdateProject};

const COLUMNS: &str = "id, owner_id, name, description, status, budget_cents, address_id, \
                        deleted_at, created_at, updated_at";

/// Provides CRUD operations for projects. Soft-deleted rows are hidden from
/// every read except the `*_include_deleted` and purge helpers.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project owned by `owner_id`.
    ///
    /// If `status` is `None` in the input, defaults to `draft`. The address in
    /// the input is ignored here; pass the inserted address row's id instead.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        owner_id: DbId,
        input: &CreateProject,
        address_id: Option<DbId>,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (owner_id, name, description, status, budget_cents, address_id)
             VALUES ($1, $2, $3, COALESCE($4, '{PROJECT_DRAFT}'), $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.budget_cents)
            .bind(address_id)
            .fetch_one(executor)
            .await
    }

    /// Find a live project by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every live project, most recently created first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE deleted_at IS NULL
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Live projects owned by an agency user.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE owner_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Live projects a client has been assigned to.
    pub async fn list_for_client(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE deleted_at IS NULL
               AND id IN (SELECT project_id FROM project_clients WHERE user_id = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only fields present in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                status = COALESCE($5, status),
                budget_cents = CASE WHEN $6 THEN $7 ELSE budget_cents END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(Option::as_deref))
            .bind(&input.status)
            .bind(input.budget_cents.is_some())
            .bind(input.budget_cents.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Point the project at a (new) address row.
    pub async fn set_address<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        address_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET address_id = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(address_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a project. Children go with it through FK cascades.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-deleted projects whose `deleted_at` is older than `cutoff`.
    pub async fn list_deleted_before(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE deleted_at IS NOT NULL AND deleted_at < $1
             ORDER BY deleted_at"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Counts and budget totals for a project, computed in one query.
    pub async fn summary(pool: &PgPool, id: DbId) -> Result<ProjectSummary, sqlx::Error> {
        let query = format!(
            "SELECT
                (SELECT COUNT(*) FROM spaces WHERE project_id = $1) AS space_count,
                (SELECT COUNT(*) FROM project_clients WHERE project_id = $1) AS client_count,
                COUNT(p.id) AS item_count,
                COALESCE(SUM(p.quantity::BIGINT * p.unit_price_cents), 0)::BIGINT AS total_cents,
                COALESCE(SUM(p.quantity::BIGINT * p.unit_price_cents)
                    FILTER (WHERE p.status = '{STATUS_APPROVED}'), 0)::BIGINT AS approved_cents,
                COUNT(p.id) FILTER (WHERE p.status = '{STATUS_DRAFT}') AS draft_count,
                COUNT(p.id) FILTER (WHERE p.status = '{STATUS_PENDING}') AS pending_count,
                COUNT(p.id) FILTER (WHERE p.status = '{STATUS_APPROVED}') AS approved_count,
                COUNT(p.id) FILTER (WHERE p.status = '{STATUS_REJECTED}') AS rejected_count
             FROM prescriptions p
             JOIN spaces s ON s.id = p.space_id
             WHERE s.project_id = $1"
        );
        sqlx::query_as::<_, ProjectSummary>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
