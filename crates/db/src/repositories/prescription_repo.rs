//! Repository for the `prescriptions` table.

use atelier_core::prescription::{STATUS_DRAFT, STATUS_PENDING};
use atelier_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::prescription::{
    CreatePrescription, PendingPrescription, Prescription, PrescriptionWithSpace,
    UpdatePrescription,
};

const COLUMNS: &str = "id, space_id, resource_id, category_id, name, description, brand, \
                        reference, supplier_url, image_url, quantity, unit_price_cents, status, \
                        sort_order, created_at, updated_at";

/// `COLUMNS` qualified with the `p` alias for joined queries.
const P_COLUMNS: &str = "p.id, p.space_id, p.resource_id, p.category_id, p.name, p.description, \
                          p.brand, p.reference, p.supplier_url, p.image_url, p.quantity, \
                          p.unit_price_cents, p.status, p.sort_order, p.created_at, p.updated_at";

pub struct PrescriptionRepo;

impl PrescriptionRepo {
    /// Insert a draft prescription into a space.
    pub async fn create(
        pool: &PgPool,
        space_id: DbId,
        input: &CreatePrescription,
    ) -> Result<Prescription, sqlx::Error> {
        let query = format!(
            "INSERT INTO prescriptions
                (space_id, category_id, name, description, brand, reference, supplier_url,
                 image_url, quantity, unit_price_cents, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 1), COALESCE($10, 0),
                COALESCE($11,
                    (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM prescriptions WHERE space_id = $1)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(space_id)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.brand)
            .bind(&input.reference)
            .bind(&input.supplier_url)
            .bind(&input.image_url)
            .bind(input.quantity)
            .bind(input.unit_price_cents)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Copy a library entry into a space as a new draft prescription.
    ///
    /// Returns `None` if the library entry does not exist.
    pub async fn create_from_resource(
        pool: &PgPool,
        space_id: DbId,
        resource_id: DbId,
        quantity: i32,
    ) -> Result<Option<Prescription>, sqlx::Error> {
        let query = format!(
            "INSERT INTO prescriptions
                (space_id, resource_id, category_id, name, description, brand, reference,
                 supplier_url, image_url, quantity, unit_price_cents, sort_order)
             SELECT $1, r.id, r.category_id, r.name, r.description, r.brand, r.reference,
                    r.supplier_url, r.image_url, $3, COALESCE(r.unit_price_cents, 0),
                    (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM prescriptions WHERE space_id = $1)
             FROM resource_library r
             WHERE r.id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(space_id)
            .bind(resource_id)
            .bind(quantity)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Prescription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prescriptions WHERE id = $1");
        sqlx::query_as::<_, Prescription>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Lock a prescription row for the rest of the transaction so
    /// concurrent decisions on it are serialized.
    pub async fn find_by_id_for_update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Prescription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prescriptions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Prescription>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn list_by_space(
        pool: &PgPool,
        space_id: DbId,
    ) -> Result<Vec<Prescription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prescriptions WHERE space_id = $1 ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(space_id)
            .fetch_all(pool)
            .await
    }

    /// Every prescription of a project with its space name, grouped by space
    /// order. `status` narrows the list when given.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<&str>,
    ) -> Result<Vec<PrescriptionWithSpace>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS}, s.name AS space_name
             FROM prescriptions p
             JOIN spaces s ON s.id = p.space_id
             WHERE s.project_id = $1 AND ($2::TEXT IS NULL OR p.status = $2)
             ORDER BY s.sort_order, s.id, p.sort_order, p.id"
        );
        sqlx::query_as::<_, PrescriptionWithSpace>(&query)
            .bind(project_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Apply a content edit. When `reset_to_draft` is set the status goes
    /// back to `draft` in the same statement.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdatePrescription,
        reset_to_draft: bool,
    ) -> Result<Option<Prescription>, sqlx::Error> {
        let query = format!(
            "UPDATE prescriptions SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                brand = CASE WHEN $5 THEN $6 ELSE brand END,
                reference = CASE WHEN $7 THEN $8 ELSE reference END,
                supplier_url = CASE WHEN $9 THEN $10 ELSE supplier_url END,
                image_url = CASE WHEN $11 THEN $12 ELSE image_url END,
                category_id = CASE WHEN $13 THEN $14 ELSE category_id END,
                quantity = COALESCE($15, quantity),
                unit_price_cents = COALESCE($16, unit_price_cents),
                sort_order = COALESCE($17, sort_order),
                status = CASE WHEN $18 THEN '{STATUS_DRAFT}' ELSE status END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prescription>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(nullable(&input.description))
            .bind(input.brand.is_some())
            .bind(nullable(&input.brand))
            .bind(input.reference.is_some())
            .bind(nullable(&input.reference))
            .bind(input.supplier_url.is_some())
            .bind(nullable(&input.supplier_url))
            .bind(input.image_url.is_some())
            .bind(nullable(&input.image_url))
            .bind(input.category_id.is_some())
            .bind(input.category_id.flatten())
            .bind(input.quantity)
            .bind(input.unit_price_cents)
            .bind(input.sort_order)
            .bind(reset_to_draft)
            .fetch_optional(executor)
            .await
    }

    pub async fn set_status<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        status: &str,
    ) -> Result<Option<Prescription>, sqlx::Error> {
        let query = format!("UPDATE prescriptions SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Prescription>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(executor)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prescriptions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolve the project a prescription belongs to through its space.
    pub async fn project_id_of(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT s.project_id FROM prescriptions p
             JOIN spaces s ON s.id = p.space_id
             WHERE p.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Pending prescriptions on live projects where `user_id` is an approving
    /// client and has not decided yet.
    pub async fn list_pending_for_client(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PendingPrescription>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS}, s.name AS space_name, pr.id AS project_id, pr.name AS project_name
             FROM prescriptions p
             JOIN spaces s ON s.id = p.space_id
             JOIN projects pr ON pr.id = s.project_id
             JOIN project_clients pc ON pc.project_id = pr.id
             WHERE pc.user_id = $1
               AND pc.can_approve = true
               AND pr.deleted_at IS NULL
               AND p.status = '{STATUS_PENDING}'
               AND NOT EXISTS (
                   SELECT 1 FROM prescription_approvals a
                   WHERE a.prescription_id = p.id AND a.user_id = $1)
             ORDER BY p.updated_at, p.id"
        );
        sqlx::query_as::<_, PendingPrescription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Pending prescriptions of one project, locked for a status recompute.
    pub async fn pending_ids_in_project<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT p.id
             FROM prescriptions p
             JOIN spaces s ON s.id = p.space_id
             WHERE s.project_id = $1 AND p.status = $2
             ORDER BY p.id
             FOR UPDATE OF p",
        )
        .bind(project_id)
        .bind(STATUS_PENDING)
        .fetch_all(executor)
        .await
    }

    /// Ids of every prescription on a pending or decided status, with the
    /// owning project, for status repair.
    pub async fn list_under_review(pool: &PgPool) -> Result<Vec<(DbId, DbId, String)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT p.id, s.project_id, p.status
             FROM prescriptions p
             JOIN spaces s ON s.id = p.space_id
             WHERE p.status <> $1
             ORDER BY p.id",
        )
        .bind(STATUS_DRAFT)
        .fetch_all(pool)
        .await
    }
}

/// Inner value of a present-or-cleared text field.
fn nullable(field: &Option<Option<String>>) -> Option<&str> {
    field.as_ref().and_then(Option::as_deref)
}
