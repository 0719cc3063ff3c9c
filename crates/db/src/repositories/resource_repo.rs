//! Repository for the `resource_library` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::resource::{CreateResource, Resource, ResourceSearch, UpdateResource};

const COLUMNS: &str = "id, name, description, brand, reference, supplier, supplier_url, \
                        image_url, unit_price_cents, category_id, created_by, is_public, \
                        created_at, updated_at";

pub struct ResourceRepo;

impl ResourceRepo {
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateResource,
    ) -> Result<Resource, sqlx::Error> {
        let query = format!(
            "INSERT INTO resource_library
                (name, description, brand, reference, supplier, supplier_url, image_url,
                 unit_price_cents, category_id, created_by, is_public)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.brand)
            .bind(&input.reference)
            .bind(&input.supplier)
            .bind(&input.supplier_url)
            .bind(&input.image_url)
            .bind(input.unit_price_cents)
            .bind(input.category_id)
            .bind(created_by)
            .bind(input.is_public)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Resource>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM resource_library WHERE id = $1");
        sqlx::query_as::<_, Resource>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Filtered, paginated library listing ordered by name.
    pub async fn search(pool: &PgPool, filter: &ResourceSearch) -> Result<Vec<Resource>, sqlx::Error> {
        let pattern = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", escape_like(q)));
        let query = format!(
            "SELECT {COLUMNS} FROM resource_library
             WHERE ($1::TEXT IS NULL
                    OR name ILIKE $1 OR brand ILIKE $1 OR reference ILIKE $1)
               AND ($2::BIGINT[] IS NULL OR category_id = ANY($2))
               AND ($3::BIGINT IS NULL OR is_public = true OR created_by = $3)
             ORDER BY name, id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(pattern)
            .bind(&filter.category_ids)
            .bind(filter.visible_to)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateResource,
    ) -> Result<Option<Resource>, sqlx::Error> {
        let query = format!(
            "UPDATE resource_library SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                brand = COALESCE($4, brand),
                reference = COALESCE($5, reference),
                supplier = COALESCE($6, supplier),
                supplier_url = COALESCE($7, supplier_url),
                image_url = COALESCE($8, image_url),
                unit_price_cents = COALESCE($9, unit_price_cents),
                category_id = COALESCE($10, category_id),
                is_public = COALESCE($11, is_public)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Resource>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.brand)
            .bind(&input.reference)
            .bind(&input.supplier)
            .bind(&input.supplier_url)
            .bind(&input.image_url)
            .bind(input.unit_price_cents)
            .bind(input.category_id)
            .bind(input.is_public)
            .fetch_optional(pool)
            .await
    }

    /// Delete an entry. Prescriptions copied from it keep their data.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resource_library WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_quotes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("chair"), "chair");
    }
}
