//! Repository for the `addresses` table.

use atelier_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::address::{Address, AddressInput};

const COLUMNS: &str = "id, street, extra, postal_code, city, country, created_at, updated_at";

pub struct AddressRepo;

impl AddressRepo {
    /// Insert an address. Accepts any executor so project creation can run
    /// it inside the same transaction.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &AddressInput,
    ) -> Result<Address, sqlx::Error> {
        let query = format!(
            "INSERT INTO addresses (street, extra, postal_code, city, country)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'FR'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Address>(&query)
            .bind(&input.street)
            .bind(&input.extra)
            .bind(&input.postal_code)
            .bind(&input.city)
            .bind(&input.country)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Address>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM addresses WHERE id = $1");
        sqlx::query_as::<_, Address>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace every field of an address.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &AddressInput,
    ) -> Result<Option<Address>, sqlx::Error> {
        let query = format!(
            "UPDATE addresses SET
                street = $2,
                extra = $3,
                postal_code = $4,
                city = $5,
                country = COALESCE($6, country)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Address>(&query)
            .bind(id)
            .bind(&input.street)
            .bind(&input.extra)
            .bind(&input.postal_code)
            .bind(&input.city)
            .bind(&input.country)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
