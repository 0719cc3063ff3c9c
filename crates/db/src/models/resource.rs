//! Resource library entry model and DTOs.

use atelier_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `resource_library` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Resource {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub reference: Option<String>,
    pub supplier: Option<String>,
    pub supplier_url: Option<String>,
    pub image_url: Option<String>,
    pub unit_price_cents: Option<Cents>,
    pub category_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a library entry. `created_by` comes from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResource {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub reference: Option<String>,
    pub supplier: Option<String>,
    pub supplier_url: Option<String>,
    pub image_url: Option<String>,
    pub unit_price_cents: Option<Cents>,
    pub category_id: Option<DbId>,
    /// Defaults to `true`.
    pub is_public: Option<bool>,
}

/// DTO for updating a library entry. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateResource {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub reference: Option<String>,
    pub supplier: Option<String>,
    pub supplier_url: Option<String>,
    pub image_url: Option<String>,
    pub unit_price_cents: Option<Cents>,
    pub category_id: Option<DbId>,
    pub is_public: Option<bool>,
}

/// Search filter for the library.
#[derive(Debug, Clone, Default)]
pub struct ResourceSearch {
    /// Case-insensitive substring over name, brand and reference.
    pub q: Option<String>,
    /// Restrict to these categories (already expanded to descendants).
    pub category_ids: Option<Vec<DbId>>,
    /// Private entries of this user are included alongside public ones.
    /// `None` means no visibility restriction (admin).
    pub visible_to: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}
