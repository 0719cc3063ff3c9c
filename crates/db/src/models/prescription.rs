//! Prescription entity model and DTOs.

use atelier_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::double_option;

/// A prescription row from the `prescriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prescription {
    pub id: DbId,
    pub space_id: DbId,
    pub resource_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub reference: Option<String>,
    pub supplier_url: Option<String>,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price_cents: Cents,
    pub status: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A prescription joined with the name of its space.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PrescriptionWithSpace {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub prescription: Prescription,
    pub space_name: String,
}

/// A pending prescription awaiting a client's decision.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingPrescription {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub prescription: Prescription,
    pub space_name: String,
    pub project_id: DbId,
    pub project_name: String,
}

/// DTO for creating a prescription. `space_id` comes from the route.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrescription {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub reference: Option<String>,
    pub supplier_url: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<DbId>,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    /// Defaults to 0.
    pub unit_price_cents: Option<Cents>,
    pub sort_order: Option<i32>,
}

/// DTO for copying a library entry into a space.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFromResource {
    pub resource_id: DbId,
    pub quantity: Option<i32>,
}

/// DTO for updating a prescription's content. All fields are optional;
/// the nullable ones take `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePrescription {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub brand: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reference: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub supplier_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<DbId>>,
    pub quantity: Option<i32>,
    pub unit_price_cents: Option<Cents>,
    pub sort_order: Option<i32>,
}
