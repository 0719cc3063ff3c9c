//! Postal address model.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `addresses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Address {
    pub id: DbId,
    pub street: String,
    pub extra: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Address fields accepted on create and replace.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInput {
    pub street: String,
    pub extra: Option<String>,
    pub postal_code: String,
    pub city: String,
    /// ISO country code, defaults to `FR`.
    pub country: Option<String>,
}
