//! Library category model and DTOs.

use atelier_core::category_tree::CategoryRef;
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::double_option;

/// A category row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub parent_id: Option<DbId>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Category {
    /// Project the row onto the shape used by the tree helpers.
    pub fn to_tree_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            parent_id: self.parent_id,
            name: self.name.clone(),
            sort_order: self.sort_order,
        }
    }
}

/// DTO for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub parent_id: Option<DbId>,
    pub sort_order: Option<i32>,
}

/// DTO for renaming or moving a category.
///
/// `parent_id: null` moves the category to the root; omitting it keeps the
/// current parent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<DbId>>,
    pub sort_order: Option<i32>,
}
