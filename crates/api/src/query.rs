//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `atelier_db::clamp_limit` / `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` after clamping.
    pub fn clamped(&self) -> (i64, i64) {
        (
            atelier_db::clamp_limit(self.limit),
            atelier_db::clamp_offset(self.offset),
        )
    }
}
