//! Route definitions for the `/prescriptions` resource, including its
//! approval and comment sub-resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{approval, comment, prescription};
use crate::state::AppState;

/// Routes mounted at `/prescriptions`.
///
/// ```text
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// POST   /{id}/submit      -> submit
/// POST   /{id}/approval    -> approval::decide
/// GET    /{id}/approvals   -> approval::list
/// GET    /{id}/comments    -> comment::list
/// POST   /{id}/comments    -> comment::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(prescription::get_by_id)
                .put(prescription::update)
                .delete(prescription::delete),
        )
        .route("/{id}/submit", post(prescription::submit))
        .route("/{id}/approval", post(approval::decide))
        .route("/{id}/approvals", get(approval::list))
        .route("/{id}/comments", get(comment::list).post(comment::create))
}
