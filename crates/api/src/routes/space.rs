//! Route definitions for the `/spaces` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{prescription, space};
use crate::state::AppState;

/// Routes mounted at `/spaces`.
///
/// ```text
/// GET    /{id}                                -> get_by_id
/// PUT    /{id}                                -> update
/// DELETE /{id}                                -> delete
/// GET    /{id}/prescriptions                  -> prescription::list_by_space
/// POST   /{id}/prescriptions                  -> prescription::create
/// POST   /{id}/prescriptions/from-resource    -> prescription::create_from_resource
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(space::get_by_id)
                .put(space::update)
                .delete(space::delete),
        )
        .route(
            "/{id}/prescriptions",
            get(prescription::list_by_space).post(prescription::create),
        )
        .route(
            "/{id}/prescriptions/from-resource",
            post(prescription::create_from_resource),
        )
}
