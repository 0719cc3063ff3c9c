//! Route definitions for the `/library` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::library;
use crate::state::AppState;

/// Routes mounted at `/library`.
///
/// ```text
/// GET    /        -> search (?q=&category_id=&limit=&offset=)
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(library::search).post(library::create))
        .route(
            "/{id}",
            get(library::get_by_id)
                .put(library::update)
                .delete(library::delete),
        )
}
