//! Route definitions for the client portal at `/client`.

use axum::routing::get;
use axum::Router;

use crate::handlers::client_portal;
use crate::state::AppState;

/// Routes mounted at `/client`. All handlers require the client role.
///
/// ```text
/// GET /projects            -> list_projects
/// GET /projects/{id}       -> get_project
/// GET /approvals/pending   -> pending_approvals
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(client_portal::list_projects))
        .route("/projects/{id}", get(client_portal::get_project))
        .route("/approvals/pending", get(client_portal::pending_approvals))
}
