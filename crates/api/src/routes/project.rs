//! Route definitions for the `/projects` resource.
//!
//! Also nests the project-scoped collections (clients, spaces,
//! prescriptions, photos and files) under `/projects/{id}/...`.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::{prescription, project, project_client, space, upload};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                           -> list
/// POST   /                           -> create
/// GET    /{id}                       -> get_by_id
/// PUT    /{id}                       -> update
/// DELETE /{id}                       -> delete
/// PUT    /{id}/address               -> set_address
/// GET    /{id}/summary               -> summary
/// GET    /{id}/activity              -> activity
///
/// GET    /{id}/clients               -> project_client::list
/// POST   /{id}/clients               -> project_client::assign
/// DELETE /{id}/clients/{user_id}     -> project_client::remove
///
/// GET    /{id}/spaces                -> space::list_by_project
/// POST   /{id}/spaces                -> space::create
/// GET    /{id}/prescriptions         -> prescription::list_by_project
///
/// GET    /{id}/photos                -> upload::list_photos
/// POST   /{id}/photos                -> upload::upload_photo
/// GET    /{id}/files                 -> upload::list_files
/// POST   /{id}/files                 -> upload::upload_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/address", put(project::set_address))
        .route("/{id}/summary", get(project::summary))
        .route("/{id}/activity", get(project::activity))
        .route(
            "/{id}/clients",
            get(project_client::list).post(project_client::assign),
        )
        .route("/{id}/clients/{user_id}", delete(project_client::remove))
        .route(
            "/{id}/spaces",
            get(space::list_by_project).post(space::create),
        )
        .route("/{id}/prescriptions", get(prescription::list_by_project))
        .route(
            "/{id}/photos",
            get(upload::list_photos).post(upload::upload_photo),
        )
        .route(
            "/{id}/files",
            get(upload::list_files).post(upload::upload_file),
        )
}
