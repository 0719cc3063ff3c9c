//! Route definitions for stored uploads addressed by their own id.
//!
//! Listing and uploading live under `/projects/{id}/photos|files`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::upload;
use crate::state::AppState;

/// Routes mounted at `/photos`.
///
/// ```text
/// DELETE /{id}           -> delete_photo
/// GET    /{id}/download  -> download_photo
/// ```
pub fn photo_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(upload::delete_photo))
        .route("/{id}/download", get(upload::download_photo))
}

/// Routes mounted at `/files`.
///
/// ```text
/// DELETE /{id}           -> delete_file
/// GET    /{id}/download  -> download_file
/// ```
pub fn file_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(upload::delete_file))
        .route("/{id}/download", get(upload::download_file))
}
