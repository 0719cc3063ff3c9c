pub mod admin;
pub mod auth;
pub mod category;
pub mod client;
pub mod comment;
pub mod health;
pub mod library;
pub mod notification;
pub mod prescription;
pub mod project;
pub mod space;
pub mod upload;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register agency (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout
/// /auth/me                                         get, update profile
/// /auth/me/password                                change password
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update, deactivate
/// /admin/users/{id}/reset-password                 reset password
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, delete
/// /projects/{id}/address                           set site address
/// /projects/{id}/summary                           budget summary
/// /projects/{id}/activity                          activity log
/// /projects/{id}/clients                           list, assign
/// /projects/{id}/clients/{user_id}                 remove
/// /projects/{id}/spaces                            list, create
/// /projects/{id}/prescriptions                     list (?status=)
/// /projects/{id}/photos                            list, upload (multipart)
/// /projects/{id}/files                             list, upload (multipart)
///
/// /spaces/{id}                                     get, update, delete
/// /spaces/{id}/prescriptions                       list, create
/// /spaces/{id}/prescriptions/from-resource         create from library
///
/// /prescriptions/{id}                              get, update, delete
/// /prescriptions/{id}/submit                       submit for approval
/// /prescriptions/{id}/approval                     record decision (client)
/// /prescriptions/{id}/approvals                    list decisions
/// /prescriptions/{id}/comments                     list, create
///
/// /comments/{id}                                   delete
///
/// /photos/{id}                                     delete
/// /photos/{id}/download                            stream
/// /files/{id}                                      delete
/// /files/{id}/download                             stream
///
/// /client/projects                                 assigned projects (client)
/// /client/projects/{id}                            nested read-only view
/// /client/approvals/pending                        awaiting my decision
///
/// /categories                                      list, create
/// /categories/tree                                 nested tree
/// /categories/{id}                                 update, delete
///
/// /library                                         search, create
/// /library/{id}                                    get, update, delete
///
/// /notifications                                   list
/// /notifications/unread-count                      unread count
/// /notifications/read-all                          mark all read
/// /notifications/{id}                              delete
/// /notifications/{id}/read                         mark read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and the caller's own profile.
        .nest("/auth", auth::router())
        // Account administration.
        .nest("/admin", admin::router())
        // Projects and everything scoped under a project id.
        .nest("/projects", project::router())
        .nest("/spaces", space::router())
        .nest("/prescriptions", prescription::router())
        .nest("/comments", comment::router())
        // Stored uploads addressed by their own id.
        .nest("/photos", upload::photo_router())
        .nest("/files", upload::file_router())
        // Client portal.
        .nest("/client", client::router())
        // Product catalogue.
        .nest("/categories", category::router())
        .nest("/library", library::router())
        .nest("/notifications", notification::router())
}
