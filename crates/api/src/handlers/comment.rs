//! Handlers for prescription comment threads.

use atelier_core::error::CoreError;
use atelier_core::notification_kinds::PRESCRIPTION_COMMENTED;
use atelier_core::types::DbId;
use atelier_core::validation::require_non_empty;
use atelier_db::models::comment::{Comment, CommentWithAuthor, CreateComment};
use atelier_db::repositories::{CommentRepo, ProjectClientRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::access::{load_prescription_for, Need};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::{Notice, Notifier};
use crate::state::AppState;

/// Longest accepted comment body, in characters.
const MAX_COMMENT_CHARS: usize = 5_000;

/// GET /api/v1/prescriptions/{id}/comments
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(prescription_id): Path<DbId>,
) -> AppResult<Json<Vec<CommentWithAuthor>>> {
    load_prescription_for(&state.pool, &user, prescription_id, Need::View).await?;
    let comments = CommentRepo::list_for_prescription(&state.pool, prescription_id).await?;
    Ok(Json(comments))
}

/// POST /api/v1/prescriptions/{id}/comments
///
/// Anyone who can view the prescription may comment. A client's comment
/// notifies the project owner; anyone else's notifies the assigned clients.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(prescription_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let (prescription, access) =
        load_prescription_for(&state.pool, &user, prescription_id, Need::View).await?;

    require_non_empty("body", &input.body).map_err(AppError::validation)?;
    let body = input.body.trim();
    if body.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::validation(format!(
            "Comment must not exceed {MAX_COMMENT_CHARS} characters"
        )));
    }

    let comment = CommentRepo::create(&state.pool, prescription_id, user.user_id, body).await?;

    let recipients = if access.is_client() {
        vec![access.project.owner_id]
    } else {
        ProjectClientRepo::client_ids(&state.pool, access.project.id).await?
    };
    let notice = Notice::new(
        PRESCRIPTION_COMMENTED,
        access.project.id,
        "prescription",
        prescription_id,
        user.user_id,
        format!("New comment on \"{}\"", prescription.name),
    )
    .with_body(body);
    Notifier::new(&state).notify(notice, recipients).await;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/v1/comments/{id}
///
/// Only the author or an admin may delete a comment.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", id))?;

    if comment.author_id != user.user_id && !user.is_admin() {
        return Err(AppError::forbidden("Only the author can delete this comment"));
    }

    CommentRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
