//! Handlers for `/projects/{id}/clients` (client assignment).

use atelier_core::error::CoreError;
use atelier_core::notification_kinds::PROJECT_SHARED;
use atelier_core::roles::ROLE_CLIENT_ID;
use atelier_core::types::DbId;
use atelier_core::validation::{normalize_email, require_non_empty};
use atelier_db::models::project_client::ProjectClientUser;
use atelier_db::models::user::{CreateUser, User};
use atelier_db::repositories::{ProjectClientRepo, UserRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::access::{load_project_for, Need};
use crate::auth::password::{generate_temporary_password, hash_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::{Notice, Notifier};
use crate::review;
use crate::state::AppState;

/// Request body for `POST /projects/{id}/clients`.
#[derive(Debug, Deserialize)]
pub struct AssignClientRequest {
    pub email: String,
    /// Used only when a new client account has to be created.
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub can_approve: Option<bool>,
}

/// Response for a successful assignment.
#[derive(Debug, Serialize)]
pub struct AssignClientResponse {
    pub client: ProjectClientUser,
    /// Set only when the assignment created the client's account. Shown
    /// once; only its hash is stored.
    pub temporary_password: Option<String>,
}

/// GET /api/v1/projects/{id}/clients
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<ProjectClientUser>>> {
    load_project_for(&state.pool, &user, project_id, Need::View).await?;
    let clients = ProjectClientRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(clients))
}

/// POST /api/v1/projects/{id}/clients
///
/// Assign a client by email. Unknown emails get a new client account with a
/// temporary password. A newly assigned client is notified, and emailed when
/// SMTP is configured; re-assigning only updates `can_approve`.
pub async fn assign(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<AssignClientRequest>,
) -> AppResult<(StatusCode, Json<AssignClientResponse>)> {
    let access = load_project_for(&state.pool, &user, project_id, Need::Manage).await?;
    require_non_empty("email", &input.email).map_err(AppError::validation)?;
    let email = normalize_email(&input.email);

    let existing = UserRepo::find_by_email(&state.pool, &email).await?;
    if let Some(existing) = &existing {
        if existing.role_id != ROLE_CLIENT_ID {
            return Err(AppError::validation(format!(
                "User {email} is not a client account"
            )));
        }
        if !existing.is_active {
            return Err(AppError::validation(format!(
                "Client account {email} is deactivated"
            )));
        }
    }

    // Account creation, assignment and status recompute commit together.
    let mut tx = state.pool.begin().await?;
    let (client, temporary_password) = match existing {
        Some(existing) => (existing, None),
        None => {
            let (created, password) = create_client_account(&mut tx, &email, &input).await?;
            (created, Some(password))
        }
    };
    let already_assigned = ProjectClientRepo::is_client(&mut *tx, project_id, client.id).await?;
    ProjectClientRepo::add(
        &mut *tx,
        project_id,
        client.id,
        input.can_approve.unwrap_or(true),
    )
    .await?;
    review::settle_pending(&mut tx, project_id).await?;
    tx.commit().await?;

    let assigned = ProjectClientRepo::list_for_project(&state.pool, project_id)
        .await?
        .into_iter()
        .find(|c| c.user_id == client.id)
        .ok_or_else(|| AppError::InternalError("Assignment vanished after insert".into()))?;

    tracing::info!(
        project_id,
        client_id = client.id,
        new_account = temporary_password.is_some(),
        already_assigned,
        "Client assigned to project"
    );

    if !already_assigned {
        let project_name = &access.project.name;
        let mut notice = Notice::new(
            PROJECT_SHARED,
            project_id,
            "project",
            project_id,
            user.user_id,
            format!("Project \"{project_name}\" was shared with you"),
        );
        if let Some(password) = &temporary_password {
            notice = notice.with_email_body(format!(
                "An account was created for you to follow the project \"{project_name}\".\n\n\
                 Sign in with {email} and the temporary password {password}, then change it."
            ));
        }
        Notifier::new(&state).notify(notice, [client.id]).await;
    }

    Ok((
        StatusCode::CREATED,
        Json(AssignClientResponse {
            client: assigned,
            temporary_password,
        }),
    ))
}

/// DELETE /api/v1/projects/{id}/clients/{user_id}
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, client_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_project_for(&state.pool, &user, project_id, Need::Manage).await?;

    let mut tx = state.pool.begin().await?;
    if !ProjectClientRepo::remove(&mut *tx, project_id, client_id).await? {
        return Err(CoreError::not_found("ProjectClient", client_id).into());
    }
    let settled = review::settle_pending(&mut tx, project_id).await?;
    tx.commit().await?;

    tracing::info!(project_id, client_id, settled, "Client removed from project");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_client_account(
    conn: &mut PgConnection,
    email: &str,
    input: &AssignClientRequest,
) -> AppResult<(User, String)> {
    let password = generate_temporary_password();
    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(email)
        .to_string();

    let user = UserRepo::create(
        &mut *conn,
        &CreateUser {
            email: email.to_string(),
            name,
            password_hash,
            role_id: ROLE_CLIENT_ID,
            company_name: input.company_name.clone(),
            phone: None,
        },
    )
    .await?;

    Ok((user, password))
}
