//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use atelier_core::error::CoreError;
use atelier_core::roles::is_known_role;
use atelier_core::types::DbId;
use atelier_core::validation::{normalize_email, reject_blank, require_non_empty};
use atelier_db::models::role::Role;
use atelier_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use atelier_db::repositories::{ProjectClientRepo, RoleRepo, SessionRepo, UserRepo};
use atelier_db::DbPool;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::review;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    /// Role name filter (`admin`, `agency`, `client`).
    pub role: Option<String>,
}

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Create a user of any role. Returns 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    require_non_empty("name", &input.name).map_err(AppError::validation)?;
    validate_password_strength(&input.password).map_err(AppError::validation)?;
    let role = resolve_role(&state.pool, &input.role).await?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: normalize_email(&input.email),
            name: input.name.trim().to_string(),
            password_hash: hashed,
            role_id: role.id,
            company_name: input.company_name,
            phone: input.phone,
        },
    )
    .await?;

    tracing::info!(admin_id = admin.user_id, user_id = user.id, role = %role.name, "User created");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_user(&user, role.name)),
    ))
}

/// GET /api/v1/admin/users
///
/// List users, optionally filtered by `?role=`.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let role_filter = match params.role.as_deref() {
        Some(name) => Some(resolve_role(&state.pool, name).await?.id),
        None => None,
    };

    let users = UserRepo::list(&state.pool, role_filter).await?;

    // Pre-fetch all roles to avoid N+1 queries.
    let roles = RoleRepo::list(&state.pool).await?;

    let responses = users
        .iter()
        .map(|u| UserResponse::from_user(u, role_name_in(&roles, u.role_id)))
        .collect();

    Ok(Json(responses))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    Ok(Json(user_to_response(&state.pool, &user).await?))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update a user's profile, role or active flag (not password).
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    input
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    reject_blank("name", input.name.as_deref()).map_err(AppError::validation)?;
    reject_blank("email", input.email.as_deref()).map_err(AppError::validation)?;

    let role_id = match input.role.as_deref() {
        Some(name) => Some(resolve_role(&state.pool, name).await?.id),
        None => None,
    };

    let update_dto = UpdateUser {
        email: input.email.as_deref().map(normalize_email),
        name: input.name.map(|n| n.trim().to_string()),
        role_id,
        company_name: input.company_name,
        phone: input.phone,
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    if input.is_active == Some(false) {
        let mut tx = state.pool.begin().await?;
        for project_id in ProjectClientRepo::project_ids_for_user(&mut *tx, id).await? {
            review::settle_pending(&mut tx, project_id).await?;
        }
        tx.commit().await?;
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    Ok(Json(user_to_response(&state.pool, &user).await?))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Deactivate a user and revoke their sessions. Pending prescriptions on the
/// user's projects are re-evaluated without them. Returns 204 No Content.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::validation("Admins cannot deactivate themselves"));
    }

    let mut tx = state.pool.begin().await?;
    if !UserRepo::deactivate(&mut *tx, id).await? {
        return Err(CoreError::NotFound { entity: "User", id }.into());
    }
    // A deactivated client no longer counts as an approver anywhere.
    let mut settled = 0;
    for project_id in ProjectClientRepo::project_ids_for_user(&mut *tx, id).await? {
        settled += review::settle_pending(&mut tx, project_id).await?;
    }
    tx.commit().await?;
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(admin_id = admin.user_id, user_id = id, settled, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Admin-initiated password reset. Also lifts any login lock.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password).map_err(AppError::validation)?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if UserRepo::update_password(&state.pool, id, &hashed).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "User", id }.into())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn resolve_role(pool: &DbPool, name: &str) -> AppResult<Role> {
    if !is_known_role(name) {
        return Err(AppError::validation(format!("Unknown role '{name}'")));
    }
    RoleRepo::find_by_name(pool, name)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{name}' is not seeded")))
}

fn role_name_in(roles: &[Role], role_id: DbId) -> String {
    roles
        .iter()
        .find(|r| r.id == role_id)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Convert a [`User`] row into a [`UserResponse`] by resolving the role name.
async fn user_to_response(pool: &DbPool, user: &User) -> AppResult<UserResponse> {
    let role_name = RoleRepo::resolve_name(pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role_name))
}
