//! Handlers for client photos and project files.
//!
//! Both are multipart uploads stored on local disk through
//! [`LocalStorage`](crate::storage::LocalStorage) with a metadata row per file.

use atelier_core::error::CoreError;
use atelier_core::notification_kinds::{FILE_UPLOADED, PHOTO_UPLOADED};
use atelier_core::types::DbId;
use atelier_core::uploads::{
    content_type_for, sanitize_file_name, validate_extension, FILE_EXTENSIONS, PHOTO_EXTENSIONS,
};
use atelier_db::models::upload::{ClientPhoto, NewUpload, ProjectFile};
use atelier_db::repositories::{ClientPhotoRepo, ProjectClientRepo, ProjectFileRepo};
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use tokio_util::io::ReaderStream;

use crate::access::{load_project_for, rename_not_found, Need, ProjectAccess};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::{Notice, Notifier};
use crate::state::AppState;
use crate::storage::{LocalStorage, UploadKind};

/// A parsed multipart upload: one `file` part plus an optional text note.
struct UploadForm {
    file_name: String,
    bytes: Vec<u8>,
    note: Option<String>,
}

// ---------------------------------------------------------------------------
// Client photos
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/photos
pub async fn list_photos(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<ClientPhoto>>> {
    load_project_for(&state.pool, &user, project_id, Need::View).await?;
    Ok(Json(ClientPhotoRepo::list_by_project(&state.pool, project_id).await?))
}

/// POST /api/v1/projects/{id}/photos
///
/// Multipart fields: `file` (image, required) and `caption` (optional).
/// Clients and the agency may both upload; a client's upload notifies the
/// project owner.
pub async fn upload_photo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ClientPhoto>)> {
    let access = load_project_for(&state.pool, &user, project_id, Need::View).await?;
    let form = read_upload(multipart, "caption", state.config.max_upload_bytes).await?;
    let ext = validate_extension(&form.file_name, PHOTO_EXTENSIONS).map_err(AppError::validation)?;

    let key = LocalStorage::key_for(project_id, UploadKind::Photo, &form.file_name);
    let new = new_upload(&access, &user, &key, &form, &ext);
    state.storage.save(&key, &form.bytes).await?;

    let photo = match ClientPhotoRepo::create(&state.pool, &new).await {
        Ok(photo) => photo,
        Err(e) => {
            discard(&state.storage, &key).await;
            return Err(e.into());
        }
    };

    tracing::info!(project_id, photo_id = photo.id, size = photo.size_bytes, "Photo uploaded");

    let notice = Notice::new(
        PHOTO_UPLOADED,
        project_id,
        "photo",
        photo.id,
        user.user_id,
        format!("New photo on \"{}\"", access.project.name),
    );
    let notifier = Notifier::new(&state);
    if access.is_client() {
        notifier.notify(notice, [access.project.owner_id]).await;
    } else {
        notifier.record(&notice);
    }

    Ok((StatusCode::CREATED, Json(photo)))
}

/// GET /api/v1/photos/{id}/download
pub async fn download_photo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let photo = ClientPhotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Photo", id))?;
    check_project(&state, &user, photo.project_id, Need::View, "Photo", id).await?;
    stream_file(&state.storage, &photo.file_path, &photo.original_name, &photo.content_type).await
}

/// DELETE /api/v1/photos/{id}
///
/// The uploader or anyone who can manage the project may delete a photo.
pub async fn delete_photo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let photo = ClientPhotoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Photo", id))?;
    let access = check_project(&state, &user, photo.project_id, Need::View, "Photo", id).await?;

    if photo.uploaded_by != Some(user.user_id) && !access.can_manage() {
        return Err(AppError::forbidden("Only the uploader can delete this photo"));
    }

    ClientPhotoRepo::delete(&state.pool, id).await?;
    discard(&state.storage, &photo.file_path).await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Project files
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/files
pub async fn list_files(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<ProjectFile>>> {
    load_project_for(&state.pool, &user, project_id, Need::View).await?;
    Ok(Json(ProjectFileRepo::list_by_project(&state.pool, project_id).await?))
}

/// POST /api/v1/projects/{id}/files
///
/// Multipart fields: `file` (required) and `label` (optional). Notifies the
/// project's clients.
pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ProjectFile>)> {
    let access = load_project_for(&state.pool, &user, project_id, Need::Manage).await?;
    let form = read_upload(multipart, "label", state.config.max_upload_bytes).await?;
    let ext = validate_extension(&form.file_name, FILE_EXTENSIONS).map_err(AppError::validation)?;

    let key = LocalStorage::key_for(project_id, UploadKind::File, &form.file_name);
    let new = new_upload(&access, &user, &key, &form, &ext);
    state.storage.save(&key, &form.bytes).await?;

    let file = match ProjectFileRepo::create(&state.pool, &new).await {
        Ok(file) => file,
        Err(e) => {
            discard(&state.storage, &key).await;
            return Err(e.into());
        }
    };

    tracing::info!(project_id, file_id = file.id, size = file.size_bytes, "Project file uploaded");

    let clients = ProjectClientRepo::client_ids(&state.pool, project_id).await?;
    let mut notice = Notice::new(
        FILE_UPLOADED,
        project_id,
        "file",
        file.id,
        user.user_id,
        format!("New document on \"{}\"", access.project.name),
    );
    if let Some(label) = &file.label {
        notice = notice.with_body(label.clone());
    }
    Notifier::new(&state).notify(notice, clients).await;

    Ok((StatusCode::CREATED, Json(file)))
}

/// GET /api/v1/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let file = ProjectFileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("File", id))?;
    check_project(&state, &user, file.project_id, Need::View, "File", id).await?;
    stream_file(&state.storage, &file.file_path, &file.original_name, &file.content_type).await
}

/// DELETE /api/v1/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let file = ProjectFileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("File", id))?;
    check_project(&state, &user, file.project_id, Need::Manage, "File", id).await?;

    ProjectFileRepo::delete(&state.pool, id).await?;
    discard(&state.storage, &file.file_path).await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Drain a multipart body into an [`UploadForm`]. Unknown fields are ignored.
async fn read_upload(
    mut multipart: Multipart,
    note_field: &str,
    max_bytes: usize,
) -> AppResult<UploadForm> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut note: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file = Some((file_name, data.to_vec()));
        } else if name == note_field {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            note = Some(text.trim().to_string()).filter(|t| !t.is_empty());
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "File exceeds the {max_bytes} byte upload limit"
        )));
    }

    Ok(UploadForm {
        file_name,
        bytes,
        note,
    })
}

fn new_upload(
    access: &ProjectAccess,
    user: &AuthUser,
    key: &str,
    form: &UploadForm,
    ext: &str,
) -> NewUpload {
    NewUpload {
        project_id: access.project.id,
        uploaded_by: user.user_id,
        file_path: key.to_string(),
        original_name: sanitize_file_name(&form.file_name),
        content_type: content_type_for(ext).to_string(),
        size_bytes: form.bytes.len() as i64,
        note: form.note.clone(),
    }
}

/// Access check for an upload row, reporting hidden projects as a missing
/// upload.
async fn check_project(
    state: &AppState,
    user: &AuthUser,
    project_id: DbId,
    need: Need,
    entity: &'static str,
    id: DbId,
) -> AppResult<ProjectAccess> {
    load_project_for(&state.pool, user, project_id, need)
        .await
        .map_err(|e| rename_not_found(e, entity, id))
}

async fn stream_file(
    storage: &LocalStorage,
    key: &str,
    original_name: &str,
    content_type: &str,
) -> AppResult<Response> {
    let (file, size) = storage.open(key).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(original_name)
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(format!("Failed to build download response: {e}")))
}

/// Best-effort removal of a stored file whose row is gone (or never landed).
async fn discard(storage: &LocalStorage, key: &str) {
    if let Err(e) = storage.delete(key).await {
        tracing::warn!(error = %e, key, "Failed to remove stored upload");
    }
}
