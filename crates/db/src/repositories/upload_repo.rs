//! Repositories for the `client_photos` and `project_files` tables.
//!
//! Both tables share a shape; only the free-text column differs
//! (`caption` for photos, `label` for files).

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::upload::{ClientPhoto, NewUpload, ProjectFile};

const PHOTO_COLUMNS: &str = "id, project_id, uploaded_by, file_path, original_name, \
                              content_type, size_bytes, caption, created_at";

const FILE_COLUMNS: &str = "id, project_id, uploaded_by, file_path, original_name, \
                             content_type, size_bytes, label, created_at";

// ---------------------------------------------------------------------------
// Client photos
// ---------------------------------------------------------------------------

pub struct ClientPhotoRepo;

impl ClientPhotoRepo {
    pub async fn create(pool: &PgPool, input: &NewUpload) -> Result<ClientPhoto, sqlx::Error> {
        let query = format!(
            "INSERT INTO client_photos
                (project_id, uploaded_by, file_path, original_name, content_type, size_bytes, caption)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PHOTO_COLUMNS}"
        );
        sqlx::query_as::<_, ClientPhoto>(&query)
            .bind(input.project_id)
            .bind(input.uploaded_by)
            .bind(&input.file_path)
            .bind(&input.original_name)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(&input.note)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ClientPhoto>, sqlx::Error> {
        let query = format!("SELECT {PHOTO_COLUMNS} FROM client_photos WHERE id = $1");
        sqlx::query_as::<_, ClientPhoto>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ClientPhoto>, sqlx::Error> {
        let query = format!(
            "SELECT {PHOTO_COLUMNS} FROM client_photos
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ClientPhoto>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM client_photos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Storage paths of every photo row, used by the orphan scan.
    pub async fn all_paths(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT file_path FROM client_photos")
            .fetch_all(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Project files
// ---------------------------------------------------------------------------

pub struct ProjectFileRepo;

impl ProjectFileRepo {
    pub async fn create(pool: &PgPool, input: &NewUpload) -> Result<ProjectFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_files
                (project_id, uploaded_by, file_path, original_name, content_type, size_bytes, label)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {FILE_COLUMNS}"
        );
        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(input.project_id)
            .bind(input.uploaded_by)
            .bind(&input.file_path)
            .bind(&input.original_name)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(&input.note)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectFile>, sqlx::Error> {
        let query = format!("SELECT {FILE_COLUMNS} FROM project_files WHERE id = $1");
        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectFile>, sqlx::Error> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM project_files
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Storage paths of every file row, used by the orphan scan.
    pub async fn all_paths(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT file_path FROM project_files")
            .fetch_all(pool)
            .await
    }
}
