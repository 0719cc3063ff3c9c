//! Local-disk storage for uploaded photos and project files.
//!
//! Rows store a storage key relative to the upload root
//! (`projects/{id}/photos/{uuid}-{name}`); [`LocalStorage::resolve`] is the
//! only way back to a filesystem path and refuses keys that escape the root.

use std::path::{Component, Path, PathBuf};

use atelier_core::types::DbId;
use atelier_core::uploads::sanitize_file_name;
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidPath(String),
}

/// Which per-project folder an upload lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Photo,
    File,
}

impl UploadKind {
    fn dir_name(self) -> &'static str {
        match self {
            UploadKind::Photo => "photos",
            UploadKind::File => "files",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage key for a new upload. The uuid prefix keeps keys unique even
    /// when two uploads share a file name.
    pub fn key_for(project_id: DbId, kind: UploadKind, original_name: &str) -> String {
        format!(
            "projects/{project_id}/{}/{}-{}",
            kind.dir_name(),
            uuid::Uuid::now_v7().simple(),
            sanitize_file_name(original_name)
        )
    }

    /// Map a storage key to a path under the root.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidPath(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Write `bytes` under `key`, creating parent directories.
    pub async fn save(&self, key: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        tracing::debug!(key, size = bytes.len(), "Stored upload");
        Ok(path)
    }

    /// Open a stored file for streaming, returning it with its size.
    pub async fn open(&self, key: &str) -> Result<(tokio::fs::File, u64), StorageError> {
        let path = self.resolve(key)?;
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let size = file.metadata().await?.len();
        Ok((file, size))
    }

    /// Remove a stored file. Returns `false` if it was already gone.
    pub async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove everything stored for a project. Returns `false` if nothing was there.
    pub async fn remove_project(&self, project_id: DbId) -> Result<bool, StorageError> {
        let path = self.resolve(&format!("projects/{project_id}"))?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Every stored file, as keys relative to the root.
    pub async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        if !tokio::fs::try_exists(&self.root).await? {
            return Ok(keys);
        }

        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key: Vec<_> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    keys.push(key.join("/"));
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn key_layout() {
        let key = LocalStorage::key_for(12, UploadKind::Photo, "../Salon vue.JPG");
        assert!(key.starts_with("projects/12/photos/"));
        assert!(key.ends_with("-Salon_vue.JPG"));
    }

    #[test]
    fn resolve_rejects_escaping_keys() {
        let storage = LocalStorage::new("/srv/uploads");
        assert_matches!(storage.resolve("../etc/passwd"), Err(StorageError::InvalidPath(_)));
        assert_matches!(storage.resolve("/etc/passwd"), Err(StorageError::InvalidPath(_)));
        assert_matches!(storage.resolve(""), Err(StorageError::InvalidPath(_)));
        assert_eq!(
            storage.resolve("projects/1/files/a.pdf").unwrap(),
            PathBuf::from("/srv/uploads/projects/1/files/a.pdf")
        );
    }

    #[tokio::test]
    async fn save_open_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.save("projects/1/files/plan.pdf", b"%PDF").await.unwrap();
        let (_, size) = storage.open("projects/1/files/plan.pdf").await.unwrap();
        assert_eq!(size, 4);

        assert_eq!(
            storage.list_keys().await.unwrap(),
            vec!["projects/1/files/plan.pdf".to_string()]
        );

        assert!(storage.delete("projects/1/files/plan.pdf").await.unwrap());
        assert!(!storage.delete("projects/1/files/plan.pdf").await.unwrap());
        assert_matches!(
            storage.open("projects/1/files/plan.pdf").await,
            Err(StorageError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn list_keys_of_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("never-created"));
        assert!(storage.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_project_drops_whole_folder() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.save("projects/7/photos/a.jpg", b"jpg").await.unwrap();
        storage.save("projects/7/files/b.pdf", b"pdf").await.unwrap();
        storage.save("projects/8/files/c.pdf", b"pdf").await.unwrap();

        assert!(storage.remove_project(7).await.unwrap());
        assert!(!storage.remove_project(7).await.unwrap());
        assert_eq!(
            storage.list_keys().await.unwrap(),
            vec!["projects/8/files/c.pdf".to_string()]
        );
    }
}
