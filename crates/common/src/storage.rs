//! File storage for avatars and editor images.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{AppError, AppResult};

/// A file written to storage.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Storage key (relative path).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write a file under `key`.
    async fn upload(&self, key: &str, data: &[u8]) -> AppResult<StoredFile>;

    /// Delete a file. Missing files are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if key.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(&self, key: &str, data: &[u8]) -> AppResult<StoredFile> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        Ok(StoredFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Build a date-partitioned storage key: `{prefix}/YYYY/MM/DD/{stem}.{ext}`.
#[must_use]
pub fn dated_storage_key(prefix: &str, at: DateTime<Utc>, stem: &str, extension: &str) -> String {
    format!(
        "{}/{}/{}.{}",
        prefix.trim_end_matches('/'),
        at.format("%Y/%m/%d"),
        stem,
        extension.to_ascii_lowercase()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn temp_storage() -> (LocalStorage, PathBuf) {
        let dir = std::env::temp_dir().join(format!("inkpost-storage-{}", uuid::Uuid::new_v4()));
        (
            LocalStorage::new(dir.clone(), "/media/".to_string()),
            dir,
        )
    }

    #[test]
    fn test_dated_storage_key() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        let key = dated_storage_key("avatars", at, "abc123", "PNG");
        assert_eq!(key, "avatars/2025/03/07/abc123.png");
    }

    #[test]
    fn test_public_url_joins_without_double_slash() {
        let (storage, _) = temp_storage();
        assert_eq!(storage.public_url("avatars/a.png"), "/media/avatars/a.png");
    }

    #[tokio::test]
    async fn test_upload_then_delete() {
        let (storage, dir) = temp_storage();
        let path = dir.join("uploads/images/x.png");

        let stored = storage.upload("uploads/images/x.png", b"data").await.unwrap();
        assert_eq!(stored.size, 4);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"data");

        storage.delete("uploads/images/x.png").await.unwrap();
        assert!(!tokio::fs::try_exists(&path).await.unwrap());

        // Deleting twice is fine.
        storage.delete("uploads/images/x.png").await.unwrap();

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let (storage, _) = temp_storage();
        assert!(storage.upload("../escape.png", b"x").await.is_err());
    }
}
