//! Local filesystem fallback tier
//!
//! One file per guid under a configured root directory. Always usable as
//! long as the filesystem is writable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::backend::ObjectBackend;
use super::error::StorageError;

/// Fallback tier rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create the backend, ensuring the root directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, guid: &str) -> PathBuf {
        self.root.join(format!("{}.pdf", guid))
    }
}

#[async_trait]
impl ObjectBackend for LocalBackend {
    async fn put(&self, guid: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.object_path(guid);
        // Stage then rename so a failed write never leaves a truncated object.
        let staging = path.with_extension("pdf.tmp");
        tokio::fs::write(&staging, data).await?;
        tokio::fs::rename(&staging, &path).await?;
        Ok(())
    }

    async fn get(&self, guid: &str) -> Result<Vec<u8>, StorageError> {
        match tokio::fs::read(self.object_path(guid)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::ObjectNotFound(guid.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, guid: &str) -> Result<bool, StorageError> {
        match tokio::fs::remove_file(self.object_path(guid)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, guid: &str) -> Result<bool, StorageError> {
        match tokio::fs::metadata(self.object_path(guid)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn url(&self, guid: &str) -> Result<String, StorageError> {
        Ok(self.object_path(guid).to_string_lossy().into_owned())
    }
}
