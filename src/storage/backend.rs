//! Storage backend contract

use async_trait::async_trait;

use super::error::StorageError;

/// Contract implemented once per storage tier.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Store `data` under `guid`, replacing any prior object.
    async fn put(&self, guid: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Fetch the object's bytes. `ObjectNotFound` when the tier lacks it.
    async fn get(&self, guid: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove the object. `Ok(false)` when there was nothing to remove.
    async fn delete(&self, guid: &str) -> Result<bool, StorageError>;

    /// Whether this tier currently holds the object.
    async fn exists(&self, guid: &str) -> Result<bool, StorageError>;

    /// An addressable location for the object: a fresh time-limited signed
    /// URL on the network tier, an absolute path on the local tier.
    async fn url(&self, guid: &str) -> Result<String, StorageError>;
}
