//! Dual-tier artifact store
//!
//! Writes target the primary (S3) tier when one was configured at
//! construction and fall through to the local tier on error; reads and
//! deletes probe both tiers. The routing decision is made once, at
//! construction, so a sequence of calls never flaps between tiers; per-call
//! fallthrough still absorbs transient primary failures.

use std::path::Path;

use crate::config::Config;

use super::backend::ObjectBackend;
use super::error::StorageError;
use super::local::LocalBackend;
use super::s3::S3Backend;
use super::types::{StorageTier, StoredLocation};

/// Location-transparent blob store keyed by guid
pub struct TieredStore {
    primary: Option<S3Backend>,
    fallback: LocalBackend,
}

impl TieredStore {
    /// Construct from configuration.
    ///
    /// A missing or unusable S3 section is an expected state, not an error:
    /// the store then routes everything to the local tier. Only a fallback
    /// root that cannot be created fails construction.
    pub async fn new(config: &Config) -> Result<Self, StorageError> {
        let fallback = LocalBackend::new(config.storage.fallback_dir.clone()).await?;

        let primary = match &config.s3 {
            Some(s3_config) => match S3Backend::new(s3_config).await {
                Ok(backend) => Some(backend),
                Err(e) => {
                    tracing::error!(
                        "Failed to initialize S3 client, using local fallback: {}",
                        e
                    );
                    None
                }
            },
            None => None,
        };

        Ok(Self { primary, fallback })
    }

    /// Assemble a store directly from backends.
    pub fn with_backends(primary: Option<S3Backend>, fallback: LocalBackend) -> Self {
        Self { primary, fallback }
    }

    /// Whether writes are routed to the primary tier.
    pub fn routes_to_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Store `data` under `guid`, preferring the primary tier.
    pub async fn put(&self, data: &[u8], guid: &str) -> Result<StoredLocation, StorageError> {
        if let Some(primary) = &self.primary {
            match put_primary(primary, guid, data).await {
                Ok(location) => {
                    tracing::info!("Uploaded {} to primary storage", guid);
                    return Ok(StoredLocation {
                        location,
                        tier: StorageTier::Primary,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "Primary upload failed for {}, falling back to local storage: {}",
                        guid,
                        e
                    );
                }
            }
        }

        self.fallback.put(guid, data).await?;
        let location = self.fallback.url(guid).await?;
        tracing::info!("Saved {} to local fallback: {}", guid, location);
        Ok(StoredLocation {
            location,
            tier: StorageTier::Fallback,
        })
    }

    /// Fetch `guid` into `destination`. `Ok(false)` when neither tier holds
    /// the object.
    pub async fn get(&self, guid: &str, destination: &Path) -> Result<bool, StorageError> {
        if let Some(primary) = &self.primary {
            match primary.get(guid).await {
                Ok(data) => {
                    tokio::fs::write(destination, &data).await?;
                    tracing::info!("Downloaded {} from primary storage", guid);
                    return Ok(true);
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!("{} not in primary storage, checking local fallback", guid);
                }
                Err(e) => {
                    tracing::warn!(
                        "Primary download failed for {}, checking local fallback: {}",
                        guid,
                        e
                    );
                }
            }
        }

        match self.fallback.get(guid).await {
            Ok(data) => {
                tokio::fs::write(destination, &data).await?;
                tracing::info!("Downloaded {} from local fallback", guid);
                Ok(true)
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} not found in primary or fallback storage", guid);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether any tier holds `guid`. Probes primary first, short-circuits.
    pub async fn exists(&self, guid: &str) -> Result<bool, StorageError> {
        if let Some(primary) = &self.primary {
            match primary.exists(guid).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Primary existence check failed for {}: {}", guid, e);
                }
            }
        }
        self.fallback.exists(guid).await
    }

    /// Delete `guid` from both tiers unconditionally. True when at least one
    /// tier actually removed an object.
    pub async fn delete(&self, guid: &str) -> Result<bool, StorageError> {
        let mut deleted = false;

        if let Some(primary) = &self.primary {
            match primary.delete(guid).await {
                Ok(removed) => {
                    if removed {
                        tracing::info!("Deleted {} from primary storage", guid);
                    }
                    deleted |= removed;
                }
                Err(e) => {
                    tracing::warn!("Primary delete failed for {}: {}", guid, e);
                }
            }
        }

        match self.fallback.delete(guid).await {
            Ok(removed) => {
                if removed {
                    tracing::info!("Deleted {} from local fallback", guid);
                }
                deleted |= removed;
            }
            Err(e) if deleted => {
                tracing::warn!("Fallback delete failed for {}: {}", guid, e);
            }
            Err(e) => return Err(e),
        }

        Ok(deleted)
    }

    /// An addressable location for `guid`: a fresh signed URL on primary
    /// hits, the local path on fallback hits, `None` when absent from both.
    pub async fn url(&self, guid: &str) -> Result<Option<StoredLocation>, StorageError> {
        if let Some(primary) = &self.primary {
            match primary.exists(guid).await {
                Ok(true) => match primary.url(guid).await {
                    Ok(location) => {
                        return Ok(Some(StoredLocation {
                            location,
                            tier: StorageTier::Primary,
                        }));
                    }
                    Err(e) => {
                        tracing::warn!("Failed to presign {}: {}", guid, e);
                    }
                },
                Ok(false) => {
                    tracing::debug!("{} not in primary storage", guid);
                }
                Err(e) => {
                    tracing::warn!("Primary URL lookup failed for {}: {}", guid, e);
                }
            }
        }

        if self.fallback.exists(guid).await? {
            let location = self.fallback.url(guid).await?;
            return Ok(Some(StoredLocation {
                location,
                tier: StorageTier::Fallback,
            }));
        }
        Ok(None)
    }

    /// Live connectivity probe against the primary tier.
    ///
    /// Health reporting only: the other operations always use the
    /// construction-time routing decision, never this probe.
    pub async fn is_available(&self) -> bool {
        match &self.primary {
            Some(primary) => primary.is_reachable().await,
            None => false,
        }
    }
}

async fn put_primary(
    primary: &S3Backend,
    guid: &str,
    data: &[u8],
) -> Result<String, StorageError> {
    primary.put(guid, data).await?;
    primary.url(guid).await
}
