//! Configuration management
//!
//! All settings come from the environment (optionally seeded from a `.env`
//! file). The S3 section is optional: when any of the three credentials is
//! missing the store runs on the local fallback tier alone.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Primary-tier credentials; `None` routes everything to the fallback.
    pub s3: Option<S3Config>,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2).
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Root directory of the local fallback tier.
    pub fallback_dir: PathBuf,
    /// Maximum accepted upload size in megabytes. Enforced by the caller,
    /// carried here so every consumer reads the same limit.
    pub max_upload_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            s3: None,
            storage: StorageSettings {
                fallback_dir: PathBuf::from("./data/fallback"),
                max_upload_mb: 100,
            },
        }
    }
}

impl Config {
    /// Load configuration, reading a `.env` file if one is present.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let s3 = match (
            env::var("S3_ACCESS_KEY"),
            env::var("S3_SECRET_KEY"),
            env::var("S3_BUCKET"),
        ) {
            (Ok(access_key), Ok(secret_key), Ok(bucket))
                if !access_key.trim().is_empty()
                    && !secret_key.trim().is_empty()
                    && !bucket.trim().is_empty() =>
            {
                Some(S3Config {
                    access_key,
                    secret_key,
                    bucket,
                    region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                    endpoint: env::var("S3_ENDPOINT").ok(),
                })
            }
            _ => {
                tracing::warn!("S3 credentials not configured, using local fallback storage only");
                None
            }
        };

        Config {
            s3,
            storage: StorageSettings {
                fallback_dir: env::var("FALLBACK_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data/fallback")),
                max_upload_mb: env::var("MAX_UPLOAD_MB")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(100),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_primary() {
        let config = Config::default();
        assert!(config.s3.is_none());
        assert_eq!(config.storage.max_upload_mb, 100);
    }
}
