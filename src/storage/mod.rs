//! Storage module: dual-tier blob persistence
//!
//! An S3-compatible primary tier with automatic local-filesystem fallback.
//! Objects are keyed by caller-supplied guid; the store has no idea what the
//! bytes are.

mod backend;
mod error;
mod local;
mod s3;
mod store;
mod types;

pub use backend::ObjectBackend;
pub use error::StorageError;
pub use local::LocalBackend;
pub use s3::S3Backend;
pub use store::TieredStore;
pub use types::{StorageTier, StoredLocation};
