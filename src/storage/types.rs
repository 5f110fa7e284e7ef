//! Storage types

use serde::{Deserialize, Serialize};

/// Which tier answered for an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    Primary,
    Fallback,
}

/// Where a stored object can be reached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLocation {
    /// A time-limited signed URL (primary) or a filesystem path (fallback)
    pub location: String,
    pub tier: StorageTier,
}

impl StoredLocation {
    pub fn on_primary(&self) -> bool {
        self.tier == StorageTier::Primary
    }
}
