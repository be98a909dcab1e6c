/*!
Configuration for the snapshot store.
*/

use serde::{Deserialize, Serialize};

use crate::retention::RetentionRules;

/// Settings for a [`SnapshotStore`](crate::SnapshotStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Vault-relative root directory holding one subdirectory per tracked
    /// document
    pub root_dir: String,

    /// Whether a capture immediately prunes the document's history
    pub auto_prune: bool,

    /// Tiered retention windows applied when pruning
    pub retention: RetentionRules,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: ".snapshots".to_string(),
            auto_prune: true,
            retention: RetentionRules::default(),
        }
    }
}
