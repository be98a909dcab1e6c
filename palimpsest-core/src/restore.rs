/*!
Restore coordinator: roll a document back to a prior snapshot's body.

A restore must never be destructive without first preserving the pre-restore
state, so the coordinator unconditionally captures a safety backup before
touching the live document. If reading or decoding the chosen snapshot fails,
the document is left unmodified.
*/

use tracing::{error, info};

use crate::error::{PalimpsestError, Result};
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;
use crate::vault::Vault;

/// Note stamped on the safety backup taken before every restore.
pub const PRE_RESTORE_NOTE: &str = "Pre-Restore Auto-Backup";

/// Coordinates restores over a [`SnapshotStore`].
pub struct RestoreCoordinator<'a, V: Vault> {
    store: &'a SnapshotStore<V>,
}

impl<'a, V: Vault> RestoreCoordinator<'a, V> {
    pub fn new(store: &'a SnapshotStore<V>) -> Self {
        Self { store }
    }

    /// Restore `doc_path` to the body stored in `snapshot`.
    ///
    /// # Errors
    /// `PalimpsestError::Restore` when any step fails; the failure is logged
    /// and surfaced to the caller rather than swallowed.
    pub async fn restore(&self, doc_path: &str, snapshot: &Snapshot) -> Result<()> {
        self.store
            .create_snapshot(doc_path, Some(PRE_RESTORE_NOTE))
            .await
            .map_err(|e| {
                error!("Pre-restore backup failed for {doc_path}: {e}");
                PalimpsestError::restore(format!("pre-restore backup failed: {e}"))
            })?;

        let body = self.store.read_body(snapshot).await.map_err(|e| {
            error!("Could not read snapshot {} for restore: {e}", snapshot.path);
            PalimpsestError::restore(format!("could not read snapshot {}: {e}", snapshot.path))
        })?;

        self.store.vault().write(doc_path, &body).await.map_err(|e| {
            error!("Could not overwrite {doc_path} during restore: {e}");
            PalimpsestError::restore(format!("could not overwrite {doc_path}: {e}"))
        })?;

        info!("Restored {doc_path} from {}", snapshot.path);
        Ok(())
    }
}
