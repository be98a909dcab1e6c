/*!
Snapshot store: lifecycle of the per-document snapshot directories.

Every snapshot entry for a document lives under one deterministic
subdirectory of the snapshot root, named from a sanitized form of the
document's path. Entries are append-only and uniquely named by capture
timestamp at one-second granularity; no locks are taken, so correctness under
concurrent captures rests on idempotent directory creation and those unique
names rather than mutual exclusion.
*/

use chrono::{TimeZone, Utc};
use tracing::{debug, error, info, warn};

use crate::config::StoreConfig;
use crate::envelope;
use crate::error::{PalimpsestError, Result};
use crate::snapshot::{sanitize_path, snapshot_file_name, word_count, Snapshot, SNAPSHOT_SUFFIX};
use crate::vault::Vault;

/// Partial metadata update applied to an existing snapshot entry.
///
/// Only the fields present are rewritten; the body is never touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataUpdate {
    pub is_pinned: Option<bool>,
}

/// Store for per-document snapshot histories.
///
/// Entries are laid out as:
/// ```text
/// <root_dir>/
///   <sanitized document path>/
///     2024-01-10-090503.md     # envelope: metadata block + body
///     2024-01-11-221554.md
/// ```
pub struct SnapshotStore<V: Vault> {
    vault: V,
    config: StoreConfig,
}

impl<V: Vault> SnapshotStore<V> {
    /// Create a new snapshot store over the given vault.
    pub fn new(vault: V, config: StoreConfig) -> Self {
        Self { vault, config }
    }

    /// The vault this store operates on.
    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Vault-relative snapshot directory for a document.
    pub fn snapshot_dir(&self, doc_path: &str) -> String {
        format!("{}/{}", self.config.root_dir, sanitize_path(doc_path))
    }

    /// Capture a snapshot of a document's current state.
    ///
    /// Creates the snapshot root and the per-document directory if absent
    /// (idempotent), then writes the encoded envelope under a filename
    /// derived from the capture timestamp. When auto-pruning is enabled the
    /// document's history is pruned before this call returns.
    ///
    /// # Errors
    /// `PalimpsestError::Capture` when the underlying read or write fails.
    /// Capture failures are logged and returned, never swallowed: losing a
    /// version is worse than a loud failure.
    pub async fn create_snapshot(&self, doc_path: &str, note: Option<&str>) -> Result<Snapshot> {
        let snapshot = match self.capture(doc_path, note).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Snapshot capture failed for {doc_path}: {e}");
                return Err(PalimpsestError::capture(format!(
                    "could not capture {doc_path}: {e}"
                )));
            }
        };
        info!("Captured snapshot {}", snapshot.path);

        if self.config.auto_prune {
            if let Err(e) = self.prune(doc_path).await {
                warn!("Auto-prune after capture failed for {doc_path}: {e}");
            }
        }

        Ok(snapshot)
    }

    async fn capture(&self, doc_path: &str, note: Option<&str>) -> Result<Snapshot> {
        let body = self.vault.read(doc_path).await?;

        let dir = self.snapshot_dir(doc_path);
        self.vault.create_dir(&self.config.root_dir).await?;
        self.vault.create_dir(&dir).await?;

        // Truncate to millisecond precision so the stamped timestamp decodes
        // back bit-for-bit from the envelope
        let now = Utc::now();
        let now = Utc
            .timestamp_millis_opt(now.timestamp_millis())
            .single()
            .unwrap_or(now);
        let path = format!("{}/{}", dir, snapshot_file_name(&now));
        let snapshot = Snapshot {
            path: path.clone(),
            original_path: doc_path.to_string(),
            timestamp: now,
            note: note.unwrap_or_default().to_string(),
            word_count: word_count(&body),
            is_pinned: false,
        };

        self.vault.write(&path, &envelope::encode(&snapshot, &body)).await?;
        Ok(snapshot)
    }

    /// List a document's snapshots, newest first.
    ///
    /// A document with no history is a normal state and yields an empty list.
    /// Entries that cannot be read or that yield no timestamp are skipped
    /// with a logged warning; a single corrupt entry never aborts the
    /// listing of the others.
    pub async fn get_snapshots(&self, doc_path: &str) -> Result<Vec<Snapshot>> {
        let dir = self.snapshot_dir(doc_path);
        if !self.vault.exists(&dir).await {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for entry in self.vault.list(&dir).await? {
            if !entry.ends_with(SNAPSHOT_SUFFIX) {
                continue;
            }
            let raw = match self.vault.read(&entry).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping unreadable snapshot entry {entry}: {e}");
                    continue;
                }
            };
            match envelope::decode(&raw) {
                Ok(decoded) => snapshots.push(decoded.snapshot(&entry, doc_path)),
                Err(e) => warn!("Skipping undecodable snapshot entry {entry}: {e}"),
            }
        }

        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(snapshots)
    }

    /// Read a snapshot's body with the envelope stripped.
    pub async fn read_body(&self, snapshot: &Snapshot) -> Result<String> {
        let raw = self.vault.read(&snapshot.path).await?;
        Ok(envelope::decode(&raw)?.body)
    }

    /// Apply a partial metadata update to an existing entry.
    ///
    /// The entry is re-read and decoded tolerantly, the given fields are
    /// applied, and the envelope is rewritten with the body preserved
    /// byte-for-byte.
    ///
    /// # Errors
    /// `PalimpsestError::MetadataUpdate` on any underlying failure, logged
    /// and returned.
    pub async fn update_metadata(
        &self,
        snapshot: &Snapshot,
        update: MetadataUpdate,
    ) -> Result<Snapshot> {
        match self.rewrite_metadata(snapshot, update).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                error!("Metadata update failed for {}: {e}", snapshot.path);
                Err(PalimpsestError::metadata_update(format!(
                    "could not update {}: {e}",
                    snapshot.path
                )))
            }
        }
    }

    async fn rewrite_metadata(
        &self,
        snapshot: &Snapshot,
        update: MetadataUpdate,
    ) -> Result<Snapshot> {
        let raw = self.vault.read(&snapshot.path).await?;
        let decoded = envelope::decode(&raw)?;

        let mut updated = decoded.snapshot(&snapshot.path, &snapshot.original_path);
        if let Some(is_pinned) = update.is_pinned {
            updated.is_pinned = is_pinned;
        }

        self.vault
            .write(&snapshot.path, &envelope::encode(&updated, &decoded.body))
            .await?;
        debug!("Updated metadata for {}", snapshot.path);
        Ok(updated)
    }

    /// Delete a snapshot entry. Deleting a nonexistent entry is a no-op.
    pub async fn delete_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.vault.remove(&snapshot.path).await?;
        debug!("Deleted snapshot {}", snapshot.path);
        Ok(())
    }

    /// Relocate a document's whole snapshot directory after a source rename.
    ///
    /// No-op if the old path has no history. The entries themselves keep the
    /// `original_path` stamped at capture time; only the storage location
    /// moves.
    pub async fn handle_source_rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        let old_dir = self.snapshot_dir(old_path);
        if !self.vault.exists(&old_dir).await {
            return Ok(());
        }

        let new_dir = self.snapshot_dir(new_path);
        self.vault.create_dir(&self.config.root_dir).await?;
        self.vault.rename(&old_dir, &new_dir).await?;
        info!("Relocated snapshot directory {old_dir} -> {new_dir}");
        Ok(())
    }
}
