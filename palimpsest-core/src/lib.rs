/*!
# Palimpsest Core Engine

Snapshot capture, retention, and restore engine for plain-text documents.

This crate periodically persists point-in-time copies of a document, stores
structured metadata alongside the copied body inside a plain-text envelope,
and keeps storage bounded with a tiered time-bucketed retention policy that
never deletes a pinned snapshot and never loses the newest state.

## Architecture

The engine is isolated from the host application behind a small set of ports:

- [`Vault`] abstracts the document store (read/write/list/rename/delete);
  [`LocalVault`] is the local filesystem adapter.
- [`envelope`] serializes a snapshot's metadata block plus body into one text
  blob and re-parses it tolerantly, degrading to partial metadata rather than
  failing the whole read.
- [`SnapshotStore`] owns the per-document snapshot directories and their
  lifecycle: capture, listing, pin updates, deletion, relocation on rename.
- [`retention`] computes which snapshots an unchanged history can afford to
  lose, sampling one survivor per calendar day and then per calendar week as
  entries age out of the full-fidelity window.
- [`RestoreCoordinator`] restores a document to a prior snapshot's body,
  always capturing the pre-restore state first.

## Usage

```no_run
use palimpsest_core::{LocalVault, RestoreCoordinator, SnapshotStore, StoreConfig};

# async fn example() -> palimpsest_core::Result<()> {
let store = SnapshotStore::new(LocalVault::new("/path/to/vault"), StoreConfig::default());

// Capture the current state of a document
let snapshot = store.create_snapshot("Notes/Plan.md", Some("before rewrite")).await?;

// ... edit the document ...

// Restore it, preserving the pre-restore state as its own snapshot
RestoreCoordinator::new(&store).restore("Notes/Plan.md", &snapshot).await?;
# Ok(())
# }
```
*/

pub mod config;
pub mod envelope;
pub mod error;
pub mod restore;
pub mod retention;
pub mod snapshot;
pub mod store;
pub mod vault;

pub use config::StoreConfig;
pub use error::{PalimpsestError, Result};
pub use restore::{RestoreCoordinator, PRE_RESTORE_NOTE};
pub use retention::RetentionRules;
pub use snapshot::{Snapshot, SNAPSHOT_SUFFIX};
pub use store::{MetadataUpdate, SnapshotStore};
pub use vault::{LocalVault, Vault};
