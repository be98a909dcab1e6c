/*!
Document store abstraction (the "vault") and its adapters.

The engine never touches the filesystem directly; everything goes through
this port, keeping the core logic independent of where documents and
snapshot entries actually live. Paths are vault-relative strings with `/`
separators.
*/

pub mod local;

use async_trait::async_trait;

use crate::error::Result;

pub use local::LocalVault;

/// Async document store interface consumed by the snapshot engine.
///
/// All operations may suspend; there is no locking, so implementations only
/// need the serialization the underlying store already provides.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Whether an entry (file or directory) exists at `path`.
    async fn exists(&self, path: &str) -> bool;

    /// Create a directory, including missing parents. Idempotent: no error
    /// when the directory already exists.
    async fn create_dir(&self, path: &str) -> Result<()>;

    /// Read an entry's full text content.
    async fn read(&self, path: &str) -> Result<String>;

    /// Write (or overwrite) an entry's full text content.
    async fn write(&self, path: &str, content: &str) -> Result<()>;

    /// List the files directly inside a directory, as vault-relative paths.
    async fn list(&self, dir: &str) -> Result<Vec<String>>;

    /// Remove a file. Removing a nonexistent file is a no-op.
    async fn remove(&self, path: &str) -> Result<()>;

    /// Rename a file or directory, moving it and everything beneath it.
    async fn rename(&self, old_path: &str, new_path: &str) -> Result<()>;
}
