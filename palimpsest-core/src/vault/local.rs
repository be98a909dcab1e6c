/*!
Local filesystem vault adapter.
*/

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::Vault;
use crate::error::{PalimpsestError, Result};

/// Vault backed by a directory on the local filesystem.
///
/// Vault-relative paths are resolved against the base directory; missing
/// parent directories are created on write.
#[derive(Debug, Clone)]
pub struct LocalVault {
    base_dir: PathBuf,
}

impl LocalVault {
    /// Create a vault rooted at `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }
}

#[async_trait]
impl Vault for LocalVault {
    async fn exists(&self, path: &str) -> bool {
        fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let full = self.resolve(path);
        fs::create_dir_all(&full).await.map_err(|e| {
            PalimpsestError::storage(format!("failed to create directory {path}: {e}"))
        })
    }

    async fn read(&self, path: &str) -> Result<String> {
        fs::read_to_string(self.resolve(path))
            .await
            .map_err(|e| PalimpsestError::storage(format!("failed to read {path}: {e}")))
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                PalimpsestError::storage(format!("failed to create directory for {path}: {e}"))
            })?;
        }
        fs::write(&full, content)
            .await
            .map_err(|e| PalimpsestError::storage(format!("failed to write {path}: {e}")))
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>> {
        let full = self.resolve(dir);
        let mut entries = fs::read_dir(&full)
            .await
            .map_err(|e| PalimpsestError::storage(format!("failed to list {dir}: {e}")))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PalimpsestError::storage(format!("failed to list {dir}: {e}")))?
        {
            let file_type = entry.file_type().await.map_err(|e| {
                PalimpsestError::storage(format!("failed to inspect entry in {dir}: {e}"))
            })?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                files.push(format!("{dir}/{name}"));
            }
        }
        Ok(files)
    }

    async fn remove(&self, path: &str) -> Result<()> {
        match fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PalimpsestError::storage(format!(
                "failed to remove {path}: {e}"
            ))),
        }
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        fs::rename(self.resolve(old_path), self.resolve(new_path))
            .await
            .map_err(|e| {
                PalimpsestError::storage(format!("failed to rename {old_path} to {new_path}: {e}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_basic_operations() {
        let temp_dir = TempDir::new().unwrap();
        let vault = LocalVault::new(temp_dir.path());

        vault.write("notes/a.md", "hello").await.unwrap();
        assert!(vault.exists("notes/a.md").await);
        assert_eq!(vault.read("notes/a.md").await.unwrap(), "hello");

        vault.remove("notes/a.md").await.unwrap();
        assert!(!vault.exists("notes/a.md").await);
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let vault = LocalVault::new(temp_dir.path());
        assert!(vault.remove("never/existed.md").await.is_ok());
    }

    #[tokio::test]
    async fn test_create_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let vault = LocalVault::new(temp_dir.path());
        vault.create_dir("a/b/c").await.unwrap();
        vault.create_dir("a/b/c").await.unwrap();
        assert!(vault.exists("a/b/c").await);
    }

    #[tokio::test]
    async fn test_list_returns_only_files() {
        let temp_dir = TempDir::new().unwrap();
        let vault = LocalVault::new(temp_dir.path());

        vault.write("dir/one.md", "1").await.unwrap();
        vault.write("dir/two.md", "2").await.unwrap();
        vault.create_dir("dir/nested").await.unwrap();

        let mut files = vault.list("dir").await.unwrap();
        files.sort();
        assert_eq!(files, vec!["dir/one.md", "dir/two.md"]);
    }

    #[tokio::test]
    async fn test_rename_moves_directory_tree() {
        let temp_dir = TempDir::new().unwrap();
        let vault = LocalVault::new(temp_dir.path());

        vault.write("old/entry.md", "content").await.unwrap();
        vault.rename("old", "new").await.unwrap();

        assert!(!vault.exists("old").await);
        assert_eq!(vault.read("new/entry.md").await.unwrap(), "content");
    }
}
