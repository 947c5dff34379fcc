//! File-backed key-value store.
//!
//! Each key is held in its own file under the store's root directory:
//!
//! ```text
//! medwise_data/
//!   @medwise_records.json
//!   @medwise_profile.json
//!   @medwise_chat.json
//! ```
//!
//! Writes go to a `.tmp` sibling first and are renamed over the target, so a reader never
//! observes a half-written value.

use super::KeyValueStore;
use crate::constants::KV_FILE_EXTENSION;
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StoreUnavailable` if the directory cannot be created or `root`
    /// exists but is not a directory.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StoreError::StoreUnavailable(format!(
                "cannot create data directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let metadata = fs::metadata(&root).await.map_err(|e| {
            StoreError::StoreUnavailable(format!("cannot inspect {}: {}", root.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(StoreError::StoreUnavailable(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        tracing::debug!("file store opened at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'@' | b'.' | b'-' | b'_'));

        if !valid {
            return Err(StoreError::InvalidInput(format!(
                "storage key '{}' is not usable as a file name",
                key
            )));
        }

        Ok(self.root.join(format!("{}.{}", key, KV_FILE_EXTENSION)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension(format!("{}.tmp", KV_FILE_EXTENSION));

        if let Err(e) = write_then_rename(&tmp_path, &path, value.as_bytes()).await {
            match fs::remove_file(&tmp_path).await {
                Ok(()) => {}
                Err(cleanup) if cleanup.kind() == ErrorKind::NotFound => {}
                Err(cleanup) => tracing::warn!(
                    "failed to remove temporary file {}: {}",
                    tmp_path.display(),
                    cleanup
                ),
            }
            return Err(StoreError::Io(e));
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

async fn write_then_rename(tmp_path: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp_path, path).await
}
