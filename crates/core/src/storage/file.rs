//! File-backed storage.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::trace;

use super::{KeyValueStorage, StorageError};

type Manifest = BTreeMap<String, String>;

/// Storage kept in a single JSON manifest file mapping keys to values.
///
/// Writes go to a sibling temporary file that is flushed to disk and then
/// renamed over the manifest, so readers only ever see a complete manifest,
/// including after a crash.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Use the manifest at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_manifest(&self) -> Result<Manifest, StorageError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(StorageError::Manifest),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Manifest::new()),
            Err(error) => Err(error.into()),
        }
    }

    async fn write_manifest(&self, manifest: &Manifest) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string(manifest).map_err(StorageError::Manifest)?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");

        let mut file = fs::File::create(&staging).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&staging, &self.path).await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut manifest = self.read_manifest().await?;

        Ok(manifest.remove(key))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut manifest = self.read_manifest().await?;
        manifest.insert(key.to_string(), value);

        self.write_manifest(&manifest).await?;

        trace!(path = %self.path.display(), key, "wrote storage manifest");

        Ok(())
    }
}
