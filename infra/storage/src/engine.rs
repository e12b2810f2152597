use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::namespace::{NamespaceName, NamespacedStorage};
use crate::security;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Marker embedded in temp file names; [`maintenance`] only ever deletes files carrying it.
pub(crate) const TMP_MARKER: &str = ".showroomtmp.";

#[derive(Debug)]
pub(crate) struct StorageInner {
    pub(crate) root: PathBuf,
    pub(crate) tmp_counter: AtomicU64,
}

/// Cheaply clonable handle to a sandboxed directory.
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Storage {
    pub fn builder() -> StorageBuilder {
        StorageBuilder::default()
    }

    /// Canonical root directory, suitable for mounting a static file server.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Scoped view whose paths live under `<root>/<name>/`.
    ///
    /// # Errors
    /// [`StorageError::InvalidNamespace`] unless the name is non-empty ASCII alphanumeric
    /// or `_`.
    pub fn namespace<N>(&self, name: N) -> Result<NamespacedStorage, StorageError>
    where
        N: TryInto<NamespaceName, Error = StorageError>,
    {
        Ok(NamespacedStorage::new(self.clone(), name.try_into()?))
    }

    /// Maps a relative path onto the sandbox.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] when the path is absolute or escapes the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.inner.root, path)
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] when nothing exists at `path`.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;
        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(not_found(&resolved)),
            Err(source) => Err(StorageError::Io {
                source,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// Replaces the file at `path` atomically, creating parent directories.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] for paths outside the sandbox,
    /// [`StorageError::Io`] when the disk refuses the write.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        let parent = resolved.parent().map(Path::to_path_buf);

        if let Some(parent) = &parent {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create {}", parent.display()))?;
        }

        let temp = self.temp_path_for(&resolved);
        if let Err(err) = write_synced(&temp, data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err);
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            // Some platforms refuse to rename over an existing file.
            if err.kind() != ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Rename failed: {}", resolved.display()).into()),
                });
            }
            fs::remove_file(&resolved)
                .await
                .context(format!("Failed to replace {}", resolved.display()))?;
            fs::rename(&temp, &resolved)
                .await
                .context(format!("Rename failed: {}", resolved.display()))?;
        }

        if let Some(parent) = &parent {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "File written");
        Ok(())
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] when nothing exists at `path`.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "File deleted");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(not_found(&resolved)),
            Err(source) => Err(StorageError::Io {
                source,
                context: Some(format!("Delete failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// # Errors
    /// Only for paths outside the sandbox.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.is_file())
    }

    /// Removes temp files older than five minutes and empty directories.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.inner.root).await;
    }

    fn temp_path_for(&self, target: &Path) -> PathBuf {
        let n = self.inner.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = target.file_name().and_then(|s| s.to_str()).unwrap_or("file");
        target.with_file_name(format!("{name}{TMP_MARKER}{}.{n}", std::process::id()))
    }
}

async fn write_synced(temp: &Path, data: &[u8]) -> Result<(), StorageError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(temp)
        .await
        .context(format!("Failed to create {}", temp.display()))?;
    file.write_all(data).await.context("Write failed")?;
    file.sync_all().await.context("Sync failed")?;
    Ok(())
}

async fn sync_dir(path: &Path) {
    let result = match fs::File::open(path).await {
        Ok(dir) => dir.sync_all().await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        warn!(path = %path.display(), error = %err, "Directory sync failed");
    }
}

fn not_found(path: &Path) -> StorageError {
    StorageError::FileNotFound { message: path.display().to_string().into(), context: None }
}
