use crate::engine::Storage;
use crate::error::StorageError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Validated, lowercased namespace directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(String);

impl TryFrom<&str> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let name = value.to_ascii_lowercase();

        if name.is_empty() {
            return Err(StorageError::InvalidNamespace {
                message: "namespace cannot be empty".into(),
                context: None,
            });
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::InvalidNamespace { message: name.into(), context: None });
        }

        Ok(Self(name))
    }
}

impl TryFrom<String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for NamespaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A [`Storage`] view rooted at `<root>/<namespace>/`.
#[derive(Debug, Clone)]
pub struct NamespacedStorage {
    storage: Storage,
    namespace: NamespaceName,
}

impl NamespacedStorage {
    pub(crate) const fn new(storage: Storage, namespace: NamespaceName) -> Self {
        Self { storage, namespace }
    }

    #[must_use]
    pub const fn name(&self) -> &NamespaceName {
        &self.namespace
    }

    fn scoped(&self, path: impl AsRef<Path>) -> PathBuf {
        Path::new(self.namespace.as_ref()).join(path)
    }

    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] when `path` escapes the namespace.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        let resolved = self.storage.resolve(self.scoped(&path))?;
        let boundary = self.storage.root().join(self.namespace.as_ref());
        if resolved.starts_with(&boundary) {
            Ok(resolved)
        } else {
            Err(StorageError::PathTraversalAttempt {
                message: path.as_ref().display().to_string().into(),
                context: Some(format!("outside namespace '{}'", self.namespace).into()),
            })
        }
    }

    /// # Errors
    /// See [`Storage::read`].
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.resolve(&path)?;
        self.storage.read(self.scoped(path)).await
    }

    /// # Errors
    /// See [`Storage::write`].
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.resolve(&path)?;
        self.storage.write(self.scoped(path), data).await
    }

    /// # Errors
    /// See [`Storage::delete`].
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.resolve(&path)?;
        self.storage.delete(self.scoped(path)).await
    }

    /// # Errors
    /// Only for paths outside the namespace.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.is_file())
    }
}
