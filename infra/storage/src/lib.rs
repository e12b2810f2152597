//! Sandboxed file storage for uploaded assets.
//!
//! Every path handed to [`Storage`] or [`NamespacedStorage`] is relative to a canonical
//! root directory; absolute paths, `..` escapes and symlinks pointing outside the root
//! are rejected. Writes go through a unique temp file, `fsync` and a rename, so readers
//! (including a static file server mounted on the same directory) never observe a
//! partially written file. Temp files orphaned by a crash are purged on connect.
//!
//! ```rust
//! use showroom_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     let storage = Storage::builder().root(tmp.path().join("uploads")).connect().await?;
//!
//!     let logos = storage.namespace("brand")?;
//!     logos.write("logo-1700000000000.png", b"\x89PNG").await?;
//!     assert!(logos.exists("logo-1700000000000.png")?);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod namespace;
mod security;

pub use builder::StorageBuilder;
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
pub use namespace::{NamespaceName, NamespacedStorage};
