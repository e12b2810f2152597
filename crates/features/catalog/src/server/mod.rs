mod handlers;
mod router;
mod store;
mod surreal;
mod upload;
mod views;
mod workflow;

pub use handlers::CatalogHandle;
pub use router::router;
pub use store::{CatalogStore, Collection};
pub use surreal::SurrealStore;
pub use upload::{LOGO_FIELD, LogoUploader, UploadError, UploadedFile, read_logo};
pub use views::{FormTarget, View, Views};
pub use workflow::{BrandPage, BrandWorkflow, Counts, Deletion, LogoUpload, Submission};

use crate::error::{CatalogError, CatalogErrorExt};
use showroom_database::Database;
use showroom_domain::config::UploadConfig;
use showroom_domain::registry::InitializedSlice;
use showroom_storage::Storage;
use tracing::info;

/// Catalog feature state, shared by every brand route.
#[showroom_derive::showroom_slice]
pub struct Catalog {
    pub workflow: BrandWorkflow<SurrealStore>,
    pub views: Views,
}

/// Builds the catalog slice over the shared database and upload storage.
///
/// # Errors
/// [`CatalogError::Storage`] when the `brand` upload namespace is unusable,
/// [`CatalogError::Template`] when an embedded template does not compile.
pub fn init(
    database: Database,
    storage: &Storage,
    upload: UploadConfig,
) -> Result<InitializedSlice, CatalogError> {
    let uploader = LogoUploader::new(storage, upload).context("Logo storage")?;
    let views = Views::new()?;
    let workflow = BrandWorkflow::new(SurrealStore::new(database), uploader);

    info!("Catalog slice initialized");
    Ok(InitializedSlice::new(Catalog::new(CatalogInner { workflow, views })))
}
