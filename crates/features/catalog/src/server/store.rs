use crate::domain::{Brand, BrandId, BrandInput, Model};
use crate::error::CatalogError;
use showroom_domain::constants::{BRAND, FEATURE, MODEL};
use std::future::Future;

/// Tables counted on the catalog home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Brands,
    Models,
    Features,
}

impl Collection {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Brands => BRAND,
            Self::Models => MODEL,
            Self::Features => FEATURE,
        }
    }
}

/// Persistence seam of the catalog workflow.
///
/// `brand` returns `Ok(None)` for unknown ids; only infrastructure failures are errors.
pub trait CatalogStore: Send + Sync + 'static {
    fn brands(&self) -> impl Future<Output = Result<Vec<Brand>, CatalogError>> + Send;

    fn brand(&self, id: &BrandId)
    -> impl Future<Output = Result<Option<Brand>, CatalogError>> + Send;

    /// Exact, case-sensitive match on the stored name.
    fn brand_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Brand>, CatalogError>> + Send;

    fn models_of(&self, id: &BrandId)
    -> impl Future<Output = Result<Vec<Model>, CatalogError>> + Send;

    fn count(&self, collection: Collection)
    -> impl Future<Output = Result<u64, CatalogError>> + Send;

    /// Persists a new brand under a freshly generated id.
    fn insert_brand(
        &self,
        input: &BrandInput,
    ) -> impl Future<Output = Result<Brand, CatalogError>> + Send;

    /// Overwrites name and founded date, keeping the logo.
    fn replace_brand(
        &self,
        id: &BrandId,
        input: &BrandInput,
    ) -> impl Future<Output = Result<Brand, CatalogError>> + Send;

    fn set_logo(
        &self,
        id: &BrandId,
        logo: &str,
    ) -> impl Future<Output = Result<Brand, CatalogError>> + Send;

    /// Deleting an id that is already gone is not an error.
    fn remove_brand(&self, id: &BrandId) -> impl Future<Output = Result<(), CatalogError>> + Send;
}
