//! Brand use cases, independent of HTTP.
//!
//! Every operation returns an outcome the handlers turn into a page or a redirect.
//! Validation failures, blocked deletes and rejected uploads are outcomes, not errors.

use super::store::{CatalogStore, Collection};
use super::upload::{LogoUploader, UploadError, UploadedFile};
use crate::domain::{Brand, BrandForm, BrandId, FormValues, Model, ValidationFailure};
use crate::error::CatalogError;
use std::borrow::Cow;
use tracing::{info, instrument, warn};

/// Record counts shown on the catalog home page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub brands: u64,
    pub models: u64,
    pub features: u64,
}

/// A brand with the models that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandPage {
    pub brand: Brand,
    pub models: Vec<Model>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Saved(Brand),
    /// A brand with the submitted name already exists; nothing was written.
    Existing(Brand),
    Rejected(ValidationFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    Removed,
    Blocked { brand: Brand, models: Vec<Model> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoUpload {
    Stored(Brand),
    Rejected { brand: Brand, message: Cow<'static, str> },
}

#[derive(Debug)]
pub struct BrandWorkflow<S> {
    store: S,
    uploader: LogoUploader,
}

fn parse_id(raw: &str) -> Result<BrandId, CatalogError> {
    BrandId::parse(raw).ok_or_else(|| CatalogError::not_found(format!("brand '{raw}'")))
}

impl<S: CatalogStore> BrandWorkflow<S> {
    pub const fn new(store: S, uploader: LogoUploader) -> Self {
        Self { store, uploader }
    }

    pub const fn uploader(&self) -> &LogoUploader {
        &self.uploader
    }

    async fn existing(&self, id: &BrandId) -> Result<Brand, CatalogError> {
        self.store.brand(id).await?.ok_or_else(|| CatalogError::not_found(format!("brand '{id}'")))
    }

    async fn with_models(&self, id: &BrandId) -> Result<BrandPage, CatalogError> {
        let (brand, models) = tokio::try_join!(self.store.brand(id), self.store.models_of(id))?;
        let brand = brand.ok_or_else(|| CatalogError::not_found(format!("brand '{id}'")))?;
        Ok(BrandPage { brand, models })
    }

    /// # Errors
    /// Store failures.
    #[instrument(skip(self))]
    pub async fn home(&self) -> Result<Counts, CatalogError> {
        let (brands, models, features) = tokio::try_join!(
            self.store.count(Collection::Brands),
            self.store.count(Collection::Models),
            self.store.count(Collection::Features),
        )?;
        Ok(Counts { brands, models, features })
    }

    /// All brands, sorted by name.
    ///
    /// # Errors
    /// Store failures.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Brand>, CatalogError> {
        self.store.brands().await
    }

    /// # Errors
    /// [`CatalogError::NotFound`] for malformed or unknown ids.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: &str) -> Result<BrandPage, CatalogError> {
        self.with_models(&parse_id(id)?).await
    }

    /// Blank values for the create form.
    #[must_use]
    pub fn create_form(&self) -> FormValues {
        FormValues::default()
    }

    /// Validates and creates, unless a brand with the same name exists.
    ///
    /// The name lookup and the insert are separate statements; two concurrent
    /// submissions of a new name can both insert.
    ///
    /// # Errors
    /// Store failures.
    #[instrument(skip(self, form))]
    pub async fn create(&self, form: &BrandForm) -> Result<Submission, CatalogError> {
        let input = match form.validate() {
            Ok(input) => input,
            Err(failure) => return Ok(Submission::Rejected(failure)),
        };

        if let Some(existing) = self.store.brand_by_name(&input.name).await? {
            info!(id = %existing.id, "Brand already exists");
            return Ok(Submission::Existing(existing));
        }

        let brand = self.store.insert_brand(&input).await?;
        info!(id = %brand.id, name = %brand.name, "Brand created");
        Ok(Submission::Saved(brand))
    }

    /// # Errors
    /// [`CatalogError::NotFound`] for malformed or unknown ids.
    #[instrument(skip(self))]
    pub async fn update_form(&self, id: &str) -> Result<Brand, CatalogError> {
        self.existing(&parse_id(id)?).await
    }

    /// Replaces name and founded date. The logo is kept.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for malformed or unknown ids.
    #[instrument(skip(self, form))]
    pub async fn update(&self, id: &str, form: &BrandForm) -> Result<Submission, CatalogError> {
        let id = parse_id(id)?;
        let current = self.existing(&id).await?;

        let input = match form.validate() {
            Ok(input) => input,
            Err(failure) => return Ok(Submission::Rejected(failure)),
        };

        let brand = self.store.replace_brand(&current.id, &input).await?;
        info!(id = %brand.id, "Brand updated");
        Ok(Submission::Saved(brand))
    }

    /// The brand and its models, for the delete confirmation.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for malformed or unknown ids.
    #[instrument(skip(self))]
    pub async fn delete_form(&self, id: &str) -> Result<BrandPage, CatalogError> {
        self.with_models(&parse_id(id)?).await
    }

    /// Removes the brand unless a model still references it. A brand that no longer
    /// exists counts as removed.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for malformed ids, store failures.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Deletion, CatalogError> {
        let id = parse_id(id)?;
        let (brand, models) = tokio::try_join!(self.store.brand(&id), self.store.models_of(&id))?;

        match brand {
            Some(brand) if !models.is_empty() => {
                warn!(id = %id, models = models.len(), "Brand delete blocked by models");
                Ok(Deletion::Blocked { brand, models })
            }
            Some(_) => {
                self.store.remove_brand(&id).await?;
                info!(id = %id, "Brand deleted");
                Ok(Deletion::Removed)
            }
            None => Ok(Deletion::Removed),
        }
    }

    /// # Errors
    /// [`CatalogError::NotFound`] for malformed or unknown ids.
    #[instrument(skip(self))]
    pub async fn upload_form(&self, id: &str) -> Result<Brand, CatalogError> {
        self.existing(&parse_id(id)?).await
    }

    /// Stores the logo and points the brand at it. Rejected files leave the brand as is.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for malformed or unknown ids, store failures.
    #[instrument(skip(self, file))]
    pub async fn upload_logo(
        &self,
        id: &str,
        file: Result<UploadedFile, UploadError>,
    ) -> Result<LogoUpload, CatalogError> {
        let brand = self.existing(&parse_id(id)?).await?;

        let stored = match file {
            Ok(file) => self.uploader.store(&file).await,
            Err(err) => Err(err),
        };

        match stored {
            Ok(logo) => match self.store.set_logo(&brand.id, &logo).await {
                Ok(brand) => Ok(LogoUpload::Stored(brand)),
                Err(err) => {
                    self.uploader.discard(&logo).await;
                    Err(err)
                }
            },
            Err(err) => {
                warn!(id = %brand.id, error = %err, "Logo upload rejected");
                Ok(LogoUpload::Rejected { brand, message: err.message() })
            }
        }
    }
}
