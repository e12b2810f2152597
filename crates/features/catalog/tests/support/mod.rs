#![allow(dead_code, unreachable_pub)]

use parking_lot::RwLock;
use showroom_catalog::CatalogError;
use showroom_catalog::domain::{Brand, BrandId, BrandInput, Model};
use showroom_catalog::server::{BrandWorkflow, CatalogStore, Collection, LogoUploader};
use showroom_domain::config::UploadConfig;
use showroom_storage::Storage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tempfile::TempDir;

#[derive(Debug, Default)]
struct State {
    brands: Vec<Brand>,
    models: Vec<Model>,
    features: u64,
}

/// In-memory [`CatalogStore`] with a switch to simulate an unreachable database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    offline: Arc<AtomicBool>,
    read_only: Arc<AtomicBool>,
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Reads keep working while updates of existing brands fail.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    pub fn add_model(&self, id: &str, name: &str, brand: &BrandId) {
        self.state.write().models.push(Model {
            id: id.to_owned(),
            name: name.to_owned(),
            brand: brand.clone(),
        });
    }

    pub fn set_features(&self, count: u64) {
        self.state.write().features = count;
    }

    pub fn snapshot(&self) -> Vec<Brand> {
        self.state.read().brands.clone()
    }

    fn online(&self) -> Result<(), CatalogError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CatalogError::from("store offline"))
        } else {
            Ok(())
        }
    }

    fn update<F>(&self, id: &BrandId, apply: F) -> Result<Brand, CatalogError>
    where
        F: FnOnce(&mut Brand),
    {
        self.online()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(CatalogError::from("store is read only"));
        }
        let mut state = self.state.write();
        let brand = state
            .brands
            .iter_mut()
            .find(|brand| &brand.id == id)
            .ok_or_else(|| CatalogError::NotFound { message: id.to_string().into(), context: None })?;
        apply(brand);
        Ok(brand.clone())
    }
}

impl CatalogStore for MemoryStore {
    async fn brands(&self) -> Result<Vec<Brand>, CatalogError> {
        self.online()?;
        let mut brands = self.state.read().brands.clone();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands)
    }

    async fn brand(&self, id: &BrandId) -> Result<Option<Brand>, CatalogError> {
        self.online()?;
        Ok(self.state.read().brands.iter().find(|brand| &brand.id == id).cloned())
    }

    async fn brand_by_name(&self, name: &str) -> Result<Option<Brand>, CatalogError> {
        self.online()?;
        Ok(self.state.read().brands.iter().find(|brand| brand.name == name).cloned())
    }

    async fn models_of(&self, id: &BrandId) -> Result<Vec<Model>, CatalogError> {
        self.online()?;
        Ok(self.state.read().models.iter().filter(|model| &model.brand == id).cloned().collect())
    }

    async fn count(&self, collection: Collection) -> Result<u64, CatalogError> {
        self.online()?;
        let state = self.state.read();
        Ok(match collection {
            Collection::Brands => state.brands.len() as u64,
            Collection::Models => state.models.len() as u64,
            Collection::Features => state.features,
        })
    }

    async fn insert_brand(&self, input: &BrandInput) -> Result<Brand, CatalogError> {
        self.online()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let brand = Brand {
            id: BrandId::parse(&format!("b{n}")).ok_or("bad id")?,
            name: input.name.clone(),
            founded: input.founded,
            logo: None,
        };
        self.state.write().brands.push(brand.clone());
        Ok(brand)
    }

    async fn replace_brand(&self, id: &BrandId, input: &BrandInput) -> Result<Brand, CatalogError> {
        self.update(id, |brand| {
            brand.name.clone_from(&input.name);
            brand.founded = input.founded;
        })
    }

    async fn set_logo(&self, id: &BrandId, logo: &str) -> Result<Brand, CatalogError> {
        self.update(id, |brand| brand.logo = Some(logo.to_owned()))
    }

    async fn remove_brand(&self, id: &BrandId) -> Result<(), CatalogError> {
        self.online()?;
        self.state.write().brands.retain(|brand| &brand.id != id);
        Ok(())
    }
}

/// Upload storage in a temp dir, kept alive by the returned guard.
pub async fn uploader(max_bytes: usize) -> (TempDir, Storage, LogoUploader) {
    let tmp = tempfile::tempdir().unwrap();
    let storage = Storage::builder().root(tmp.path().join("uploads")).connect().await.unwrap();
    let rules = UploadConfig { max_bytes, ..UploadConfig::default() };
    let uploader = LogoUploader::new(&storage, rules).unwrap();
    (tmp, storage, uploader)
}

pub async fn workflow() -> (TempDir, MemoryStore, BrandWorkflow<MemoryStore>) {
    let (tmp, _storage, uploader) = uploader(1024).await;
    let store = MemoryStore::default();
    (tmp, store.clone(), BrandWorkflow::new(store, uploader))
}
