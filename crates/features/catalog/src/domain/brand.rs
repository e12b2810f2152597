use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use showroom_domain::constants::BRAND;
use showroom_kernel::safe_nanoid;
use showroom_kernel::security::resource::ResourceGuard;
use std::fmt;

pub const BRAND_URL_PREFIX: &str = "/catalog/brand/";
pub const MODEL_URL_PREFIX: &str = "/catalog/model/";
pub const LOGO_URL_PREFIX: &str = "/uploads/brand/";

/// Key of a `brand` record, validated to be safe inside URLs and queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandId(String);

impl BrandId {
    /// Accepts `brand:<key>` or a bare key. `None` for anything else, including ids of
    /// other tables.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        ResourceGuard::verify(raw, BRAND).ok().map(Self)
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(safe_nanoid!())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub founded: Option<NaiveDate>,
    /// File name inside the brand upload namespace.
    pub logo: Option<String>,
}

impl Brand {
    /// `/catalog/brand/<id>`
    #[must_use]
    pub fn url(&self) -> String {
        format!("{BRAND_URL_PREFIX}{}", self.id)
    }

    /// `/uploads/brand/<logo>`, or `None` before a logo was uploaded.
    #[must_use]
    pub fn logo_url(&self) -> Option<String> {
        self.logo.as_ref().map(|logo| format!("{LOGO_URL_PREFIX}{logo}"))
    }

    /// Founding year, empty when unknown.
    #[must_use]
    pub fn founded_formatted(&self) -> String {
        self.founded.map(|date| date.format("%Y").to_string()).unwrap_or_default()
    }

    /// `YYYY-MM-DD`, empty when unknown. Used to prefill date inputs.
    #[must_use]
    pub fn founded_yyyy_mm_dd(&self) -> String {
        self.founded.map(|date| date.format("%Y-%m-%d").to_string()).unwrap_or_default()
    }
}

/// A model as seen from the brand pages. Read only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub brand: BrandId,
}

impl Model {
    #[must_use]
    pub fn url(&self) -> String {
        format!("{MODEL_URL_PREFIX}{}", self.id)
    }
}
