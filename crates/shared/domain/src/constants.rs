//! Table names and URL prefixes that more than one crate must agree on.

pub const BRAND: &str = "brand";
pub const MODEL: &str = "model";
pub const FEATURE: &str = "feature";

/// Mount point of the catalog pages.
pub const CATALOG_PATH: &str = "/catalog";
/// Mount point of the uploaded files; the upload namespace is the next segment.
pub const UPLOADS_PATH: &str = "/uploads";
pub const HEALTH_PATH: &str = "/health";
