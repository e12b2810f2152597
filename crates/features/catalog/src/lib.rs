//! Brand catalog feature slice.
//!
//! [`domain`] holds the brand and model types with their derived attributes and the form
//! validation pipeline; it has no I/O. With the `server` feature, [`server`] adds the
//! storage adapter, logo uploads, the workflow, Handlebars views and the axum routes,
//! registered into the kernel state as the [`Catalog`] slice.

pub mod domain;
mod error;
#[cfg(feature = "server")]
pub mod server;

pub use error::{CatalogError, CatalogErrorExt};
#[cfg(feature = "server")]
pub use server::{Catalog, CatalogInner, init, router};
