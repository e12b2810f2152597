#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by every crate of the workspace:
//!
//! * [`macro@showroom_error`] turns an enum into a `thiserror` error with a `.context()` adapter.
//! * [`macro@showroom_slice`] turns a struct into a cheaply clonable feature slice handle.
//! * [`macro@main`] boots an `async fn main` on a profiled Tokio runtime.
//!
//! Examples are `ignore`d here; the consuming crates compile them for real.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Boots an `async fn main` on a Tokio runtime built from a named profile.
///
/// Accepted profiles: `high_performance`, `memory_efficient` and `default` (or no argument).
/// The function must be `async` and return a `Result`.
///
/// ```rust,ignore
/// #[showroom_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Declares a domain error enum.
///
/// Every variant uses named fields. Variants that wrap an upstream error name it `source`
/// (or mark it `#[source]`/`#[from]`) and must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext` trait with `.context(...)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every wrapped source type.
/// * `From<Source>` for each wrapping variant so `?` works.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for the `#[error(...)]` strings.
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[showroom_derive::showroom_error]
/// pub enum StoreError {
///     #[error("Database error{}: {source}", format_context(.context))]
///     Database { source: surrealdb::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn lookup(db: &Db) -> Result<Brand, StoreError> {
///     db.fetch().context("Loading brand")
/// }
/// ```
#[proc_macro_attribute]
pub fn showroom_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}

/// Turns a struct into a feature slice handle.
///
/// The annotated fields move into a generated `<Name>Inner` struct; `<Name>` becomes an
/// `Arc` wrapper that derefs to it and implements `FeatureSlice` so it can be registered
/// into the kernel's API state.
///
/// ```rust,ignore
/// #[showroom_derive::showroom_slice]
/// pub struct Catalog {
///     pub views: Views,
/// }
///
/// let slice = Catalog::new(CatalogInner { views });
/// ```
#[proc_macro_attribute]
pub fn showroom_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
