//! # Domain
//!
//! Plain data shared across the workspace: configuration, table and route constants,
//! and the feature slice registry types. No I/O lives here; the only dependency is `serde`.

pub mod config;
pub mod constants;
pub mod registry;
