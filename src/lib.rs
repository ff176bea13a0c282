// src/lib.rs

//! Larder: package-build recipes for native libraries
//!
//! A recipe takes a C++ library from its source repository to a published
//! package: headers under `include/`, static archives under `lib/`, and a
//! declared link interface for downstream consumers.
//!
//! # Architecture
//!
//! - Recipes: declarative TOML manifests plus the [`recipe::Recipe`] lifecycle trait
//! - Sources: supplied separately through [`recipe::SourceProvider`]; base recipes have none
//! - Kitchen: the host, running stages in order in a scratch directory
//! - Package ids: SHA-256 over identity, schema-filtered settings and requires

mod error;
pub mod recipe;

pub use error::{Error, Result, ToolchainStep};
pub use recipe::{
    BuildSettings, CookResult, Kitchen, KitchenConfig, PackageReference, Recipe, SourceProvider,
};
