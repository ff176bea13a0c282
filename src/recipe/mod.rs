// src/recipe/mod.rs

//! Recipe system for building native library packages from source
//!
//! A recipe declares a package's identity, the settings axes it consumes,
//! the packages it requires, and the four lifecycle stages the host runs:
//! Source, Build, Package and Package-Info.
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The build specification, a TOML manifest plus a [`Recipe`] implementation
//! - **Cook**: Run one package build through every stage
//! - **Kitchen**: The host driving cooks, resolving policy and dependencies
//!
//! # Example Recipe
//!
//! ```toml
//! abstract = true
//! requires = ["ProtocolStateMachine/0.1.2@joystream/stable"]
//! generators = ["cmake"]
//!
//! [package]
//! name = "ProtocolSession"
//! version = "0.1.4"
//! repo_https_url = "https://github.com/JoyStream/protocol_session-cpp.git"
//!
//! [package_info]
//! libs = ["protocol_session"]
//! ```
//!
//! A base recipe such as this one has no Source stage. Pair it with a
//! [`SourceProvider`] to build it:
//!
//! ```no_run
//! use larder::recipe::{protocol_session_base, GitSource, Kitchen, Recipe};
//! use larder::BuildSettings;
//!
//! # fn main() -> larder::Result<()> {
//! let base = protocol_session_base()?;
//! let source = GitSource::from_manifest(base.manifest())?;
//! let recipe = base.with_source(source);
//!
//! let kitchen = Kitchen::with_defaults();
//! // ProtocolStateMachine must be resolved before cooking
//! let deps: Vec<larder::recipe::ResolvedDependency> = Vec::new();
//! kitchen.cook(&recipe, &BuildSettings::detect_host(), &deps, "out".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod cmake;
mod format;
pub mod kitchen;
pub mod layout;
pub mod lifecycle;
pub mod parser;
pub mod reference;
pub mod settings;

pub use cmake::{protocol_session_base, CmakeLibraryRecipe};
pub use format::{
    default_copy_rules, BuildPolicy, CopyRoot, CopyRule, Generator, LayoutSection,
    PackageIdentity, PackageInfoSection, RecipeManifest,
};
pub use kitchen::{
    AbstractBase, CookResult, GitSource, Kitchen, KitchenConfig, LocalSource, Profile,
};
pub use layout::{verify_exports, ExportedInterface, PackageInfo, PackageLayout};
pub use lifecycle::{
    BuildContext, Recipe, ResolvedDependency, SourceProvider, Sourced, Stage, StepRecord,
    WorkingTree,
};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
pub use reference::PackageReference;
pub use settings::{Arch, BuildSettings, BuildType, Compiler, Os, SettingAxis};
