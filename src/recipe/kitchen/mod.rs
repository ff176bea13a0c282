// src/recipe/kitchen/mod.rs

//! Kitchen: the host that cooks recipes into packages
//!
//! The Kitchen drives a buildable recipe through the fixed lifecycle
//! (Source → Build → Package → Package-Info) in a scratch directory, then
//! records the result next to the package as `package_info.json`. It is
//! responsible for everything a recipe expects from its host:
//! - Restricting settings to the recipe's schema and computing the package id
//! - Checking every declared requirement is resolved before any stage runs
//! - Honoring the recipe's build policy against existing packages
//! - Writing generator files into the build directory

mod config;
mod cook;
pub mod copy;
pub mod generator;
pub mod runner;
pub mod source;
pub mod toolchain;

pub use config::{CookResult, KitchenConfig, Profile};
use cook::Cook;
pub use runner::{ProcessOutput, ProcessRunner, ProcessSpec, RecordingRunner, SystemRunner};
pub use source::{AbstractBase, GitSource, LocalSource};

use crate::error::{Error, Result};
use crate::recipe::format::{BuildPolicy, RecipeManifest};
use crate::recipe::layout::{verify_exports, ExportedInterface, PackageInfo, PackageLayout};
use crate::recipe::lifecycle::{resolve_in_order, Recipe, ResolvedDependency, SourceProvider};
use crate::recipe::reference::PackageReference;
use crate::recipe::settings::BuildSettings;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    pub(crate) runner: Arc<dyn ProcessRunner>,
}

impl Kitchen {
    /// Create a new Kitchen running real processes
    pub fn new(config: KitchenConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// Create a new Kitchen with a custom process runner
    pub fn with_runner(config: KitchenConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Where the package for `settings` lives under `output_dir`
    ///
    /// `<output_dir>/<name>/<version>/<package_id>`
    pub fn package_dir(
        manifest: &RecipeManifest,
        settings: &BuildSettings,
        output_dir: &Path,
    ) -> PathBuf {
        output_dir
            .join(&manifest.package.name)
            .join(&manifest.package.version)
            .join(manifest.package_id(settings))
    }

    /// Cook a recipe into a package under `output_dir`
    ///
    /// `deps` must resolve every requirement the recipe declares; they are
    /// checked before any stage runs.
    ///
    /// ## Cooking Process
    /// 1. **Policy**: reuse an existing package with the same id if allowed
    /// 2. **Source**: populate the working tree
    /// 3. **Build**: write generators, configure, compile
    /// 4. **Package**: assemble `include/` and `lib/` in a fresh package dir
    /// 5. **Package-Info**: verify exports and write `package_info.json`
    pub fn cook<R>(
        &self,
        recipe: &R,
        settings: &BuildSettings,
        deps: &[ResolvedDependency],
        output_dir: &Path,
    ) -> Result<CookResult>
    where
        R: Recipe + SourceProvider,
    {
        let manifest = recipe.manifest();
        let name = manifest.package.display_name();
        let settings = settings.restrict(&manifest.settings);
        let package_id = manifest.package_id(&settings);
        let layout = PackageLayout::new(Self::package_dir(manifest, &settings, output_dir));

        info!("Cooking {} ({})", name, settings);
        debug!("Package id: {}", package_id);

        resolve_in_order(&manifest.requires, deps)?;

        if let Some(result) = self.check_policy(manifest, &package_id, &layout)? {
            return Ok(result);
        }

        let mut cook = Cook::new(self, recipe, settings.clone(), deps)?;
        let outcome = self.run_stages(&mut cook, manifest, &settings, &package_id, &layout);
        let (log, kept) = cook.finish(self.config.keep_builddir);

        let (interface, files) = match outcome {
            Ok(done) => done,
            Err(e) => {
                if let Some(dir) = &kept {
                    warn!("Build of {} failed, scratch kept at {}", name, dir.display());
                }
                return Err(e);
            }
        };

        info!("Cooked: {} ({} files)", layout.root().display(), files.len());

        Ok(CookResult {
            package_dir: layout.root().to_path_buf(),
            package_id,
            interface,
            files,
            log,
            from_cache: false,
            build_dir: kept,
        })
    }

    fn run_stages<R>(
        &self,
        cook: &mut Cook<'_, R>,
        manifest: &RecipeManifest,
        settings: &BuildSettings,
        package_id: &str,
        layout: &PackageLayout,
    ) -> Result<(ExportedInterface, Vec<PathBuf>)>
    where
        R: Recipe + SourceProvider,
    {
        info!("Source: fetching ingredients...");
        cook.source()?;

        info!("Build: running toolchain...");
        cook.build()?;

        // A stale layout from an earlier build would leak into this one
        if layout.root().exists() {
            debug!("Removing previous package at {}", layout.root().display());
            fs::remove_dir_all(layout.root())?;
        }

        info!("Package: assembling layout...");
        cook.package(layout)?;

        let interface = cook.package_info()?;
        match verify_exports(layout, &interface) {
            Err(e) if !self.config.verify_exports => debug!("Not enforced: {}", e),
            result => result?,
        }

        layout.write_info(&PackageInfo {
            name: manifest.package.display_name(),
            package_id: package_id.to_string(),
            settings: settings.clone(),
            requires: manifest.requires.clone(),
            interface: interface.clone(),
        })?;

        Ok((interface, layout.files()?))
    }

    /// Apply the build policy; `Some` means no build is needed
    fn check_policy(
        &self,
        manifest: &RecipeManifest,
        package_id: &str,
        layout: &PackageLayout,
    ) -> Result<Option<CookResult>> {
        let name = manifest.package.display_name();
        let existing = match layout.read_info() {
            Ok(info) => info.filter(|i| i.package_id == package_id),
            Err(e) => {
                warn!("Ignoring unreadable package info for {}: {}", name, e);
                None
            }
        };

        match (manifest.build_policy, existing) {
            (BuildPolicy::Always, _) => Ok(None),
            (BuildPolicy::Missing | BuildPolicy::Never, Some(info)) => {
                info!(
                    "Using existing package for {} (policy: {})",
                    name,
                    manifest.build_policy.as_str()
                );
                Ok(Some(CookResult {
                    package_dir: layout.root().to_path_buf(),
                    package_id: info.package_id,
                    interface: info.interface,
                    files: layout.files()?,
                    log: format!("Reused existing package {}", layout.root().display()),
                    from_cache: true,
                    build_dir: None,
                }))
            }
            (BuildPolicy::Missing, None) => Ok(None),
            (BuildPolicy::Never, None) => Err(Error::PackageMissing(name)),
        }
    }

    /// Load a previously cooked package as a resolved dependency
    pub fn load_dependency(
        reference: &PackageReference,
        package_dir: &Path,
    ) -> Result<ResolvedDependency> {
        let layout = PackageLayout::new(package_dir);
        let info = layout.read_info()?.ok_or_else(|| {
            Error::UnresolvedDependency(format!(
                "{} (no package info in {})",
                reference,
                package_dir.display()
            ))
        })?;

        if info.name != reference.short() {
            return Err(Error::UnresolvedDependency(format!(
                "{} ({} holds {})",
                reference,
                package_dir.display(),
                info.name
            )));
        }

        Ok(ResolvedDependency {
            reference: reference.clone(),
            root: package_dir.to_path_buf(),
            interface: info.interface,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::cmake::protocol_session_base;

    #[test]
    fn test_package_dir_depends_on_schema_settings() {
        let recipe = protocol_session_base().unwrap();
        let manifest = recipe.manifest();
        let mut a = BuildSettings::default();
        a.set("build_type", "Release").unwrap();
        let mut b = a.clone();
        b.set("build_type", "Debug").unwrap();

        let out = Path::new("/out");
        let dir_a = Kitchen::package_dir(manifest, &a, out);
        assert!(dir_a.starts_with("/out/ProtocolSession/0.1.4"));
        assert_eq!(dir_a, Kitchen::package_dir(manifest, &a.clone(), out));
        assert_ne!(dir_a, Kitchen::package_dir(manifest, &b, out));
    }

    #[test]
    fn test_load_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let layout = PackageLayout::new(dir.path());
        layout
            .write_info(&PackageInfo {
                name: "ProtocolStateMachine/0.1.2".to_string(),
                package_id: "abc".to_string(),
                settings: BuildSettings::default(),
                requires: Vec::new(),
                interface: ExportedInterface {
                    libs: vec!["protocol_statemachine".to_string()],
                    include_dirs: vec!["include".to_string()],
                    lib_dirs: vec!["lib".to_string()],
                },
            })
            .unwrap();

        let reference: PackageReference =
            "ProtocolStateMachine/0.1.2@joystream/stable".parse().unwrap();
        let dep = Kitchen::load_dependency(&reference, dir.path()).unwrap();
        assert_eq!(dep.interface.libs, vec!["protocol_statemachine"]);
        assert_eq!(dep.lib_dirs(), vec![dir.path().join("lib")]);

        let other: PackageReference = "ProtocolStateMachine/0.2.0@joystream/stable".parse().unwrap();
        assert!(matches!(
            Kitchen::load_dependency(&other, dir.path()),
            Err(Error::UnresolvedDependency(_))
        ));
    }

    #[test]
    fn test_load_dependency_without_info() {
        let dir = tempfile::tempdir().unwrap();
        let reference: PackageReference = "A/1.0@u/c".parse().unwrap();
        assert!(Kitchen::load_dependency(&reference, dir.path()).is_err());
    }
}
