// src/recipe/lifecycle.rs

//! The recipe lifecycle contract
//!
//! The host drives every package build through the same fixed sequence:
//!
//! 1. **Source** - populate a [`WorkingTree`] ([`SourceProvider`])
//! 2. **Build** - run the toolchain against the tree ([`Recipe::build`])
//! 3. **Package** - assemble a [`PackageLayout`] ([`Recipe::package`])
//! 4. **Package-Info** - declare the [`ExportedInterface`] ([`Recipe::package_info`])
//!
//! Base recipes implement [`Recipe`] only. A recipe becomes buildable once
//! it is paired with a [`SourceProvider`] (see [`Recipe::with_source`]);
//! the kitchen only accepts types implementing both, so building a base
//! recipe directly is rejected by the compiler.

use crate::error::{Error, Result, ToolchainStep};
use crate::recipe::format::RecipeManifest;
use crate::recipe::kitchen::runner::{ProcessOutput, ProcessRunner};
use crate::recipe::layout::{ExportedInterface, PackageLayout};
use crate::recipe::reference::PackageReference;
use crate::recipe::settings::BuildSettings;
use std::fmt;
use std::path::{Path, PathBuf};

/// Lifecycle stages in the order the host runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Source,
    Build,
    Package,
    PackageInfo,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Build => "build",
            Self::Package => "package",
            Self::PackageInfo => "package_info",
        }
    }

    /// The stage that must have completed before this one
    pub fn previous(&self) -> Option<Stage> {
        match self {
            Self::Source => None,
            Self::Build => Some(Self::Source),
            Self::Package => Some(Self::Build),
            Self::PackageInfo => Some(Self::Package),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source material for one package build
///
/// Owned by the host between stages; a recipe only touches it while one of
/// its own stages runs.
#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: PathBuf,
}

impl WorkingTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }
}

/// A requirement resolved by the host to a built package on disk
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub reference: PackageReference,
    /// Package root holding `include/` and `lib/`
    pub root: PathBuf,
    pub interface: ExportedInterface,
}

impl ResolvedDependency {
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        self.interface
            .include_dirs
            .iter()
            .map(|d| self.root.join(d))
            .collect()
    }

    pub fn lib_dirs(&self) -> Vec<PathBuf> {
        self.interface
            .lib_dirs
            .iter()
            .map(|d| self.root.join(d))
            .collect()
    }

    /// Whether this resolution satisfies `reference`
    pub fn satisfies(&self, reference: &PackageReference) -> bool {
        &self.reference == reference
    }
}

/// Order `deps` as `requires` declares them, failing on any gap
pub fn resolve_in_order<'a>(
    requires: &[PackageReference],
    deps: &'a [ResolvedDependency],
) -> Result<Vec<&'a ResolvedDependency>> {
    requires
        .iter()
        .map(|req| {
            deps.iter()
                .find(|d| d.satisfies(req))
                .ok_or_else(|| Error::UnresolvedDependency(req.to_string()))
        })
        .collect()
}

/// Everything the Build stage may read
pub struct BuildContext<'a> {
    pub tree: &'a WorkingTree,
    /// Explicit build output directory
    pub build_dir: &'a Path,
    pub settings: &'a BuildSettings,
    pub deps: &'a [ResolvedDependency],
    pub runner: &'a dyn ProcessRunner,
    /// CMake executable name or path
    pub cmake_program: &'a str,
}

/// One toolchain invocation made by the Build stage
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: ToolchainStep,
    pub command: String,
    pub output: ProcessOutput,
}

/// Build, Package and Package-Info stages of a recipe
pub trait Recipe {
    /// Static identity and declarations
    fn manifest(&self) -> &RecipeManifest;

    /// Compile the working tree into `ctx.build_dir`
    ///
    /// Fails atomically: on error the caller must treat the build directory
    /// as garbage.
    fn build(&self, ctx: &BuildContext<'_>) -> Result<Vec<StepRecord>>;

    /// Copy build outputs into `layout`; returns paths relative to its root
    ///
    /// Running this twice on unchanged inputs yields the same layout.
    fn package(
        &self,
        tree: &WorkingTree,
        build_dir: &Path,
        layout: &PackageLayout,
    ) -> Result<Vec<PathBuf>>;

    /// Libraries downstream consumers link against
    fn package_info(&self) -> ExportedInterface;

    /// Pair this recipe with a Source stage, making it buildable
    fn with_source<S: SourceProvider>(self, source: S) -> Sourced<Self, S>
    where
        Self: Sized,
    {
        Sourced {
            recipe: self,
            source,
        }
    }
}

/// The Source stage
pub trait SourceProvider {
    /// Populate `tree` with buildable sources
    fn source(&self, tree: &WorkingTree, runner: &dyn ProcessRunner) -> Result<()>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// A base recipe combined with a Source stage
pub struct Sourced<R, S> {
    pub recipe: R,
    pub source: S,
}

impl<R: Recipe, S> Recipe for Sourced<R, S> {
    fn manifest(&self) -> &RecipeManifest {
        self.recipe.manifest()
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<Vec<StepRecord>> {
        self.recipe.build(ctx)
    }

    fn package(
        &self,
        tree: &WorkingTree,
        build_dir: &Path,
        layout: &PackageLayout,
    ) -> Result<Vec<PathBuf>> {
        self.recipe.package(tree, build_dir, layout)
    }

    fn package_info(&self) -> ExportedInterface {
        self.recipe.package_info()
    }
}

impl<R, S: SourceProvider> SourceProvider for Sourced<R, S> {
    fn source(&self, tree: &WorkingTree, runner: &dyn ProcessRunner) -> Result<()> {
        self.source.source(tree, runner)
    }

    fn describe(&self) -> String {
        self.source.describe()
    }
}

impl<S: SourceProvider + ?Sized> SourceProvider for Box<S> {
    fn source(&self, tree: &WorkingTree, runner: &dyn ProcessRunner) -> Result<()> {
        (**self).source(tree, runner)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
