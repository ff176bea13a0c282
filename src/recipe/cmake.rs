// src/recipe/cmake.rs

//! CMake-built static library recipes

use crate::error::{Error, Result, ToolchainStep};
use crate::recipe::format::{CopyRoot, RecipeManifest};
use crate::recipe::kitchen::copy::Copier;
use crate::recipe::kitchen::runner::ProcessSpec;
use crate::recipe::kitchen::toolchain::CmakeInvocation;
use crate::recipe::layout::{ExportedInterface, PackageLayout};
use crate::recipe::lifecycle::{
    resolve_in_order, BuildContext, Recipe, StepRecord, WorkingTree,
};
use crate::recipe::parser::{parse_recipe, validate_recipe};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The build configuration file the Build stage requires
pub const BUILD_FILE: &str = "CMakeLists.txt";

const PROTOCOL_SESSION_RECIPE: &str = include_str!("../../recipes/protocol_session.toml");

/// Base recipe for a CMake project producing static libraries
///
/// Implements Build, Package and Package-Info from a manifest. It has no
/// Source stage; pair it with a [`SourceProvider`] through
/// [`Recipe::with_source`] to build it.
///
/// [`SourceProvider`]: crate::recipe::lifecycle::SourceProvider
#[derive(Debug, Clone)]
pub struct CmakeLibraryRecipe {
    manifest: RecipeManifest,
}

impl CmakeLibraryRecipe {
    /// Wrap a manifest, rejecting ones that fail validation
    pub fn new(manifest: RecipeManifest) -> Result<Self> {
        let warnings = validate_recipe(&manifest)?;
        for warning in warnings {
            debug!("{}: {}", manifest.package.display_name(), warning);
        }
        Ok(Self { manifest })
    }

    /// Directory holding the root build file
    pub fn source_dir(&self, tree: &WorkingTree) -> PathBuf {
        tree.join(&self.manifest.layout.source_root)
    }

    /// Configure and compile invocations for `ctx`, without running them
    pub fn plan(&self, ctx: &BuildContext<'_>) -> Result<(ProcessSpec, ProcessSpec)> {
        let deps = resolve_in_order(&self.manifest.requires, ctx.deps)?;
        let prefix_paths: Vec<PathBuf> = deps.iter().map(|d| d.root.clone()).collect();
        let settings = ctx.settings.restrict(&self.manifest.settings);
        let invocation = CmakeInvocation::derive(&settings, &prefix_paths);

        let configure = ProcessSpec::new(ctx.cmake_program, ctx.build_dir)
            .args(invocation.configure_args(&self.source_dir(ctx.tree)));
        let compile =
            ProcessSpec::new(ctx.cmake_program, ctx.build_dir).args(invocation.build_args());
        Ok((configure, compile))
    }
}

/// The ProtocolSession 0.1.4 base recipe
pub fn protocol_session_base() -> Result<CmakeLibraryRecipe> {
    CmakeLibraryRecipe::new(parse_recipe(PROTOCOL_SESSION_RECIPE)?)
}

fn run_step(
    ctx: &BuildContext<'_>,
    step: ToolchainStep,
    spec: &ProcessSpec,
) -> Result<StepRecord> {
    info!("Running {} step", step);
    debug!("Command: {}", spec.command_line());

    let output = ctx.runner.run(spec)?;
    if !output.success() {
        return Err(Error::ToolchainInvocationFailed {
            step,
            status: output.status,
            stderr: output.stderr,
        });
    }

    Ok(StepRecord {
        step,
        command: spec.command_line(),
        output,
    })
}

impl Recipe for CmakeLibraryRecipe {
    fn manifest(&self) -> &RecipeManifest {
        &self.manifest
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<Vec<StepRecord>> {
        let build_file = self.source_dir(ctx.tree).join(BUILD_FILE);
        if !build_file.is_file() {
            return Err(Error::MissingBuildFile(build_file));
        }

        let (configure, compile) = self.plan(ctx)?;
        fs::create_dir_all(ctx.build_dir)?;

        let mut records = Vec::with_capacity(2);
        records.push(run_step(ctx, ToolchainStep::Configure, &configure)?);
        records.push(run_step(ctx, ToolchainStep::Compile, &compile)?);
        Ok(records)
    }

    fn package(
        &self,
        tree: &WorkingTree,
        build_dir: &Path,
        layout: &PackageLayout,
    ) -> Result<Vec<PathBuf>> {
        let mut copier = Copier::new(layout.root());
        let mut packaged = Vec::new();

        for rule in self.manifest.copy_rules().iter() {
            let root = match rule.from {
                CopyRoot::Source => tree.root(),
                CopyRoot::Build => build_dir,
            };
            packaged.extend(copier.apply(rule, root)?);
        }

        info!(
            "Packaged {} file(s) into {}",
            packaged.len(),
            layout.root().display()
        );
        Ok(packaged)
    }

    fn package_info(&self) -> ExportedInterface {
        ExportedInterface::from(&self.manifest.package_info)
    }
}
