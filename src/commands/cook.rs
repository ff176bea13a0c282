// src/commands/cook.rs

//! Cook command - build packages from recipes

use super::resolve_settings;
use anyhow::{bail, Context, Result};
use larder::recipe::{
    parse_recipe_file, validate_recipe, AbstractBase, CmakeLibraryRecipe, GitSource, Kitchen,
    KitchenConfig, LocalSource, RecipeManifest, ResolvedDependency, SourceProvider,
};
use larder::Recipe;
use std::path::{Path, PathBuf};
use tracing::info;

/// Cook a package from a recipe
///
/// # Arguments
/// * `recipe_path` - Path to the recipe manifest
/// * `source` - Local checkout to use as the Source stage
/// * `git` - Clone the declared repository as the Source stage
/// * `rev` - Revision to check out after cloning
/// * `profile` - Settings profile file
/// * `overrides` - `axis=value` settings overrides
/// * `deps` - `NAME=DIR` resolutions for declared requirements
/// * `output_dir` - Output directory for packages
/// * `work_dir` - Parent directory for scratch trees
/// * `keep_builddir` - Keep scratch directory after completion
/// * `verify` - Enforce the export consistency check
#[allow(clippy::too_many_arguments)]
pub fn cmd_cook(
    recipe_path: &str,
    source: Option<&str>,
    git: bool,
    rev: Option<&str>,
    profile: Option<&str>,
    overrides: &[String],
    deps: &[String],
    output_dir: &str,
    work_dir: Option<&str>,
    keep_builddir: bool,
    verify: bool,
) -> Result<()> {
    let recipe_path = Path::new(recipe_path);
    let output_dir = Path::new(output_dir);

    println!("Reading recipe: {}", recipe_path.display());
    let manifest = parse_recipe_file(recipe_path)
        .with_context(|| format!("Failed to parse recipe: {}", recipe_path.display()))?;

    println!(
        "Recipe: {} version {}",
        manifest.package.name, manifest.package.version
    );

    let warnings = validate_recipe(&manifest).with_context(|| "Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    let settings = resolve_settings(profile, overrides)?;
    let resolved = resolve_deps(&manifest, deps)?;

    let mut config = KitchenConfig {
        keep_builddir,
        verify_exports: verify,
        ..Default::default()
    };
    if let Some(dir) = work_dir {
        config.work_root = PathBuf::from(dir);
    }

    let provider = select_source(&manifest, source, git, rev, &config)?;
    println!("Source: {}", provider.describe());

    let recipe = CmakeLibraryRecipe::new(manifest)
        .with_context(|| "Recipe validation failed")?
        .with_source(provider);

    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let kitchen = Kitchen::new(config);
    let name = recipe.manifest().package.display_name();
    let result = kitchen
        .cook(&recipe, &settings, &resolved, output_dir)
        .with_context(|| format!("Failed to cook {}", name))?;

    if result.from_cache {
        println!("\n[OK] Package up to date: {}", result.package_dir.display());
    } else {
        println!("\n[COMPLETE] Cooked: {}", result.package_dir.display());
        for file in &result.files {
            println!("  - {}", file.display());
        }
    }
    println!("Package id: {}", result.package_id);
    println!("Libraries: {}", result.interface.libs.join(", "));

    if let Some(dir) = &result.build_dir {
        println!("Build directory kept at {}", dir.display());
    }

    info!(
        "Successfully cooked {} to {}",
        name,
        result.package_dir.display()
    );

    Ok(())
}

/// Pick the Source stage for this invocation
///
/// Without `--source` or `--git`, a base recipe keeps its abstract Source
/// stage and refuses to build.
fn select_source(
    manifest: &RecipeManifest,
    source: Option<&str>,
    git: bool,
    rev: Option<&str>,
    config: &KitchenConfig,
) -> Result<Box<dyn SourceProvider>> {
    if let Some(dir) = source {
        return Ok(Box::new(LocalSource::new(dir)));
    }

    if git || !manifest.is_abstract {
        let mut provider = GitSource::from_manifest(manifest)?
            .with_git_program(config.git_program.clone());
        if let Some(rev) = rev {
            provider = provider.with_rev(rev);
        }
        return Ok(Box::new(provider));
    }

    Ok(Box::new(AbstractBase::for_manifest(manifest)))
}

/// Turn `NAME=DIR` arguments into resolved dependencies
fn resolve_deps(manifest: &RecipeManifest, args: &[String]) -> Result<Vec<ResolvedDependency>> {
    let mut resolved = Vec::with_capacity(args.len());

    for arg in args {
        let Some((name, dir)) = arg.split_once('=') else {
            bail!("Invalid --dep '{}': expected NAME=DIR", arg);
        };

        let Some(reference) = manifest.requires.iter().find(|r| r.name == name) else {
            bail!(
                "--dep {}: {} does not require a package named '{}'",
                arg,
                manifest.package.display_name(),
                name
            );
        };

        let dep = Kitchen::load_dependency(reference, Path::new(dir))
            .with_context(|| format!("Failed to load dependency {}", reference))?;
        println!("Dependency: {} -> {}", reference, dir);
        resolved.push(dep);
    }

    Ok(resolved)
}
