// src/commands/inspect.rs

//! Inspect command - show what a recipe declares

use super::resolve_settings;
use anyhow::{Context, Result};
use larder::recipe::{parse_recipe_file, validate_recipe, Kitchen};
use std::path::Path;

/// Print a recipe's identity, requirements, schema and package id
pub fn cmd_inspect(recipe_path: &str, profile: Option<&str>, overrides: &[String]) -> Result<()> {
    let recipe_path = Path::new(recipe_path);
    let manifest = parse_recipe_file(recipe_path)
        .with_context(|| format!("Failed to parse recipe: {}", recipe_path.display()))?;
    let warnings = validate_recipe(&manifest).with_context(|| "Recipe validation failed")?;

    let pkg = &manifest.package;
    println!("Package: {}", pkg.display_name());
    if manifest.is_abstract {
        println!("  (base recipe: needs a source to build)");
    }
    if let Some(license) = &pkg.license {
        println!("License: {}", license);
    }
    if let Some(url) = &pkg.url {
        println!("URL: {}", url);
    }
    for locator in pkg.source_locators() {
        println!("Repository: {}", locator);
    }

    if manifest.requires.is_empty() {
        println!("Requires: (none)");
    } else {
        println!("Requires:");
        for req in &manifest.requires {
            println!("  - {}", req);
        }
    }

    let axes: Vec<&str> = manifest.settings.iter().map(|a| a.as_str()).collect();
    println!("Settings: {}", axes.join(", "));
    println!("Build policy: {}", manifest.build_policy.as_str());
    println!("Libraries: {}", manifest.package_info.libs.join(", "));

    let settings = resolve_settings(profile, overrides)?.restrict(&manifest.settings);
    println!("\nFor settings: {}", settings);
    println!("Package id: {}", manifest.package_id(&settings));
    println!(
        "Package dir: {}",
        Kitchen::package_dir(&manifest, &settings, Path::new(".")).display()
    );

    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    Ok(())
}
