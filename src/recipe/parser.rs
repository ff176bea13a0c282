// src/recipe/parser.rs

//! Recipe manifest parsing

use crate::error::{Error, Result};
use crate::recipe::format::{CopyRoot, RecipeManifest};
use std::collections::HashSet;
use std::path::{Component, Path};

/// Parse a recipe manifest from a TOML string
pub fn parse_recipe(content: &str) -> Result<RecipeManifest> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe manifest from a file
pub fn parse_recipe_file(path: &Path) -> Result<RecipeManifest> {
    let content = std::fs::read_to_string(path)?;
    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors make the recipe unusable; the returned strings are warnings
/// an operator should see but that do not prevent a build.
pub fn validate_recipe(recipe: &RecipeManifest) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ParseError("Recipe package name cannot be empty".to_string()));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ParseError("Recipe package version cannot be empty".to_string()));
    }

    if recipe.package_info.libs.is_empty() {
        return Err(Error::ParseError(
            "package_info.libs must declare at least one library".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for lib in &recipe.package_info.libs {
        if lib.is_empty() || lib.contains(['/', '\\', '.']) {
            return Err(Error::ParseError(format!(
                "Invalid library name '{}': expected a bare link name",
                lib
            )));
        }
        if !seen.insert(lib.as_str()) {
            return Err(Error::ParseError(format!("Duplicate library name '{}'", lib)));
        }
    }

    for rel in [&recipe.layout.source_root, &recipe.layout.include_root] {
        check_relative(rel)?;
    }

    let rules = recipe.copy_rules();
    for rule in rules.iter() {
        glob::Pattern::new(&rule.pattern).map_err(|e| {
            Error::ParseError(format!("Invalid copy pattern '{}': {}", rule.pattern, e))
        })?;
        check_relative(&rule.src)?;
        check_relative(&rule.dst)?;
    }

    let mut schema = HashSet::new();
    for axis in &recipe.settings {
        if !schema.insert(axis) {
            warnings.push(format!("Settings axis '{}' declared twice", axis));
        }
    }

    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if !recipe.is_abstract && recipe.package.source_locators().is_empty() {
        warnings.push("No source repository locator (repo_https_url/repo_ssh_url)".to_string());
    }
    if !rules.iter().any(|r| r.from == CopyRoot::Build && !r.keep_path) {
        warnings.push("No copy rule collects archives from the build directory".to_string());
    }

    Ok(warnings)
}

/// Reject absolute paths and `..` escapes in manifest paths
fn check_relative(path: &str) -> Result<()> {
    let p = Path::new(path);
    let escapes = p
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::ParseError(format!(
            "Path '{}' must be relative and stay inside its root",
            path
        )));
    }
    Ok(())
}
