// src/recipe/kitchen/source.rs

//! Source stage providers
//!
//! Every provider populates `<tree>/repo`, the checkout directory the
//! recipe layout paths are relative to.

use crate::error::{Error, Result};
use crate::recipe::format::RecipeManifest;
use crate::recipe::kitchen::runner::{ProcessRunner, ProcessSpec};
use crate::recipe::lifecycle::{SourceProvider, WorkingTree};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Checkout directory inside the working tree
pub const CHECKOUT_DIR: &str = "repo";

/// Clone a git repository into the working tree
#[derive(Debug, Clone)]
pub struct GitSource {
    pub url: String,
    /// Branch, tag or commit to check out after cloning
    pub rev: Option<String>,
    pub git_program: String,
}

impl GitSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            rev: None,
            git_program: "git".to_string(),
        }
    }

    pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }

    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    /// Clone from the first locator the manifest declares
    pub fn from_manifest(manifest: &RecipeManifest) -> Result<Self> {
        let url = manifest
            .package
            .source_locators()
            .first()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                Error::SourceFetchFailed(format!(
                    "{} declares no repository locator",
                    manifest.package.display_name()
                ))
            })?;
        Ok(Self::new(url))
    }

    fn git(&self, runner: &dyn ProcessRunner, spec: ProcessSpec, what: &str) -> Result<()> {
        let output = runner
            .run(&spec)
            .map_err(|e| Error::SourceFetchFailed(format!("{}: {}", what, e)))?;
        if !output.success() {
            return Err(Error::SourceFetchFailed(format!(
                "{} ({}): {}",
                what,
                spec.command_line(),
                output.stderr.trim()
            )));
        }
        Ok(())
    }
}

impl SourceProvider for GitSource {
    fn source(&self, tree: &WorkingTree, runner: &dyn ProcessRunner) -> Result<()> {
        fs::create_dir_all(tree.root())?;
        info!("Cloning {}", self.url);

        let clone = ProcessSpec::new(&self.git_program, tree.root())
            .args(["clone", self.url.as_str(), CHECKOUT_DIR]);
        self.git(runner, clone, "git clone failed")?;

        if let Some(rev) = &self.rev {
            debug!("Checking out {}", rev);
            let checkout = ProcessSpec::new(&self.git_program, &tree.join(CHECKOUT_DIR))
                .args(["checkout", rev.as_str()]);
            self.git(runner, checkout, "git checkout failed")?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.rev {
            Some(rev) => format!("git {} @ {}", self.url, rev),
            None => format!("git {}", self.url),
        }
    }
}

/// Copy an existing local checkout into the working tree
#[derive(Debug, Clone)]
pub struct LocalSource {
    pub path: PathBuf,
}

impl LocalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceProvider for LocalSource {
    fn source(&self, tree: &WorkingTree, _runner: &dyn ProcessRunner) -> Result<()> {
        if !self.path.is_dir() {
            return Err(Error::SourceFetchFailed(format!(
                "source directory not found: {}",
                self.path.display()
            )));
        }

        let dest = tree.join(CHECKOUT_DIR);
        let copied = copy_tree(&self.path, &dest)?;
        info!(
            "Copied {} file(s) from {} into working tree",
            copied,
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local {}", self.path.display())
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut count = 0;
    let walker = WalkDir::new(from)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        let target = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            count += 1;
        }
    }
    Ok(count)
}

/// Source stage of a base recipe
///
/// Always fails with [`Error::AbstractBaseInvoked`] and never touches the
/// working tree. Used when a manifest marked `abstract` is cooked without
/// a concrete source.
#[derive(Debug, Clone)]
pub struct AbstractBase {
    pub package: String,
}

impl AbstractBase {
    pub fn for_manifest(manifest: &RecipeManifest) -> Self {
        Self {
            package: manifest.package.display_name(),
        }
    }
}

impl SourceProvider for AbstractBase {
    fn source(&self, _tree: &WorkingTree, _runner: &dyn ProcessRunner) -> Result<()> {
        Err(Error::AbstractBaseInvoked {
            package: self.package.clone(),
        })
    }

    fn describe(&self) -> String {
        format!("abstract base {}", self.package)
    }
}
