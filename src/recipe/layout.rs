// src/recipe/layout.rs

//! Package layout and exported interface
//!
//! A built package is a directory with two well-known subdirectories:
//! - `include/` holding headers (and template definitions) at their
//!   original relative paths
//! - `lib/` holding static archives, flat
//!
//! plus `package_info.json`, written by the kitchen, describing the
//! exported interface for downstream consumers.

use crate::error::{Error, Result};
use crate::recipe::format::PackageInfoSection;
use crate::recipe::reference::PackageReference;
use crate::recipe::settings::BuildSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recognized static-library archive extensions
pub const ARCHIVE_EXTENSIONS: [&str; 2] = ["a", "lib"];

/// File name of the persisted package metadata
pub const PACKAGE_INFO_FILE: &str = "package_info.json";

/// Map an archive file name to the link name consumers pass to the linker
///
/// `libfoo.a` → `foo`, `foo.a` → `foo`, `foo.lib` → `foo`. Returns `None`
/// for files that are not recognized archives.
pub fn link_name(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || !ARCHIVE_EXTENSIONS.contains(&ext) {
        return None;
    }
    let name = if ext == "a" {
        stem.strip_prefix("lib").filter(|s| !s.is_empty()).unwrap_or(stem)
    } else {
        stem
    };
    Some(name.to_string())
}

/// The set of link libraries a package exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedInterface {
    pub libs: Vec<String>,
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
}

impl From<&PackageInfoSection> for ExportedInterface {
    fn from(section: &PackageInfoSection) -> Self {
        Self {
            libs: section.libs.clone(),
            include_dirs: section.include_dirs.clone(),
            lib_dirs: section.lib_dirs.clone(),
        }
    }
}

/// Metadata persisted next to a built package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// `name/version`
    pub name: String,
    pub package_id: String,
    pub settings: BuildSettings,
    #[serde(default)]
    pub requires: Vec<PackageReference>,
    pub interface: ExportedInterface,
}

/// Output directory structure of the Package stage
#[derive(Debug, Clone)]
pub struct PackageLayout {
    root: PathBuf,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    pub fn info_path(&self) -> PathBuf {
        self.root.join(PACKAGE_INFO_FILE)
    }

    /// Archive file names in `lib/`, sorted
    pub fn archives(&self) -> Result<Vec<String>> {
        let lib_dir = self.lib_dir();
        if !lib_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&lib_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if link_name(&name).is_some() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Link names provided by the archives in `lib/`
    pub fn link_names(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .archives()?
            .iter()
            .filter_map(|a| link_name(a))
            .collect())
    }

    /// Every file in the package, relative to the root, sorted
    ///
    /// The persisted package metadata is not part of the layout proper.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if !self.root.is_dir() {
            return Ok(files);
        }
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::Io(std::io::Error::other(e)))?;
            if rel == Path::new(PACKAGE_INFO_FILE) {
                continue;
            }
            files.push(rel.to_path_buf());
        }
        Ok(files)
    }

    pub fn write_info(&self, info: &PackageInfo) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(info)?;
        fs::write(self.info_path(), json)?;
        Ok(())
    }

    /// Read persisted metadata, `None` if the package was never completed
    pub fn read_info(&self) -> Result<Option<PackageInfo>> {
        let path = self.info_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// Check that declared libraries are exactly the archives in `lib/`
pub fn verify_exports(layout: &PackageLayout, interface: &ExportedInterface) -> Result<()> {
    let declared: BTreeSet<String> = interface.libs.iter().cloned().collect();
    let produced = layout.link_names()?;

    if declared != produced {
        return Err(Error::PackagingMismatch {
            declared: declared.into_iter().collect(),
            produced: produced.into_iter().collect(),
        });
    }
    Ok(())
}
