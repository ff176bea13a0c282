// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use crate::error::{Error, Result};
use crate::recipe::layout::ExportedInterface;
use crate::recipe::settings::BuildSettings;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Parent directory for per-cook scratch directories
    pub work_root: PathBuf,
    /// CMake executable
    pub cmake_program: String,
    /// Git executable
    pub git_program: String,
    /// Keep working tree and build directory after completion (for debugging)
    pub keep_builddir: bool,
    /// Fail the cook when declared libraries disagree with the packaged
    /// archives
    pub verify_exports: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let work_root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("larder");

        Self {
            work_root,
            cmake_program: "cmake".to_string(),
            git_program: "git".to_string(),
            keep_builddir: false,
            verify_exports: false,
        }
    }
}

impl KitchenConfig {
    /// Default configuration with scratch space under `work_root`
    pub fn with_work_root(work_root: &Path) -> Self {
        Self {
            work_root: work_root.to_path_buf(),
            ..Self::default()
        }
    }
}

/// Settings profile file
///
/// ```toml
/// [settings]
/// os = "Linux"
/// compiler = "gcc"
/// compiler_version = 9
/// build_type = "Release"
/// arch = "x86_64"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    /// Axis values; numbers are taken as their decimal text
    #[serde(default)]
    pub settings: BTreeMap<String, toml::Value>,
}

impl Profile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Failed to parse profile: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Overlay this profile onto `base`
    pub fn apply(&self, base: &mut BuildSettings) -> Result<()> {
        for (key, value) in &self.settings {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    return Err(Error::InvalidSetting(format!(
                        "{}: expected a string or number, got {}",
                        key,
                        other.type_str()
                    )));
                }
            };
            base.set(key, &value)?;
        }
        Ok(())
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// Package root holding `include/`, `lib/` and `package_info.json`
    pub package_dir: PathBuf,
    pub package_id: String,
    pub interface: ExportedInterface,
    /// Packaged files relative to `package_dir`, sorted
    pub files: Vec<PathBuf>,
    /// Build log
    pub log: String,
    /// Whether an existing package was reused instead of building
    pub from_cache: bool,
    /// Scratch directory, when kept
    pub build_dir: Option<PathBuf>,
}
