// src/recipe/format.rs

//! Recipe manifest format definitions
//!
//! A recipe manifest is a TOML file declaring a package's identity, the
//! settings axes it consumes, the packages it requires, and how its build
//! outputs are assembled into a package. The manifest is pure data: it is
//! read once and never mutated while the stages run.

use crate::recipe::reference::PackageReference;
use crate::recipe::settings::{default_schema, BuildSettings, SettingAxis};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Cow;

/// A complete recipe manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeManifest {
    /// Base recipes cannot be built directly; a concrete recipe must
    /// provide the Source stage
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,

    /// Settings axes this recipe consumes
    #[serde(default = "default_schema")]
    pub settings: Vec<SettingAxis>,

    /// Packages this recipe requires, resolved by the host before Build
    #[serde(default)]
    pub requires: Vec<PackageReference>,

    /// Files the host generates into the build directory before Build
    #[serde(default)]
    pub generators: Vec<Generator>,

    /// When the host should build this package from source
    #[serde(default)]
    pub build_policy: BuildPolicy,

    /// Package identity
    pub package: PackageIdentity,

    /// Working tree layout
    #[serde(default)]
    pub layout: LayoutSection,

    /// Package stage copy rules; empty means [`default_copy_rules`] for
    /// the layout's include root
    #[serde(default)]
    pub copy: Vec<CopyRule>,

    /// Interface exported to downstream consumers
    pub package_info: PackageInfoSection,
}

impl RecipeManifest {
    /// Stable identifier of the binary package built with `settings`
    ///
    /// Hashes the identity, the schema-filtered settings and the declared
    /// requires. Axes outside the schema do not influence the id.
    pub fn package_id(&self, settings: &BuildSettings) -> String {
        let mut data = String::new();

        data.push_str(&format!(
            "name:{}\nversion:{}\n",
            self.package.name, self.package.version
        ));

        for (key, value) in settings.restrict(&self.settings).entries() {
            data.push_str(&format!("setting:{}={}\n", key, value));
        }

        // Order of requires is significant for resolution, keep it
        for req in &self.requires {
            data.push_str(&format!("requires:{}\n", req));
        }

        hex::encode(Sha256::digest(data.as_bytes()))
    }

    /// Copy rules the Package stage applies
    pub fn copy_rules(&self) -> Cow<'_, [CopyRule]> {
        if self.copy.is_empty() {
            Cow::Owned(default_copy_rules(&self.layout.include_root))
        } else {
            Cow::Borrowed(&self.copy)
        }
    }
}

/// Static package identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIdentity {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// License statement
    #[serde(default)]
    pub license: Option<String>,

    /// Project homepage or repository URL
    #[serde(default)]
    pub url: Option<String>,

    /// SSH clone URL of the source repository
    #[serde(default)]
    pub repo_ssh_url: Option<String>,

    /// HTTPS clone URL of the source repository
    #[serde(default)]
    pub repo_https_url: Option<String>,
}

impl PackageIdentity {
    /// `name/version`
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// Repository locators, HTTPS first
    pub fn source_locators(&self) -> Vec<&str> {
        [&self.repo_https_url, &self.repo_ssh_url]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .collect()
    }
}

/// Host-side file generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generator {
    /// `buildinfo.cmake` describing resolved dependencies
    Cmake,
}

/// When to build from source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildPolicy {
    /// Build only if no package with a matching id exists
    #[default]
    Missing,
    /// Always rebuild
    Always,
    /// Never build; a matching package must already exist
    Never,
}

impl BuildPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Always => "always",
            Self::Never => "never",
        }
    }
}

/// Where sources live inside the working tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSection {
    /// Directory holding the root `CMakeLists.txt`, relative to the tree
    #[serde(default = "default_source_root")]
    pub source_root: String,

    /// Public header root, relative to the tree
    #[serde(default = "default_include_root")]
    pub include_root: String,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            include_root: default_include_root(),
        }
    }
}

fn default_source_root() -> String {
    "repo/sources".to_string()
}

fn default_include_root() -> String {
    "repo/sources/include".to_string()
}

/// Which directory a copy rule reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyRoot {
    /// The working tree
    Source,
    /// The build output directory
    Build,
}

/// A single Package stage copy rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    /// Glob matched against paths relative to `src` (`*` crosses `/`)
    pub pattern: String,

    /// Directory the rule reads from
    pub from: CopyRoot,

    /// Subdirectory of the root to search (empty = the root itself)
    #[serde(default)]
    pub src: String,

    /// Destination directory inside the package
    pub dst: String,

    /// Preserve relative paths (`true`) or flatten to file names (`false`)
    #[serde(default = "default_keep_path")]
    pub keep_path: bool,
}

impl CopyRule {
    pub fn new(pattern: &str, from: CopyRoot, src: &str, dst: &str, keep_path: bool) -> Self {
        Self {
            pattern: pattern.to_string(),
            from,
            src: src.to_string(),
            dst: dst.to_string(),
            keep_path,
        }
    }
}

fn default_keep_path() -> bool {
    true
}

/// Headers and template definitions from `include_root`, static archives
/// from the build directory
pub fn default_copy_rules(include_root: &str) -> Vec<CopyRule> {
    vec![
        CopyRule::new("*.hpp", CopyRoot::Source, include_root, "include", true),
        // Template definitions ship next to their declarations
        CopyRule::new("*.cpp", CopyRoot::Source, include_root, "include", true),
        CopyRule::new("*.a", CopyRoot::Build, "", "lib", false),
        CopyRule::new("*.lib", CopyRoot::Build, "", "lib", false),
    ]
}

/// Exported interface declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfoSection {
    /// Link library names (no prefix, no extension)
    pub libs: Vec<String>,

    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<String>,

    #[serde(default = "default_lib_dirs")]
    pub lib_dirs: Vec<String>,
}

fn default_include_dirs() -> Vec<String> {
    vec!["include".to_string()]
}

fn default_lib_dirs() -> Vec<String> {
    vec!["lib".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::settings::{Arch, BuildType, Compiler, Os};

    fn manifest() -> RecipeManifest {
        toml::from_str(
            r#"
requires = ["Dep/1.0@team/stable"]
settings = ["os", "arch"]

[package]
name = "Lib"
version = "1.0"
repo_ssh_url = "git@example.com:lib.git"
repo_https_url = "https://example.com/lib.git"

[package_info]
libs = ["lib"]
"#,
        )
        .unwrap()
    }

    fn settings() -> BuildSettings {
        BuildSettings {
            os: Some(Os::Linux),
            compiler: Some(Compiler::Gcc),
            compiler_version: Some("9".to_string()),
            build_type: Some(BuildType::Release),
            arch: Some(Arch::X86_64),
        }
    }

    #[test]
    fn test_defaults() {
        let m = manifest();
        assert!(!m.is_abstract);
        assert_eq!(m.build_policy, BuildPolicy::Missing);
        assert_eq!(m.layout.source_root, "repo/sources");
        assert!(m.copy.is_empty());
        assert_eq!(&*m.copy_rules(), default_copy_rules("repo/sources/include"));
        assert_eq!(m.package_info.include_dirs, vec!["include"]);
        assert_eq!(m.package_info.lib_dirs, vec!["lib"]);
    }

    #[test]
    fn test_source_locators_https_first() {
        let m = manifest();
        assert_eq!(
            m.package.source_locators(),
            vec!["https://example.com/lib.git", "git@example.com:lib.git"]
        );
    }

    #[test]
    fn test_package_id_deterministic() {
        let m = manifest();
        assert_eq!(m.package_id(&settings()), m.package_id(&settings()));
        assert_eq!(m.package_id(&settings()).len(), 64);
    }

    #[test]
    fn test_package_id_ignores_undeclared_axes() {
        let m = manifest();
        let mut other = settings();
        other.build_type = Some(BuildType::Debug);
        other.compiler = Some(Compiler::Clang);
        assert_eq!(m.package_id(&settings()), m.package_id(&other));

        other.arch = Some(Arch::X86);
        assert_ne!(m.package_id(&settings()), m.package_id(&other));
    }

    #[test]
    fn test_default_copy_rules_follow_include_root() {
        let mut m = manifest();
        m.layout.include_root = "repo/src/headers".to_string();

        let rules = m.copy_rules();
        let sources: Vec<&str> = rules
            .iter()
            .filter(|r| r.from == CopyRoot::Source)
            .map(|r| r.src.as_str())
            .collect();
        assert_eq!(sources, vec!["repo/src/headers", "repo/src/headers"]);

        // Explicit rules win over the layout
        m.copy = vec![CopyRule::new("*.h", CopyRoot::Source, "inc", "include", true)];
        assert_eq!(m.copy_rules().len(), 1);
        assert_eq!(m.copy_rules()[0].src, "inc");
    }
}
