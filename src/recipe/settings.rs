// src/recipe/settings.rs

//! Host-supplied build settings
//!
//! Settings describe the binary configuration a package is built for. A
//! recipe declares which axes it consumes (its settings schema); the host
//! supplies the values. Recipes never validate the values beyond parsing,
//! and never sample the environment themselves: whatever reaches the Build
//! stage is exactly what the host put in [`BuildSettings`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Os {
    Linux,
    Macos,
    Windows,
    #[serde(rename = "FreeBSD")]
    FreeBsd,
}

impl Os {
    pub const ALL: [Os; 4] = [Os::Linux, Os::Macos, Os::Windows, Os::FreeBsd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::Macos => "Macos",
            Self::Windows => "Windows",
            Self::FreeBsd => "FreeBSD",
        }
    }

    /// The operating system this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "freebsd") {
            Self::FreeBsd
        } else {
            Self::Linux
        }
    }
}

/// Compiler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compiler {
    #[serde(rename = "gcc")]
    Gcc,
    #[serde(rename = "clang")]
    Clang,
    #[serde(rename = "apple-clang")]
    AppleClang,
    #[serde(rename = "Visual Studio")]
    VisualStudio,
}

impl Compiler {
    pub const ALL: [Compiler; 4] = [
        Compiler::Gcc,
        Compiler::Clang,
        Compiler::AppleClang,
        Compiler::VisualStudio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
            Self::VisualStudio => "Visual Studio",
        }
    }

    /// Conventional compiler for an operating system
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Linux => Self::Gcc,
            Os::Macos => Self::AppleClang,
            Os::Windows => Self::VisualStudio,
            Os::FreeBsd => Self::Clang,
        }
    }
}

/// Build configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub const ALL: [BuildType; 4] = [
        BuildType::Debug,
        BuildType::Release,
        BuildType::RelWithDebInfo,
        BuildType::MinSizeRel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "armv7")]
    Armv7,
    #[serde(rename = "armv8")]
    Armv8,
}

impl Arch {
    pub const ALL: [Arch; 4] = [Arch::X86, Arch::X86_64, Arch::Armv7, Arch::Armv8];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Armv7 => "armv7",
            Self::Armv8 => "armv8",
        }
    }

    /// The architecture this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_arch = "x86") {
            Self::X86
        } else if cfg!(target_arch = "aarch64") {
            Self::Armv8
        } else if cfg!(target_arch = "arm") {
            Self::Armv7
        } else {
            Self::X86_64
        }
    }
}

macro_rules! impl_setting_value {
    ($ty:ident, $axis:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        Error::InvalidSetting(format!(
                            "'{}' is not a valid {} (expected one of: {})",
                            s,
                            $axis,
                            allowed.join(", ")
                        ))
                    })
            }
        }
    };
}

impl_setting_value!(Os, "os");
impl_setting_value!(Compiler, "compiler");
impl_setting_value!(BuildType, "build_type");
impl_setting_value!(Arch, "arch");

/// One axis of the settings schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingAxis {
    Os,
    Compiler,
    BuildType,
    Arch,
}

impl SettingAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Os => "os",
            Self::Compiler => "compiler",
            Self::BuildType => "build_type",
            Self::Arch => "arch",
        }
    }
}

impl fmt::Display for SettingAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full schema used when a recipe does not declare one
pub fn default_schema() -> Vec<SettingAxis> {
    vec![
        SettingAxis::Os,
        SettingAxis::Compiler,
        SettingAxis::BuildType,
        SettingAxis::Arch,
    ]
}

/// Settings supplied by the host for one package build
///
/// Read-only input to the Build stage. Unset axes are simply absent from
/// derived toolchain arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub os: Option<Os>,
    pub compiler: Option<Compiler>,
    /// Compiler version, e.g. `9` or `14`
    pub compiler_version: Option<String>,
    pub build_type: Option<BuildType>,
    pub arch: Option<Arch>,
}

impl BuildSettings {
    /// Settings describing the machine this binary runs on, Release build
    pub fn detect_host() -> Self {
        let os = Os::current();
        Self {
            os: Some(os),
            compiler: Some(Compiler::default_for(os)),
            compiler_version: None,
            build_type: Some(BuildType::Release),
            arch: Some(Arch::current()),
        }
    }

    /// Set one axis from its textual key and value
    ///
    /// Keys are `os`, `compiler`, `compiler.version`, `build_type`, `arch`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key.trim() {
            "os" => self.os = Some(value.parse()?),
            "compiler" => self.compiler = Some(value.parse()?),
            "compiler.version" | "compiler_version" => {
                let v = value.trim();
                if v.is_empty() {
                    return Err(Error::InvalidSetting("empty compiler.version".to_string()));
                }
                self.compiler_version = Some(v.to_string());
            }
            "build_type" => self.build_type = Some(value.parse()?),
            "arch" => self.arch = Some(value.parse()?),
            other => {
                return Err(Error::InvalidSetting(format!(
                    "unknown settings axis '{}'",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Apply a `key=value` assignment as given on the command line
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            Error::InvalidSetting(format!("expected key=value, got '{}'", assignment))
        })?;
        self.set(key, value)
    }

    /// Overlay every axis that is set in `other`
    pub fn merge(&mut self, other: &BuildSettings) {
        if other.os.is_some() {
            self.os = other.os;
        }
        if other.compiler.is_some() {
            self.compiler = other.compiler;
        }
        if other.compiler_version.is_some() {
            self.compiler_version = other.compiler_version.clone();
        }
        if other.build_type.is_some() {
            self.build_type = other.build_type;
        }
        if other.arch.is_some() {
            self.arch = other.arch;
        }
    }

    /// Keep only the axes a recipe declares
    pub fn restrict(&self, schema: &[SettingAxis]) -> BuildSettings {
        let has = |axis: SettingAxis| schema.contains(&axis);
        BuildSettings {
            os: self.os.filter(|_| has(SettingAxis::Os)),
            compiler: self.compiler.filter(|_| has(SettingAxis::Compiler)),
            compiler_version: self
                .compiler_version
                .clone()
                .filter(|_| has(SettingAxis::Compiler)),
            build_type: self.build_type.filter(|_| has(SettingAxis::BuildType)),
            arch: self.arch.filter(|_| has(SettingAxis::Arch)),
        }
    }

    /// Sorted `key=value` pairs of every set axis
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(arch) = self.arch {
            entries.push(("arch", arch.to_string()));
        }
        if let Some(bt) = self.build_type {
            entries.push(("build_type", bt.to_string()));
        }
        if let Some(compiler) = self.compiler {
            entries.push(("compiler", compiler.to_string()));
        }
        if let Some(version) = &self.compiler_version {
            entries.push(("compiler.version", version.clone()));
        }
        if let Some(os) = self.os {
            entries.push(("os", os.to_string()));
        }
        entries
    }
}

impl fmt::Display for BuildSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
