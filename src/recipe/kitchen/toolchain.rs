// src/recipe/kitchen/toolchain.rs

//! CMake argument derivation
//!
//! Maps [`BuildSettings`] (plus the install prefixes of resolved
//! dependencies) to the arguments of the two CMake invocations made by the
//! Build stage. The mapping is a pure function: the same inputs always give
//! byte-identical arguments, which the package id relies on.

use crate::recipe::settings::{Arch, BuildSettings, Compiler, Os};
use std::path::{Path, PathBuf};

/// Arguments for one configure + build pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmakeInvocation {
    pub generator: String,
    /// `-D` cache definitions, in emission order
    pub definitions: Vec<(String, String)>,
    /// Extra arguments for `cmake --build .`
    pub build_config: Vec<String>,
}

impl CmakeInvocation {
    /// Derive the invocation for `settings`
    ///
    /// `prefix_paths` are dependency package roots in declared order.
    pub fn derive(settings: &BuildSettings, prefix_paths: &[PathBuf]) -> Self {
        let generator = generator_for(settings);
        let multi_config = is_multi_config(&generator);
        let msvc = settings.compiler == Some(Compiler::VisualStudio);
        let mut definitions = Vec::new();

        if let Some(bt) = settings.build_type
            && !multi_config
        {
            definitions.push(("CMAKE_BUILD_TYPE".to_string(), bt.to_string()));
        }

        if let Some(compiler) = settings.compiler {
            definitions.push(("LARDER_COMPILER".to_string(), compiler.to_string()));
        }
        if let Some(version) = &settings.compiler_version {
            definitions.push(("LARDER_COMPILER_VERSION".to_string(), version.clone()));
        }

        if !msvc && let Some(flag) = settings.arch.and_then(width_flag) {
            definitions.push(("CMAKE_C_FLAGS".to_string(), flag.to_string()));
            definitions.push(("CMAKE_CXX_FLAGS".to_string(), flag.to_string()));
            definitions.push(("CMAKE_SHARED_LINKER_FLAGS".to_string(), flag.to_string()));
        }

        if settings.os == Some(Os::Macos)
            && let Some(arch) = settings.arch.and_then(osx_architecture)
        {
            definitions.push(("CMAKE_OSX_ARCHITECTURES".to_string(), arch.to_string()));
        }

        if !prefix_paths.is_empty() {
            let joined: Vec<String> = prefix_paths
                .iter()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .collect();
            definitions.push(("CMAKE_PREFIX_PATH".to_string(), joined.join(";")));
        }

        let build_config = match settings.build_type {
            Some(bt) if multi_config => vec!["--config".to_string(), bt.to_string()],
            _ => Vec::new(),
        };

        Self {
            generator,
            definitions,
            build_config,
        }
    }

    /// `cmake <source_dir> -G <generator> -D...`
    pub fn configure_args(&self, source_dir: &Path) -> Vec<String> {
        let mut args = vec![
            source_dir.to_string_lossy().to_string(),
            "-G".to_string(),
            self.generator.clone(),
        ];
        args.extend(
            self.definitions
                .iter()
                .map(|(k, v)| format!("-D{}={}", k, v)),
        );
        args
    }

    /// `cmake --build . [--config <bt>]`
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["--build".to_string(), ".".to_string()];
        args.extend(self.build_config.iter().cloned());
        args
    }
}

/// CMake generator for the given settings
pub fn generator_for(settings: &BuildSettings) -> String {
    match (settings.compiler, settings.os) {
        (Some(Compiler::VisualStudio), _) => {
            let base = match settings.compiler_version.as_deref() {
                Some("12") => "Visual Studio 12 2013",
                Some("14") => "Visual Studio 14 2015",
                Some("16") => "Visual Studio 16 2019",
                Some("17") => "Visual Studio 17 2022",
                _ => "Visual Studio 15 2017",
            };
            // Pre-2019 generators encode the platform in the name
            let legacy = !matches!(settings.compiler_version.as_deref(), Some("16") | Some("17"));
            if legacy && settings.arch == Some(Arch::X86_64) {
                format!("{} Win64", base)
            } else {
                base.to_string()
            }
        }
        (Some(Compiler::Gcc), Some(Os::Windows)) => "MinGW Makefiles".to_string(),
        _ => "Unix Makefiles".to_string(),
    }
}

/// Multi-config generators select the build type at build time
pub fn is_multi_config(generator: &str) -> bool {
    generator.starts_with("Visual Studio") || generator == "Xcode"
}

fn width_flag(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X86 => Some("-m32"),
        Arch::X86_64 => Some("-m64"),
        Arch::Armv7 | Arch::Armv8 => None,
    }
}

fn osx_architecture(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X86 => Some("i386"),
        Arch::X86_64 => Some("x86_64"),
        Arch::Armv8 => Some("arm64"),
        Arch::Armv7 => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::settings::BuildType;

    fn settings(os: Os, compiler: Compiler, version: &str, arch: Arch) -> BuildSettings {
        BuildSettings {
            os: Some(os),
            compiler: Some(compiler),
            compiler_version: Some(version.to_string()),
            build_type: Some(BuildType::Release),
            arch: Some(arch),
        }
    }

    #[test]
    fn test_linux_gcc() {
        let inv = CmakeInvocation::derive(
            &settings(Os::Linux, Compiler::Gcc, "9", Arch::X86_64),
            &[],
        );
        assert_eq!(inv.generator, "Unix Makefiles");
        assert_eq!(
            inv.configure_args(Path::new("/w/repo/sources")),
            vec![
                "/w/repo/sources",
                "-G",
                "Unix Makefiles",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DLARDER_COMPILER=gcc",
                "-DLARDER_COMPILER_VERSION=9",
                "-DCMAKE_C_FLAGS=-m64",
                "-DCMAKE_CXX_FLAGS=-m64",
                "-DCMAKE_SHARED_LINKER_FLAGS=-m64",
            ]
        );
        assert_eq!(inv.build_args(), vec!["--build", "."]);
    }

    #[test]
    fn test_visual_studio_multi_config() {
        let inv = CmakeInvocation::derive(
            &settings(Os::Windows, Compiler::VisualStudio, "14", Arch::X86_64),
            &[],
        );
        assert_eq!(inv.generator, "Visual Studio 14 2015 Win64");
        assert!(!inv.definitions.iter().any(|(k, _)| k == "CMAKE_BUILD_TYPE"));
        assert!(!inv.definitions.iter().any(|(k, _)| k == "CMAKE_CXX_FLAGS"));
        assert_eq!(inv.build_args(), vec!["--build", ".", "--config", "Release"]);
    }

    #[test]
    fn test_modern_visual_studio_has_no_platform_suffix() {
        let s = settings(Os::Windows, Compiler::VisualStudio, "17", Arch::X86_64);
        assert_eq!(generator_for(&s), "Visual Studio 17 2022");
    }

    #[test]
    fn test_mingw_and_macos() {
        let s = settings(Os::Windows, Compiler::Gcc, "8", Arch::X86);
        assert_eq!(generator_for(&s), "MinGW Makefiles");

        let inv = CmakeInvocation::derive(
            &settings(Os::Macos, Compiler::AppleClang, "12", Arch::Armv8),
            &[],
        );
        assert!(inv
            .definitions
            .contains(&("CMAKE_OSX_ARCHITECTURES".to_string(), "arm64".to_string())));
        assert!(!inv.definitions.iter().any(|(k, _)| k == "CMAKE_C_FLAGS"));
    }

    #[test]
    fn test_prefix_paths_keep_order() {
        let inv = CmakeInvocation::derive(
            &BuildSettings::default(),
            &[PathBuf::from("/p/b"), PathBuf::from("/p/a")],
        );
        assert_eq!(
            inv.definitions,
            vec![("CMAKE_PREFIX_PATH".to_string(), "/p/b;/p/a".to_string())]
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        for os in Os::ALL {
            for compiler in Compiler::ALL {
                for arch in Arch::ALL {
                    let s = settings(os, compiler, "15", arch);
                    let a = CmakeInvocation::derive(&s, &[PathBuf::from("/dep")]);
                    let b = CmakeInvocation::derive(&s.clone(), &[PathBuf::from("/dep")]);
                    assert_eq!(
                        a.configure_args(Path::new("src")),
                        b.configure_args(Path::new("src"))
                    );
                    assert_eq!(a.build_args(), b.build_args());
                }
            }
        }
    }
}
