// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use larder::recipe::kitchen::{ProcessRunner, RecordingRunner};
use larder::recipe::{
    protocol_session_base, BuildPolicy, CmakeLibraryRecipe, ExportedInterface, Kitchen,
    KitchenConfig, PackageInfo, PackageLayout, ResolvedDependency,
};
use larder::{BuildSettings, Recipe};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const PSM_REF: &str = "ProtocolStateMachine/0.1.2@joystream/stable";

/// Headers and template definitions of the fake checkout, relative to the
/// include root
pub const HEADERS: &[&str] = &[
    "protocol_session/ProtocolSession.hpp",
    "protocol_session/Connection.hpp",
    "protocol_session/detail/Session.cpp",
    "protocol_session/detail/buying/Buying.hpp",
];

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A source checkout laid out like protocol_session-cpp
///
/// Returns (TempDir, checkout root) - keep the TempDir alive to prevent cleanup.
pub fn fake_checkout() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("protocol_session-cpp");

    write(&root, "sources/CMakeLists.txt", "project(protocol_session CXX)\n");
    write(&root, "sources/src/Session.cpp", "// implementation, not exported\n");
    write(&root, "sources/include/README.md", "not a header\n");
    for header in HEADERS {
        write(
            &root,
            &format!("sources/include/{}", header),
            &format!("// {}\n", header),
        );
    }
    write(&root, ".git/HEAD", "ref: refs/heads/master\n");

    (dir, root)
}

/// Fake CMake: the compile step drops `archives` (paths relative to the
/// build directory) on disk
pub fn fake_cmake(archives: &[&str]) -> Arc<RecordingRunner> {
    let archives: Vec<String> = archives.iter().map(|s| s.to_string()).collect();
    Arc::new(RecordingRunner::new().with_hook(move |spec| {
        if spec.args.first().map(String::as_str) == Some("--build") {
            for archive in &archives {
                let path = spec.cwd.join(archive);
                fs::create_dir_all(path.parent().unwrap())?;
                fs::write(path, format!("!<arch>\n{}\n", archive))?;
            }
        }
        Ok(())
    }))
}

pub fn kitchen(work_root: &Path, runner: Arc<RecordingRunner>) -> Kitchen {
    kitchen_with(KitchenConfig::with_work_root(work_root), runner)
}

pub fn kitchen_with(config: KitchenConfig, runner: Arc<RecordingRunner>) -> Kitchen {
    let runner: Arc<dyn ProcessRunner> = runner;
    Kitchen::with_runner(config, runner)
}

pub fn linux_release() -> BuildSettings {
    let mut settings = BuildSettings::default();
    for assignment in [
        "os=Linux",
        "compiler=gcc",
        "compiler.version=9",
        "build_type=Release",
        "arch=x86_64",
    ] {
        settings.apply_assignment(assignment).unwrap();
    }
    settings
}

/// A cooked ProtocolStateMachine package on disk
pub fn psm_package(root: &Path) -> ResolvedDependency {
    let dir = root.join("ProtocolStateMachine");
    let layout = PackageLayout::new(&dir);
    write(&dir, "include/protocol_statemachine/StateMachine.hpp", "//\n");
    write(&dir, "lib/libprotocol_statemachine.a", "!<arch>\n");

    let interface = ExportedInterface {
        libs: vec!["protocol_statemachine".to_string()],
        include_dirs: vec!["include".to_string()],
        lib_dirs: vec!["lib".to_string()],
    };
    layout
        .write_info(&PackageInfo {
            name: "ProtocolStateMachine/0.1.2".to_string(),
            package_id: "0".repeat(64),
            settings: linux_release(),
            requires: Vec::new(),
            interface,
        })
        .unwrap();

    Kitchen::load_dependency(&PSM_REF.parse().unwrap(), &dir).unwrap()
}

/// The shipped base recipe with a different build policy and exports
pub fn recipe_with(policy: BuildPolicy, libs: &[&str]) -> CmakeLibraryRecipe {
    let mut manifest = protocol_session_base().unwrap().manifest().clone();
    manifest.build_policy = policy;
    manifest.package_info.libs = libs.iter().map(|s| s.to_string()).collect();
    CmakeLibraryRecipe::new(manifest).unwrap()
}
