// tests/lifecycle.rs

//! Full lifecycle tests: Source, Build, Package and Package-Info driven by
//! the Kitchen against a fake toolchain.

mod common;

use common::{fake_checkout, fake_cmake, kitchen, kitchen_with, linux_release, psm_package};
use larder::recipe::{protocol_session_base, AbstractBase, KitchenConfig, LocalSource};
use larder::{Error, Recipe, ToolchainStep};
use std::fs;
use std::path::PathBuf;

#[test]
fn test_cook_protocol_session_from_local_checkout() {
    let (_src, checkout) = fake_checkout();
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let deps = vec![psm_package(work.path())];

    let runner = fake_cmake(&["src/libprotocol_session.a"]);
    let kitchen = kitchen(&work.path().join("scratch"), runner.clone());
    let recipe = protocol_session_base()
        .unwrap()
        .with_source(LocalSource::new(&checkout));

    let result = kitchen
        .cook(&recipe, &linux_release(), &deps, out.path())
        .unwrap();

    assert!(!result.from_cache);
    assert_eq!(result.interface.libs, vec!["protocol_session"]);
    assert!(result.package_dir.starts_with(out.path().join("ProtocolSession/0.1.4")));
    assert_eq!(
        result.files,
        vec![
            PathBuf::from("include/protocol_session/Connection.hpp"),
            PathBuf::from("include/protocol_session/ProtocolSession.hpp"),
            PathBuf::from("include/protocol_session/detail/Session.cpp"),
            PathBuf::from("include/protocol_session/detail/buying/Buying.hpp"),
            PathBuf::from("lib/libprotocol_session.a"),
        ]
    );
    assert!(result.package_dir.join("package_info.json").exists());
    assert!(result.log.contains("=== configure ==="));
    assert!(result.log.contains("=== compile ==="));

    // Configure against the source root, then compile, both in the build dir
    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].program, "cmake");
    assert!(calls[0].args[0].ends_with("repo/sources"));
    assert!(calls[0].args.contains(&"-DCMAKE_BUILD_TYPE=Release".to_string()));
    assert!(calls[0]
        .args
        .contains(&format!("-DCMAKE_PREFIX_PATH={}", deps[0].root.display())));
    assert_eq!(calls[1].args, vec!["--build", "."]);
    assert_eq!(calls[0].cwd, calls[1].cwd);

    // Scratch space is gone
    assert!(!calls[0].cwd.exists());
    assert!(result.build_dir.is_none());
}

#[test]
fn test_keep_builddir_keeps_generated_buildinfo() {
    let (_src, checkout) = fake_checkout();
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let deps = vec![psm_package(work.path())];

    let config = KitchenConfig {
        keep_builddir: true,
        ..KitchenConfig::with_work_root(&work.path().join("scratch"))
    };
    let kitchen = kitchen_with(config, fake_cmake(&["libprotocol_session.a"]));
    let recipe = protocol_session_base()
        .unwrap()
        .with_source(LocalSource::new(&checkout));

    let result = kitchen
        .cook(&recipe, &linux_release(), &deps, out.path())
        .unwrap();

    let kept = result.build_dir.unwrap();
    let buildinfo = fs::read_to_string(kept.join("build/buildinfo.cmake")).unwrap();
    assert!(buildinfo.contains("set(LARDER_LIBS protocol_statemachine)"));
    assert!(kept.join("tree/repo/sources/CMakeLists.txt").exists());
    assert!(!kept.join("tree/repo/.git").exists());
}

#[test]
fn test_configure_failure_skips_compile() {
    let (_src, checkout) = fake_checkout();
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let deps = vec![psm_package(work.path())];

    let runner = fake_cmake(&["libprotocol_session.a"]);
    runner.push_status(1);
    let kitchen = kitchen(&work.path().join("scratch"), runner.clone());
    let recipe = protocol_session_base()
        .unwrap()
        .with_source(LocalSource::new(&checkout));

    let err = kitchen
        .cook(&recipe, &linux_release(), &deps, out.path())
        .unwrap_err();

    match err {
        Error::ToolchainInvocationFailed { step, status, .. } => {
            assert_eq!(step, ToolchainStep::Configure);
            assert_eq!(status, Some(1));
        }
        other => panic!("expected ToolchainInvocationFailed, got {:?}", other),
    }
    assert_eq!(runner.calls().len(), 1);
    assert!(!out.path().join("ProtocolSession").exists());
}

#[test]
fn test_compile_failure_reports_compile_step() {
    let (_src, checkout) = fake_checkout();
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let deps = vec![psm_package(work.path())];

    let runner = fake_cmake(&["libprotocol_session.a"]);
    runner.push_status(0);
    runner.push_status(2);
    let kitchen = kitchen(&work.path().join("scratch"), runner.clone());
    let recipe = protocol_session_base()
        .unwrap()
        .with_source(LocalSource::new(&checkout));

    let err = kitchen
        .cook(&recipe, &linux_release(), &deps, out.path())
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(matches!(
        err,
        Error::ToolchainInvocationFailed {
            step: ToolchainStep::Compile,
            status: Some(2),
            ..
        }
    ));
    assert_eq!(runner.calls().len(), 2);
}

#[test]
fn test_abstract_base_fails_without_side_effects() {
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let deps = vec![psm_package(work.path())];
    let scratch = work.path().join("scratch");

    let runner = fake_cmake(&[]);
    let kitchen = kitchen(&scratch, runner.clone());
    let base = protocol_session_base().unwrap();
    let source = AbstractBase::for_manifest(base.manifest());
    let recipe = base.with_source(source);

    let err = kitchen
        .cook(&recipe, &linux_release(), &deps, out.path())
        .unwrap_err();

    match err {
        Error::AbstractBaseInvoked { package } => assert_eq!(package, "ProtocolSession/0.1.4"),
        other => panic!("expected AbstractBaseInvoked, got {:?}", other),
    }
    assert!(runner.calls().is_empty());
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_build_file_runs_nothing() {
    let (_src, checkout) = fake_checkout();
    fs::remove_file(checkout.join("sources/CMakeLists.txt")).unwrap();
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let deps = vec![psm_package(work.path())];

    let runner = fake_cmake(&[]);
    let kitchen = kitchen(&work.path().join("scratch"), runner.clone());
    let recipe = protocol_session_base()
        .unwrap()
        .with_source(LocalSource::new(&checkout));

    let err = kitchen
        .cook(&recipe, &linux_release(), &deps, out.path())
        .unwrap_err();

    match err {
        Error::MissingBuildFile(path) => assert!(path.ends_with("repo/sources/CMakeLists.txt")),
        other => panic!("expected MissingBuildFile, got {:?}", other),
    }
    assert!(runner.calls().is_empty());
}

#[test]
fn test_unresolved_dependency_checked_before_source() {
    let work = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let runner = fake_cmake(&[]);
    let kitchen = kitchen(&work.path().join("scratch"), runner.clone());
    // The source would fail too; resolution must come first
    let recipe = protocol_session_base()
        .unwrap()
        .with_source(LocalSource::new(work.path().join("missing")));

    let err = kitchen
        .cook(&recipe, &linux_release(), &[], out.path())
        .unwrap_err();

    assert!(
        matches!(err, Error::UnresolvedDependency(ref r) if r == common::PSM_REF),
        "got {:?}",
        err
    );
    assert!(runner.calls().is_empty());
}
