// src/recipe/kitchen/cook.rs

//! Cook: stage execution for a single package build

use crate::error::{Error, Result};
use crate::recipe::layout::{ExportedInterface, PackageLayout};
use crate::recipe::lifecycle::{
    BuildContext, Recipe, ResolvedDependency, SourceProvider, Stage, WorkingTree,
};
use crate::recipe::settings::BuildSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};
use tracing::{debug, info};

use super::generator::write_generators;
use super::Kitchen;

/// A single cook operation
///
/// Owns a scratch directory holding the working tree (`tree/`) and the
/// build output directory (`build/`). Stages must run in lifecycle order;
/// asking for a stage whose predecessor has not completed fails with
/// [`Error::StageOrder`].
pub(crate) struct Cook<'a, R> {
    kitchen: &'a Kitchen,
    recipe: &'a R,
    settings: BuildSettings,
    deps: &'a [ResolvedDependency],
    scratch: TempDir,
    tree: WorkingTree,
    build_dir: PathBuf,
    completed: Option<Stage>,
    /// Build log accumulator
    log: String,
}

impl<'a, R: Recipe + SourceProvider> Cook<'a, R> {
    pub(super) fn new(
        kitchen: &'a Kitchen,
        recipe: &'a R,
        settings: BuildSettings,
        deps: &'a [ResolvedDependency],
    ) -> Result<Self> {
        fs::create_dir_all(&kitchen.config.work_root)?;
        let scratch = Builder::new()
            .prefix("cook-")
            .tempdir_in(&kitchen.config.work_root)?;

        // The tree is left for the Source stage to create
        let tree = WorkingTree::new(scratch.path().join("tree"));
        let build_dir = scratch.path().join("build");
        debug!("Scratch directory: {}", scratch.path().display());

        Ok(Self {
            kitchen,
            recipe,
            settings,
            deps,
            scratch,
            tree,
            build_dir,
            completed: None,
            log: String::new(),
        })
    }

    pub fn tree(&self) -> &WorkingTree {
        &self.tree
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    fn require(&self, stage: Stage) -> Result<()> {
        if let Some(required) = stage.previous()
            && self.completed.is_none_or(|done| done < required)
        {
            return Err(Error::StageOrder {
                requested: stage.as_str(),
                required: required.as_str(),
            });
        }
        Ok(())
    }

    fn complete(&mut self, stage: Stage) {
        if self.completed.is_none_or(|done| done < stage) {
            self.completed = Some(stage);
        }
    }

    /// Stage 1: populate the working tree
    pub fn source(&mut self) -> Result<()> {
        self.require(Stage::Source)?;
        let provider = self.recipe.describe();
        info!("Source: {}", provider);

        self.recipe
            .source(&self.tree, self.kitchen.runner.as_ref())?;

        self.log_line(&format!("=== {} ===", Stage::Source));
        self.log_line(&format!("Fetched sources from {}", provider));
        self.complete(Stage::Source);
        Ok(())
    }

    /// Stage 2: configure and compile into the build directory
    pub fn build(&mut self) -> Result<()> {
        self.require(Stage::Build)?;
        let manifest = self.recipe.manifest();

        for path in write_generators(manifest, &self.build_dir, self.deps)? {
            self.log_line(&format!("Generated {}", path.display()));
        }

        let ctx = BuildContext {
            tree: &self.tree,
            build_dir: &self.build_dir,
            settings: &self.settings,
            deps: self.deps,
            runner: self.kitchen.runner.as_ref(),
            cmake_program: &self.kitchen.config.cmake_program,
        };

        match self.recipe.build(&ctx) {
            Ok(records) => {
                for record in records {
                    self.log_line(&format!("$ {}", record.command));
                    self.log_build_output(
                        record.step.as_str(),
                        &record.output.stdout,
                        &record.output.stderr,
                    );
                }
            }
            Err(e) => {
                if let Error::ToolchainInvocationFailed { step, stderr, .. } = &e {
                    let header = format!("{} (failed)", step);
                    self.log_build_output(&header, "", stderr);
                }
                return Err(e);
            }
        }

        self.complete(Stage::Build);
        Ok(())
    }

    /// Stage 3: assemble the package layout
    pub fn package(&mut self, layout: &PackageLayout) -> Result<Vec<PathBuf>> {
        self.require(Stage::Package)?;
        fs::create_dir_all(layout.root())?;

        let files = self
            .recipe
            .package(&self.tree, &self.build_dir, layout)?;

        self.log_line(&format!("=== {} ===", Stage::Package));
        for file in &files {
            self.log_line(&file.to_string_lossy());
        }
        self.complete(Stage::Package);
        Ok(files)
    }

    /// Stage 4: the exported interface
    pub fn package_info(&mut self) -> Result<ExportedInterface> {
        self.require(Stage::PackageInfo)?;
        let interface = self.recipe.package_info();
        self.log_line(&format!("=== {} ===", Stage::PackageInfo));
        self.log_line(&format!("libs: {}", interface.libs.join(", ")));
        self.complete(Stage::PackageInfo);
        Ok(interface)
    }

    /// Consume the cook, returning the log and the scratch path if kept
    pub fn finish(self, keep: bool) -> (String, Option<PathBuf>) {
        let kept = if keep {
            let path = self.scratch.keep();
            info!("Keeping build directory: {}", path.display());
            Some(path)
        } else {
            None
        };
        (self.log, kept)
    }

    fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Log build step output (stdout/stderr) with a step header
    fn log_build_output(&mut self, step: &str, stdout: &str, stderr: &str) {
        self.log_line(&format!("=== {} ===", step));
        if !stdout.is_empty() {
            self.log.push_str(stdout);
            self.log.push('\n');
        }
        if !stderr.is_empty() {
            self.log.push_str(stderr);
            self.log.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::cmake::protocol_session_base;
    use crate::recipe::kitchen::config::KitchenConfig;
    use crate::recipe::kitchen::runner::RecordingRunner;
    use crate::recipe::kitchen::source::LocalSource;
    use std::sync::Arc;

    #[test]
    fn test_stages_must_run_in_order() {
        let work = tempfile::tempdir().unwrap();
        let kitchen = Kitchen::with_runner(
            KitchenConfig::with_work_root(work.path()),
            Arc::new(RecordingRunner::new()),
        );
        let recipe = protocol_session_base()
            .unwrap()
            .with_source(LocalSource::new(work.path().join("src")));
        let mut cook = Cook::new(&kitchen, &recipe, BuildSettings::default(), &[]).unwrap();

        match cook.build() {
            Err(Error::StageOrder { requested, required }) => {
                assert_eq!(requested, "build");
                assert_eq!(required, "source");
            }
            other => panic!("expected StageOrder, got {:?}", other.err()),
        }
        assert!(matches!(
            cook.package_info(),
            Err(Error::StageOrder { .. })
        ));
    }

    #[test]
    fn test_scratch_removed_unless_kept() {
        let work = tempfile::tempdir().unwrap();
        let kitchen = Kitchen::with_runner(
            KitchenConfig::with_work_root(work.path()),
            Arc::new(RecordingRunner::new()),
        );
        let recipe = protocol_session_base()
            .unwrap()
            .with_source(LocalSource::new(work.path().join("src")));

        let cook = Cook::new(&kitchen, &recipe, BuildSettings::default(), &[]).unwrap();
        let scratch = cook.build_dir().parent().unwrap().to_path_buf();
        let (_, kept) = cook.finish(false);
        assert!(kept.is_none());
        assert!(!scratch.exists());

        let cook = Cook::new(&kitchen, &recipe, BuildSettings::default(), &[]).unwrap();
        let (_, kept) = cook.finish(true);
        let kept = kept.unwrap();
        assert!(kept.exists());
        assert!(kept.starts_with(work.path()));
    }
}
