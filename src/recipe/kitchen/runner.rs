// src/recipe/kitchen/runner.rs

//! External process invocation
//!
//! Every toolchain and VCS call made by a recipe goes through
//! [`ProcessRunner`], so argument derivation can be tested against a fake
//! while real process execution is exercised separately.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use tracing::debug;

/// A fully specified process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-like rendering for logs
    ///
    /// Arguments that are empty or hold whitespace, quotes or backslashes
    /// are double-quoted with escapes.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|a| {
            let needs_quotes = a.is_empty()
                || a.chars()
                    .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
            if needs_quotes {
                format!("{:?}", a)
            } else {
                a.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Capability to run an external program to completion
///
/// Implementations block until the process exits; no timeout is applied.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput>;
}

/// Runs processes on the host with [`std::process::Command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput> {
        // Resolve through PATH up front so a missing tool reports its name
        let program = which::which(&spec.program).map_err(|e| Error::ProcessSpawn {
            program: spec.program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        })?;

        debug!("Running: {} (in {})", spec.command_line(), spec.cwd.display());

        let output = Command::new(&program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .output()
            .map_err(|e| Error::ProcessSpawn {
                program: spec.program.clone(),
                source: e,
            })?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

type Hook = Box<dyn Fn(&ProcessSpec) -> std::io::Result<()> + Send + Sync>;

/// Fake runner that records invocations and replays scripted results
///
/// Calls beyond the scripted queue succeed with empty output. An optional
/// hook runs for every call, e.g. to drop fake build artifacts on disk.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<ProcessSpec>>,
    outcomes: Mutex<VecDeque<ProcessOutput>>,
    hook: Option<Hook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next unscripted call
    pub fn push_outcome(&self, output: ProcessOutput) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(output);
        }
    }

    /// Queue an exit status for the next call
    pub fn push_status(&self, status: i32) {
        self.push_outcome(ProcessOutput {
            status: Some(status),
            ..Default::default()
        });
    }

    /// Run `hook` for every invocation before producing its result
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ProcessSpec) -> std::io::Result<()> + Send + Sync + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Every invocation seen so far, in order
    pub fn calls(&self) -> Vec<ProcessSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }
        let output = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut o| o.pop_front())
            .unwrap_or(ProcessOutput {
                status: Some(0),
                ..Default::default()
            });
        if output.success()
            && let Some(hook) = &self.hook
        {
            hook(spec)?;
        }
        Ok(output)
    }
}
