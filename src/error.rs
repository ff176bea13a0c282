// src/error.rs
//! Error types for the recipe lifecycle

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two toolchain invocations of the Build stage failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainStep {
    /// Configuration/generation against the source root
    Configure,
    /// Build/compile in the build directory
    Compile,
}

impl ToolchainStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Compile => "compile",
        }
    }
}

impl fmt::Display for ToolchainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by recipe stages and the kitchen driving them
#[derive(Error, Debug)]
pub enum Error {
    /// The Source stage of a base recipe was invoked
    #[error("{package} is an abstract base recipe and cannot be built directly")]
    AbstractBaseInvoked { package: String },

    /// A toolchain process exited unsuccessfully
    #[error("{step} step failed with {}\nstderr: {stderr}", describe_status(.status))]
    ToolchainInvocationFailed {
        step: ToolchainStep,
        status: Option<i32>,
        stderr: String,
    },

    /// Declared link libraries diverge from the archives in `lib/`
    #[error("package info declares {declared:?} but lib/ provides {produced:?}")]
    PackagingMismatch {
        declared: Vec<String>,
        produced: Vec<String>,
    },

    /// The working tree has no build configuration file
    #[error("build configuration not found: {}", .0.display())]
    MissingBuildFile(PathBuf),

    /// A declared requirement was not resolved by the host
    #[error("unresolved dependency: {0}")]
    UnresolvedDependency(String),

    /// Source acquisition failed
    #[error("source fetch failed: {0}")]
    SourceFetchFailed(String),

    /// Two different files flatten onto the same package path
    #[error("conflicting artifacts for {name}")]
    ArtifactConflict { name: String },

    /// An external program could not be started
    #[error("failed to start {program}: {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A stage was requested before the stage it depends on completed
    #[error("cannot run {requested} stage before {required} stage")]
    StageOrder {
        requested: &'static str,
        required: &'static str,
    },

    /// Build policy forbids building and no package exists
    #[error("no prebuilt package for {0} and build policy is 'never'")]
    PackageMissing(String),

    /// Recipe or profile could not be parsed or failed validation
    #[error("parse error: {0}")]
    ParseError(String),

    /// Malformed `name/version@user/channel` reference
    #[error("invalid package reference: {0}")]
    InvalidReference(String),

    /// Unknown settings axis or value
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Whether the host may retry the whole package build
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ToolchainInvocationFailed { .. } | Self::SourceFetchFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_failure_message() {
        let err = Error::ToolchainInvocationFailed {
            step: ToolchainStep::Configure,
            status: Some(1),
            stderr: "CMake Error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configure step failed"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("CMake Error"));
    }

    #[test]
    fn test_signal_status_message() {
        let err = Error::ToolchainInvocationFailed {
            step: ToolchainStep::Compile,
            status: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_abstract_base_not_retryable() {
        let err = Error::AbstractBaseInvoked {
            package: "ProtocolSession/0.1.4".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("ProtocolSession/0.1.4"));
    }
}
