// src/cli.rs
//! CLI definitions for larder
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "larder")]
#[command(author = "Larder Contributors")]
#[command(version)]
#[command(about = "Build native library packages from recipes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cook a package: source, build, package, package info
    Cook {
        /// Path to the recipe manifest (.toml)
        recipe: String,

        /// Use a local checkout instead of cloning
        #[arg(long, conflicts_with = "git")]
        source: Option<String>,

        /// Clone the recipe's declared repository
        #[arg(long)]
        git: bool,

        /// Revision to check out after cloning
        #[arg(long, requires = "git")]
        rev: Option<String>,

        /// Settings profile file
        #[arg(short, long)]
        profile: Option<String>,

        /// Override a setting (axis=value), repeatable
        #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE")]
        settings: Vec<String>,

        /// Resolve a requirement to a cooked package directory (NAME=DIR)
        #[arg(long = "dep", value_name = "NAME=DIR")]
        deps: Vec<String>,

        /// Output directory for packages
        #[arg(short, long, default_value = ".")]
        output: String,

        /// Directory for scratch working trees (default: user cache dir)
        #[arg(long)]
        work_dir: Option<String>,

        /// Keep the working tree and build directory after completion
        #[arg(long)]
        keep_builddir: bool,

        /// Fail if packaged archives disagree with the declared libraries
        #[arg(long)]
        verify: bool,
    },

    /// Show a recipe's identity, requirements and package id
    Inspect {
        /// Path to the recipe manifest (.toml)
        recipe: String,

        /// Settings profile file
        #[arg(short, long)]
        profile: Option<String>,

        /// Override a setting (axis=value), repeatable
        #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE")]
        settings: Vec<String>,
    },

    /// Check a cooked package against its declared libraries
    Verify {
        /// Package directory containing package_info.json
        package_dir: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
