// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cook {
            recipe,
            source,
            git,
            rev,
            profile,
            settings,
            deps,
            output,
            work_dir,
            keep_builddir,
            verify,
        } => commands::cmd_cook(
            &recipe,
            source.as_deref(),
            git,
            rev.as_deref(),
            profile.as_deref(),
            &settings,
            &deps,
            &output,
            work_dir.as_deref(),
            keep_builddir,
            verify,
        ),

        Commands::Inspect {
            recipe,
            profile,
            settings,
        } => commands::cmd_inspect(&recipe, profile.as_deref(), &settings),

        Commands::Verify { package_dir } => commands::cmd_verify(&package_dir),

        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "larder",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
