// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: settings override
fn setting_arg() -> Arg {
    Arg::new("setting")
        .short('s')
        .long("setting")
        .value_name("AXIS=VALUE")
        .action(clap::ArgAction::Append)
        .help("Override a setting (axis=value), repeatable")
}

/// Common argument: settings profile
fn profile_arg() -> Arg {
    Arg::new("profile")
        .short('p')
        .long("profile")
        .value_name("PATH")
        .help("Settings profile file")
}

fn build_cli() -> Command {
    Command::new("larder")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Larder Contributors")
        .about("Build native library packages from recipes")
        .subcommand_required(true)
        .subcommand(
            Command::new("cook")
                .about("Cook a package: source, build, package, package info")
                .arg(Arg::new("recipe").required(true).help("Path to the recipe manifest"))
                .arg(
                    Arg::new("source")
                        .long("source")
                        .value_name("DIR")
                        .help("Use a local checkout instead of cloning"),
                )
                .arg(
                    Arg::new("git")
                        .long("git")
                        .action(clap::ArgAction::SetTrue)
                        .help("Clone the recipe's declared repository"),
                )
                .arg(Arg::new("rev").long("rev").help("Revision to check out after cloning"))
                .arg(profile_arg())
                .arg(setting_arg())
                .arg(
                    Arg::new("dep")
                        .long("dep")
                        .value_name("NAME=DIR")
                        .action(clap::ArgAction::Append)
                        .help("Resolve a requirement to a cooked package directory"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .default_value(".")
                        .help("Output directory for packages"),
                )
                .arg(
                    Arg::new("work_dir")
                        .long("work-dir")
                        .help("Directory for scratch working trees"),
                )
                .arg(
                    Arg::new("keep_builddir")
                        .long("keep-builddir")
                        .action(clap::ArgAction::SetTrue)
                        .help("Keep the working tree and build directory"),
                )
                .arg(
                    Arg::new("verify")
                        .long("verify")
                        .action(clap::ArgAction::SetTrue)
                        .help("Fail if packaged archives disagree with the declared libraries"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show a recipe's identity, requirements and package id")
                .arg(Arg::new("recipe").required(true).help("Path to the recipe manifest"))
                .arg(profile_arg())
                .arg(setting_arg()),
        )
        .subcommand(
            Command::new("verify")
                .about("Check a cooked package against its declared libraries")
                .arg(Arg::new("package_dir").required(true).help("Package directory")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("larder.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
