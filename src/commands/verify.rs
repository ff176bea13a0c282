// src/commands/verify.rs

//! Verify command - check a cooked package's exported libraries

use anyhow::{anyhow, Context, Result};
use larder::recipe::{verify_exports, PackageLayout};
use std::path::Path;

/// Check that `package_info.json` declares exactly the archives in `lib/`
pub fn cmd_verify(package_dir: &str) -> Result<()> {
    let layout = PackageLayout::new(Path::new(package_dir));
    let info = layout
        .read_info()
        .with_context(|| format!("Failed to read package info in {}", package_dir))?
        .ok_or_else(|| anyhow!("{} has no package_info.json", package_dir))?;

    println!("Verifying {} ({})", info.name, info.package_id);

    let archives = layout.archives()?;
    for archive in &archives {
        println!("  - lib/{}", archive);
    }

    verify_exports(&layout, &info.interface)
        .with_context(|| format!("Package {} is inconsistent", info.name))?;

    println!(
        "[OK] {} library(ies) match {} archive(s)",
        info.interface.libs.len(),
        archives.len()
    );
    Ok(())
}
