// src/commands/mod.rs
//! Command handlers for the larder CLI

mod cook;
mod inspect;
mod verify;

pub use cook::cmd_cook;
pub use inspect::cmd_inspect;
pub use verify::cmd_verify;

use anyhow::{Context, Result};
use larder::recipe::Profile;
use larder::BuildSettings;
use std::path::Path;

/// Host settings, overlaid with the profile, then with `axis=value` overrides
pub(crate) fn resolve_settings(profile: Option<&str>, overrides: &[String]) -> Result<BuildSettings> {
    let mut settings = BuildSettings::detect_host();

    if let Some(path) = profile {
        let profile = Profile::load(Path::new(path))
            .with_context(|| format!("Failed to load profile: {}", path))?;
        profile
            .apply(&mut settings)
            .with_context(|| format!("Invalid setting in profile {}", path))?;
    }

    for assignment in overrides {
        settings
            .apply_assignment(assignment)
            .with_context(|| format!("Invalid setting override: {}", assignment))?;
    }

    Ok(settings)
}
