//! Setup module for initial application configuration.
//!
//! Writes the default config file on first run and keeps its version line
//! current on upgrades.

pub mod version;

use std::path::Path;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/solatran.toml");

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Checks whether setup is needed for `config_path` and runs it.
///
/// 1. Missing config file: writes the default template
/// 2. Older (or unversioned) config: rewrites only the version line, leaving
///    the user's settings and credentials untouched
/// 3. Current config: does nothing
///
/// # Errors
/// - If the config file cannot be read or written
pub fn ensure_config(config_path: &Path) -> anyhow::Result<()> {
    if !config_path.exists() {
        tracing::info!("Writing default config to {}", config_path.display());
        write_default_config(config_path)?;
        println!(
            "Created {}. Fill in the [oauth] section (or set SOLATRAN_CLIENT_ID / SOLATRAN_CLIENT_SECRET) before running 'solatran serve'.",
            config_path.display()
        );
        return Ok(());
    }

    match version::check_setup_needed(config_path)? {
        Some(old_version) => {
            tracing::info!(
                "Migrating config from version {} to {}",
                old_version,
                CURRENT_VERSION
            );
            version::update_config_version(config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow::anyhow!("Failed to update config version: {e}")
            })?;
        }
        None => {
            tracing::debug!("Config version up to date ({})", CURRENT_VERSION);
        }
    }
    Ok(())
}

/// Writes the default template prefixed with the version line.
///
/// # Errors
/// - If the parent directory cannot be created
/// - If the file cannot be written
fn write_default_config(config_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let full_config = format!(r#"config_version = "{CURRENT_VERSION}""#) + "\n" + DEFAULT_CONFIG;
    std::fs::write(config_path, full_config)?;
    Ok(())
}
