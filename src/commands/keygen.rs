//! Payer keypair generation.

use std::path::{Path, PathBuf};

use crate::config::SolatranConfig;
use crate::ledger::Keypair;

/// Generates a keypair and stores it as a 64-byte JSON array.
///
/// Writes to `output`, or to the configured keypair path.
///
/// # Errors
/// - If the target file exists and `force` is not set
/// - If the file cannot be written
pub fn handle_keygen(
    config: &SolatranConfig,
    output: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<()> {
    let path = match output {
        Some(path) => path,
        None => config.ledger.resolved_keypair_path()?,
    };

    replace_guard(&path, force)?;

    let keypair = Keypair::generate();
    keypair.save(&path)?;
    let address = keypair.address();
    tracing::info!("Generated keypair {} at {}", address, path.display());

    println!("Public key: {address}");
    println!("Secret key saved to {}", path.display());
    if config.ledger.rpc_url.contains("devnet") {
        println!(
            "Fund it on devnet with: solana airdrop 1 {address} --url {}",
            config.ledger.rpc_url
        );
    }
    Ok(())
}

fn replace_guard(path: &Path, force: bool) -> anyhow::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Pass --force to overwrite it (the old key is lost).",
            path.display()
        ));
    }
    tracing::warn!("Overwriting keypair at {}", path.display());
    std::fs::remove_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to remove {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_keypair_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keypair.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(replace_guard(&path, false).is_err());
        assert!(path.exists());
        replace_guard(&path, true).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn keygen_writes_loadable_keypair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("keypair.json");
        let config = SolatranConfig::from_toml(include_str!("../../environments/solatran.toml"))
            .unwrap();

        handle_keygen(&config, Some(path.clone()), false).unwrap();
        let loaded = Keypair::load(&path).unwrap();
        assert_eq!(loaded.to_bytes().len(), 64);

        assert!(handle_keygen(&config, Some(path.clone()), false).is_err());
        handle_keygen(&config, Some(path.clone()), true).unwrap();
        assert_ne!(Keypair::load(&path).unwrap().address(), loaded.address());
    }
}
