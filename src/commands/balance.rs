//! Balance lookup for the payer (or any) address.

use std::time::Duration;

use crate::config::SolatranConfig;
use crate::ledger::{format_sol, Address, Keypair, LedgerClient, RpcLedgerClient};

/// Prints the balance of `address`, or of the configured payer keypair.
///
/// # Errors
/// - If the address is not valid base58
/// - If the keypair cannot be loaded
/// - If the ledger RPC call fails
pub async fn handle_balance(
    config: &SolatranConfig,
    address: Option<String>,
) -> anyhow::Result<()> {
    let address = match address {
        Some(address) => address
            .parse::<Address>()
            .map_err(|e| anyhow::anyhow!("Invalid address '{address}': {e}"))?,
        None => {
            let path = config.ledger.resolved_keypair_path()?;
            Keypair::load(&path)?.address()
        }
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()?;
    let ledger = RpcLedgerClient::new(client, config.ledger.rpc_url.clone());

    let lamports = ledger.balance(&address).await?;
    tracing::info!("Balance of {}: {} lamports", address, lamports);

    println!("Public key: {address}");
    println!("Balance: {} SOL ({lamports} lamports)", format_sol(lamports));
    Ok(())
}
