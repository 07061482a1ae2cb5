//! Runs the OAuth login server and the transfer dispatcher.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{data_dir, SolatranConfig};
use crate::dispatch::{Dispatcher, ProcessedMessages};
use crate::ledger::{Keypair, RpcLedgerClient};
use crate::oauth::{MemorySessionStore, TokenClient};
use crate::server::{self, AppState};
use crate::social::HttpSocialApi;

/// Starts the HTTP server on `server.bind`.
///
/// A missing or unreadable payer keypair does not stop the server; transfers are
/// disabled and every callback says so.
///
/// # Errors
/// - If the OAuth client id or redirect URI is not configured
/// - If the HTTP client or processed-message database cannot be set up
/// - If the listen address cannot be bound
pub async fn handle_serve(config: &SolatranConfig) -> anyhow::Result<()> {
    if config.oauth.client_id.trim().is_empty() {
        return Err(anyhow::anyhow!(
            "No OAuth client id configured. Set oauth.client_id in the config file or SOLATRAN_CLIENT_ID."
        ));
    }
    if config.oauth.redirect_uri.trim().is_empty() {
        return Err(anyhow::anyhow!(
            "No OAuth redirect URI configured. Set oauth.redirect_uri or SOLATRAN_REDIRECT_URI."
        ));
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()?;

    let payer = load_payer(config);
    let processed = ProcessedMessages::open(&data_dir()?)?;
    let dispatcher = Dispatcher::new(
        Arc::new(HttpSocialApi::new(client.clone(), &config.api)),
        Arc::new(RpcLedgerClient::new(client.clone(), config.ledger.rpc_url.clone())),
        payer,
        processed,
        config.api.command_prefix.clone(),
    );
    if !dispatcher.is_enabled() {
        eprintln!("Warning: no payer keypair loaded, transfers are disabled (see 'solatran logs').");
    }

    let state = AppState {
        oauth: Arc::new(config.oauth.clone()),
        sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(
            config.server.session_ttl_secs,
        ))),
        token_client: TokenClient::new(client, &config.oauth),
        dispatcher: Arc::new(dispatcher),
        secure_cookie: config.server.secure_cookie,
    };

    server::serve(&config.server.bind, state).await
}

fn load_payer(config: &SolatranConfig) -> Option<Keypair> {
    let path = match config.ledger.resolved_keypair_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("Transfers disabled: {e}");
            return None;
        }
    };

    match Keypair::load(&path) {
        Ok(keypair) => {
            tracing::info!("Payer address: {}", keypair.address());
            Some(keypair)
        }
        Err(e) => {
            tracing::error!(
                "Transfers disabled: {e}. Run 'solatran keygen' or set SOLATRAN_KEYPAIR."
            );
            None
        }
    }
}
