//! HTTP front end: the login redirect and the OAuth callback.

mod error;
pub mod routes;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::config::OAuthConfig;
use crate::dispatch::Dispatcher;
use crate::oauth::{SessionStore, TokenClient};

/// Shared state injected into both handlers.
#[derive(Clone)]
pub struct AppState {
    pub oauth: Arc<OAuthConfig>,
    pub sessions: Arc<dyn SessionStore>,
    pub token_client: TokenClient,
    pub dispatcher: Arc<Dispatcher>,
    pub secure_cookie: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::login))
        .route("/callback", get(routes::callback))
        .with_state(state)
}

/// Binds `bind` and serves until Ctrl+C.
///
/// # Errors
/// - If the address cannot be bound
/// - If the server fails while running
pub async fn serve(bind: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{addr}");
    println!("Listening on http://{addr} (Ctrl+C to stop)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
