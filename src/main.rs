mod app;
mod commands;
mod config;
mod dispatch;
mod ledger;
mod logging;
mod oauth;
mod server;
mod setup;
mod social;
mod subtitle;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
