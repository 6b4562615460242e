//! Impact ledger host — entry point.
//!
//! Loads the donation ledger and impact registry from SQLite, then exposes
//! them through a small Axum REST API. Invocations are decoded from on-wire
//! literals, executed one at a time, and committed before the next runs.

mod api;
mod config;
mod db;
mod decode;
mod errors;
mod host;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use host::LedgerHost;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load optional .env file (ignored if missing) before RUST_LOG is read.
    let _ = dotenvy::dotenv();

    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    if config.owner.is_none() {
        warn!("LEDGER_OWNER not set — any caller may release donations");
    }

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;
    let host = LedgerHost::open(pool, config.release_policy()).await?;

    let app = api::router(Arc::new(api::ApiState { host }));

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
