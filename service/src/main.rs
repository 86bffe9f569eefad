#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::sync::Arc;

use ledgerline_accounts::{
    accounts::{account_indexes, AccountRepo, DocumentAccountRepo, Ed25519Codec, ACCOUNT_COLLECTION},
    config::{Config, LoggingConfig},
    db::open_collection,
};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::new(&config.level));
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load and validate configuration first (fail-fast)
    let config = Config::load().map_err(|e| anyhow::anyhow!("{e}"))?;

    init_logging(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.store.backend,
        "ledgerline-accounts starting up"
    );

    let collection = open_collection(&config.store, ACCOUNT_COLLECTION, account_indexes()).await?;
    let repo = DocumentAccountRepo::new(collection, Arc::new(Ed25519Codec));

    let accounts = repo.list_accounts().await?;
    tracing::info!(
        collection = ACCOUNT_COLLECTION,
        count = accounts.len(),
        "account store ready"
    );

    Ok(())
}
