use std::sync::Arc;
use std::time::{Duration, Instant};

use bson::doc;
use mongodb::{options::ClientOptions, Client, Database};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{StoreBackend, StoreConfig};
use crate::store::{
    mongo::IndexSpec, DocumentCollection, MemoryCollection, MongoCollection, StoreError,
};

/// Connect to MongoDB and verify the server answers a ping.
///
/// Retries with exponential backoff until `retry_deadline_secs` elapses, so a
/// database that starts alongside the process is waited for.
///
/// # Errors
///
/// Returns a [`StoreError`] if the URI cannot be parsed or the server stays
/// unreachable past the deadline.
pub async fn connect_mongo(config: &StoreConfig) -> Result<Database, StoreError> {
    let retry_deadline = Duration::from_secs(config.retry_deadline_secs);
    let max_interval = Duration::from_secs(30); // cap single waits
    let mut delay = Duration::from_millis(500);
    let start = Instant::now();

    let mut options = ClientOptions::parse(&config.uri).await?;
    let timeout = Duration::from_millis(config.connect_timeout_ms);
    options.server_selection_timeout = Some(timeout);
    options.connect_timeout = Some(timeout);
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

    let client = Client::with_options(options)?;
    let database = client.database(&config.database);

    loop {
        info!(database = %config.database, "Attempting to connect to MongoDB...");

        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(err) => {
                if start.elapsed() >= retry_deadline {
                    warn!(error = %err, "MongoDB not ready; retries exhausted");
                    return Err(err.into());
                }

                warn!(error = %err, "MongoDB not ready yet; retrying");
                sleep(delay).await;
                delay = (delay.saturating_mul(2)).min(max_interval);
            }
        }
    }

    info!(database = %config.database, "Connected to MongoDB");
    Ok(database)
}

/// Open a named collection on the configured backend.
///
/// `indexes` only apply to the Mongo backend.
///
/// # Errors
///
/// Returns a [`StoreError`] if the Mongo backend cannot connect or create
/// its indexes.
pub async fn open_collection(
    config: &StoreConfig,
    name: &str,
    indexes: Vec<IndexSpec>,
) -> Result<Arc<dyn DocumentCollection>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            info!(collection = name, "Using in-memory collection");
            Ok(Arc::new(MemoryCollection::new(name)))
        }
        StoreBackend::Mongo => {
            let database = connect_mongo(config).await?;
            let collection = MongoCollection::open(&database, name, indexes).await?;
            Ok(Arc::new(collection))
        }
    }
}
