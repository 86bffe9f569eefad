//! Shared MongoDB container for backend integration tests.
//!
//! One container starts on first use and lives for the whole test binary.
//! Every call to [`fresh_collection`] connects to a new uniquely named
//! database, so tests never see each other's documents.
//!
//! # Environment Variables
//!
//! - `TEST_MONGO_IMAGE`: Override the mongo image (default: `mongo:7`)

use std::sync::Arc;

use ledgerline_accounts::config::{StoreBackend, StoreConfig};
use ledgerline_accounts::db::connect_mongo;
use ledgerline_accounts::store::{mongo::IndexSpec, MongoCollection};
use testcontainers::{core::WaitFor, runners::AsyncRunner, ContainerAsync, GenericImage};
use tokio::sync::OnceCell;

use super::factories::next_id;

/// Shared container state.
static TEST_MONGO: OnceCell<TestMongo> = OnceCell::const_new();

/// RAII guard keeping the container alive while tests hold its URI.
pub struct TestMongo {
    uri: String,
    _container: Arc<ContainerAsync<GenericImage>>,
}

impl TestMongo {
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Get the shared container, starting it on first call.
#[allow(clippy::expect_used)]
pub async fn get_test_mongo() -> &'static TestMongo {
    TEST_MONGO
        .get_or_init(|| async {
            let image_full =
                std::env::var("TEST_MONGO_IMAGE").unwrap_or_else(|_| "mongo:7".to_string());
            let (image_name, image_tag) = image_full
                .rsplit_once(':')
                .unwrap_or((&image_full, "latest"));

            let container = GenericImage::new(image_name, image_tag)
                .with_exposed_port(27017.into())
                .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
                .start()
                .await
                .expect("Failed to start mongo container");

            let port = container
                .get_host_port_ipv4(27017)
                .await
                .expect("Failed to get mongo port");

            TestMongo {
                uri: format!("mongodb://127.0.0.1:{port}/?directConnection=true"),
                _container: Arc::new(container),
            }
        })
        .await
}

/// Store config pointing at a new, empty database on the shared container.
pub async fn fresh_store_config() -> StoreConfig {
    let mongo = get_test_mongo().await;
    StoreConfig {
        backend: StoreBackend::Mongo,
        uri: mongo.uri().to_string(),
        database: format!("ledgerline_test_{}", next_id()),
        connect_timeout_ms: 10_000,
        retry_deadline_secs: 30,
    }
}

/// Open `name` in a new, empty database with the given indexes.
#[allow(clippy::expect_used)]
pub async fn fresh_collection(name: &str, indexes: Vec<IndexSpec>) -> MongoCollection {
    let config = fresh_store_config().await;
    let database = connect_mongo(&config)
        .await
        .expect("Failed to connect to test mongo");
    MongoCollection::open(&database, name, indexes)
        .await
        .expect("Failed to open test collection")
}
