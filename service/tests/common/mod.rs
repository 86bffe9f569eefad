//! Common test utilities for integration tests.
//!
//! - [`run_test`] drives async tests on one shared runtime (used by
//!   `#[store_test]` from `ll-test-macros`).
//! - [`memory_repo`] builds a repository over a fresh in-memory collection.
//! - [`factories`] builds accounts with real Ed25519 keys.
//! - [`test_db`] runs a shared MongoDB container for backend tests.
//!
//! ```ignore
//! use ll_test_macros::store_test;
//!
//! #[store_test]
//! async fn test_something() {
//!     let repo = common::memory_repo();
//!     // ...
//! }
//! ```

#![allow(dead_code)]

pub mod factories;
pub mod test_db;

use std::future::Future;
use std::sync::Arc;

use ledgerline_accounts::accounts::{DocumentAccountRepo, Ed25519Codec, ACCOUNT_COLLECTION};
use ledgerline_accounts::store::{DocumentCollection, MemoryCollection};
use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

/// Global Tokio runtime shared across all tests in one test binary.
static TEST_RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create test runtime")
});

/// Run an async test body on the shared runtime.
pub fn run_test<F: Future>(f: F) -> F::Output {
    TEST_RUNTIME.block_on(f)
}

/// Repository over the given collection with the default key codec.
pub fn repo_over(collection: Arc<dyn DocumentCollection>) -> DocumentAccountRepo {
    DocumentAccountRepo::new(collection, Arc::new(Ed25519Codec))
}

/// Repository over a fresh, empty in-memory `accounts` collection.
pub fn memory_repo() -> DocumentAccountRepo {
    repo_over(Arc::new(MemoryCollection::new(ACCOUNT_COLLECTION)))
}
