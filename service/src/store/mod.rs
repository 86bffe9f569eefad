//! Document store abstraction
//!
//! A [`DocumentCollection`] is a named set of BSON documents keyed by a string
//! `_id`. Repositories hold one behind an `Arc<dyn DocumentCollection>` and
//! never know which backend serves it.

use async_trait::async_trait;
use bson::Document;

pub mod filter;
pub mod memory;
pub mod mongo;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use filter::{Condition, Filter, Op};
pub use memory::MemoryCollection;
pub use mongo::MongoCollection;

/// Primary key field of every stored document.
pub const ID_FIELD: &str = "_id";

/// Error types for collection operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("document has no string `_id`")]
    MissingId,
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(err: bson::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Pagination for [`DocumentCollection::find`].
///
/// `skip` is applied before `limit`; `limit: None` returns every match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    /// Every matching document.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            skip: 0,
            limit: None,
        }
    }

    /// Skip `offset` matches, then return at most `limit`.
    #[must_use]
    pub const fn page(limit: u64, offset: u64) -> Self {
        Self {
            skip: offset,
            limit: Some(limit),
        }
    }
}

/// A named collection of documents with a unique string `_id`.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Insert a new document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if a document with the same `_id`
    /// is already stored, [`StoreError::MissingId`] if `_id` is absent.
    async fn insert_one(&self, document: Document) -> Result<(), StoreError>;

    /// Fetch the document whose `_id` equals `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the lookup itself fails; absence is `Ok(None)`.
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError>;

    /// Replace the document stored under `id`, inserting it if absent.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write fails.
    async fn save(&self, id: &str, document: Document) -> Result<(), StoreError>;

    /// Documents matching `filter`, in store order, paginated by `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the query or cursor iteration fails.
    async fn find(
        &self,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Extract the string `_id` of a document.
///
/// # Errors
///
/// Returns [`StoreError::MissingId`] if `_id` is absent or not a string.
pub fn document_id(document: &Document) -> Result<&str, StoreError> {
    document.get_str(ID_FIELD).map_err(|_| StoreError::MissingId)
}
