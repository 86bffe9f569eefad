//! Collections with scripted failures for repository tests.

use async_trait::async_trait;
use bson::Document;

use super::{DocumentCollection, Filter, FindOptions, MemoryCollection, StoreError};

/// Every call fails as if the server could not be reached.
pub struct UnavailableCollection {
    name: String,
}

impl UnavailableCollection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(format!("{} is unreachable", self.name))
    }
}

#[async_trait]
impl DocumentCollection for UnavailableCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, _document: Document) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Document>, StoreError> {
        Err(self.error())
    }

    async fn save(&self, _id: &str, _document: Document) -> Result<(), StoreError> {
        Err(self.error())
    }

    async fn find(
        &self,
        _filter: &Filter,
        _options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        Err(self.error())
    }
}

/// Point lookups always miss while writes and scans hit the real data.
///
/// Reproduces a creator that checked for an ID just before another caller
/// inserted it.
pub struct StaleReadCollection {
    inner: MemoryCollection,
}

impl StaleReadCollection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: MemoryCollection::new(name),
        }
    }
}

#[async_trait]
impl DocumentCollection for StaleReadCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        self.inner.insert_one(document).await
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Document>, StoreError> {
        Ok(None)
    }

    async fn save(&self, id: &str, document: Document) -> Result<(), StoreError> {
        self.inner.save(id, document).await
    }

    async fn find(
        &self,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.find(filter, options).await
    }
}

/// Point lookups fail while writes and scans hit the real data.
pub struct FailingLookupCollection {
    inner: MemoryCollection,
}

impl FailingLookupCollection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: MemoryCollection::new(name),
        }
    }
}

#[async_trait]
impl DocumentCollection for FailingLookupCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        self.inner.insert_one(document).await
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Unavailable(format!(
            "{} lookup timed out",
            self.inner.name()
        )))
    }

    async fn save(&self, id: &str, document: Document) -> Result<(), StoreError> {
        self.inner.save(id, document).await
    }

    async fn find(
        &self,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.find(filter, options).await
    }
}
