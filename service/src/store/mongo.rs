//! MongoDB-backed document collection

use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::{
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::info;

use super::{document_id, DocumentCollection, Filter, FindOptions, StoreError, ID_FIELD};

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Secondary index declaration: key document plus optional options.
pub type IndexSpec = (Document, Option<IndexOptions>);

impl From<MongoError> for StoreError {
    fn from(err: MongoError) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error))
                if write_error.code == DUPLICATE_KEY_CODE =>
            {
                Self::DuplicateKey(write_error.message.clone())
            }
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Raw-document MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoCollection {
    inner: Collection<Document>,
}

impl MongoCollection {
    /// Open a collection and apply its secondary indexes.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if index creation fails.
    pub async fn open(
        database: &Database,
        name: &str,
        indexes: Vec<IndexSpec>,
    ) -> Result<Self, StoreError> {
        let collection = Self {
            inner: database.collection::<Document>(name),
        };
        collection.apply_indexes(indexes).await?;
        Ok(collection)
    }

    async fn apply_indexes(&self, indexes: Vec<IndexSpec>) -> Result<(), StoreError> {
        if indexes.is_empty() {
            return Ok(());
        }

        let models: Vec<IndexModel> = indexes
            .into_iter()
            .map(|(keys, options)| IndexModel::builder().keys(keys).options(options).build())
            .collect();
        let count = models.len();

        self.inner.create_indexes(models).await?;
        info!(collection = %self.inner.name(), count, "indexes applied");
        Ok(())
    }
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        document_id(&document)?;
        self.inner.insert_one(document).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.inner.find_one(doc! { "_id": id }).await?)
    }

    async fn save(&self, id: &str, mut document: Document) -> Result<(), StoreError> {
        document.insert(ID_FIELD, id);
        self.inner
            .replace_one(doc! { "_id": id }, document)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find(
        &self,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        // The server reads `limit(0)` as unbounded.
        if options.limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut query = self.inner.find(filter.to_document()).skip(options.skip);
        if let Some(limit) = options.limit {
            query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let cursor = query.await?;
        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }
}
