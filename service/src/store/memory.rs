//! In-memory document collection.
//!
//! Documents live in insertion order; that order is the collection's natural
//! order for [`DocumentCollection::find`]. Replacing a document keeps its slot.

use async_trait::async_trait;
use bson::Document;
use tokio::sync::RwLock;

use super::{document_id, DocumentCollection, Filter, FindOptions, StoreError, ID_FIELD};

pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn position(documents: &[Document], id: &str) -> Option<usize> {
    documents
        .iter()
        .position(|document| document.get_str(ID_FIELD).is_ok_and(|stored| stored == id))
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        let id = document_id(&document)?.to_owned();
        let mut documents = self.documents.write().await;
        if position(&documents, &id).is_some() {
            return Err(StoreError::DuplicateKey(id));
        }
        documents.push(document);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.read().await;
        Ok(position(&documents, id).map(|index| documents[index].clone()))
    }

    async fn save(&self, id: &str, mut document: Document) -> Result<(), StoreError> {
        document.insert(ID_FIELD, id);
        let mut documents = self.documents.write().await;
        match position(&documents, id) {
            Some(index) => documents[index] = document,
            None => documents.push(document),
        }
        Ok(())
    }

    async fn find(
        &self,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|document| filter.matches(document))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }
}
