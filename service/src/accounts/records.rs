//! Account record persistence against a document collection

use bson::Document;
use ll_crypto::KeyError;
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{
    mongo::IndexSpec, DocumentCollection, Filter, FindOptions, StoreError, ID_FIELD,
};

/// Collection name for accounts
pub const ACCOUNT_COLLECTION: &str = "accounts";

/// Stored field holding the encoded public key.
pub const PUBLIC_KEY_FIELD: &str = "public_key";

/// Account document: `{ "_id": <id>, "public_key": <encoded key> }`.
///
/// `public_key` is stored verbatim and only decoded when a caller asks for
/// the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub public_key: String,
}

impl Account {
    #[must_use]
    pub fn new(id: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            public_key: public_key.into(),
        }
    }
}

/// Error types for account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountRepoError {
    #[error("account id must not be empty")]
    EmptyId,
    #[error("account already exists")]
    DuplicateAccount,
    #[error("account not found")]
    NotFound,
    #[error("invalid public key: {0}")]
    InvalidKey(#[from] KeyError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Secondary indexes for the accounts collection. `_id` is unique natively.
#[must_use]
pub fn account_indexes() -> Vec<IndexSpec> {
    vec![(
        bson::doc! { "public_key": 1 },
        Some(
            IndexOptions::builder()
                .name("public_key_index".to_string())
                .build(),
        ),
    )]
}

fn to_document(account: &Account) -> Result<Document, AccountRepoError> {
    if account.id.is_empty() {
        return Err(AccountRepoError::EmptyId);
    }
    Ok(bson::to_document(account).map_err(StoreError::from)?)
}

fn from_document(document: Document) -> Result<Account, AccountRepoError> {
    Ok(bson::from_document(document).map_err(StoreError::from)?)
}

/// Create an account if its ID is not taken yet.
///
/// The existence check and the insert are separate store calls; a creator
/// that loses a race is still rejected because the insert hits the unique
/// `_id` and that rejection is reported as a duplicate too.
///
/// # Errors
///
/// Returns `AccountRepoError::EmptyId` for an empty ID,
/// `AccountRepoError::DuplicateAccount` if the ID exists, and
/// `AccountRepoError::Store` for any other store failure.
pub async fn create_account(
    collection: &dyn DocumentCollection,
    account: &Account,
) -> Result<(), AccountRepoError> {
    let document = to_document(account)?;

    if lookup_account(collection, &account.id).await?.is_some() {
        return Err(AccountRepoError::DuplicateAccount);
    }

    match collection.insert_one(document).await {
        Ok(()) => {
            debug!(account_id = %account.id, "account created");
            Ok(())
        }
        Err(StoreError::DuplicateKey(_)) => Err(AccountRepoError::DuplicateAccount),
        Err(e) => Err(AccountRepoError::Store(e)),
    }
}

/// Persist an account unconditionally, replacing any record with the same ID.
///
/// # Errors
///
/// Returns `AccountRepoError::EmptyId` for an empty ID and
/// `AccountRepoError::Store` if the write fails.
pub async fn write_account(
    collection: &dyn DocumentCollection,
    account: &Account,
) -> Result<(), AccountRepoError> {
    let document = to_document(account)?;
    collection.save(&account.id, document).await?;
    debug!(account_id = %account.id, "account written");
    Ok(())
}

/// Look up an account, distinguishing absence (`Ok(None)`) from failure.
///
/// # Errors
///
/// Returns `AccountRepoError::Store` if the lookup fails or the stored
/// document does not have the account shape.
pub async fn lookup_account(
    collection: &dyn DocumentCollection,
    id: &str,
) -> Result<Option<Account>, AccountRepoError> {
    collection
        .find_by_id(id)
        .await?
        .map(from_document)
        .transpose()
}

/// Fetch an account by ID.
///
/// # Errors
///
/// Returns `AccountRepoError::NotFound` if no account has this ID and
/// `AccountRepoError::Store` on any other failure.
pub async fn get_account(
    collection: &dyn DocumentCollection,
    id: &str,
) -> Result<Account, AccountRepoError> {
    lookup_account(collection, id)
        .await?
        .ok_or(AccountRepoError::NotFound)
}

/// Every stored account, in the store's natural order.
///
/// # Errors
///
/// Returns `AccountRepoError::Store` if the scan fails.
pub async fn list_accounts(
    collection: &dyn DocumentCollection,
) -> Result<Vec<Account>, AccountRepoError> {
    let documents = collection
        .find(&Filter::all(), FindOptions::unbounded())
        .await?;
    documents.into_iter().map(from_document).collect()
}

/// Accounts matching `filter`, skipping `offset` and returning at most `limit`.
///
/// A zero `limit` returns nothing without querying the store.
///
/// # Errors
///
/// Returns `AccountRepoError::Store` if the query fails.
pub async fn search_accounts(
    collection: &dyn DocumentCollection,
    filter: &Filter,
    limit: u64,
    offset: u64,
) -> Result<Vec<Account>, AccountRepoError> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let documents = collection
        .find(filter, FindOptions::page(limit, offset))
        .await?;
    documents.into_iter().map(from_document).collect()
}

/// Filter selecting the account with exactly this public key string.
#[must_use]
pub fn by_public_key(public_key: &str) -> Filter {
    Filter::all().eq(PUBLIC_KEY_FIELD, public_key)
}

/// Filter selecting accounts whose ID starts with `prefix`.
#[must_use]
pub fn by_id_prefix(prefix: &str) -> Filter {
    Filter::all().starts_with(ID_FIELD, prefix)
}
