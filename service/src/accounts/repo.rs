//! Account repository trait
//!
//! [`AccountRepo`] is the contract callers depend on. [`DocumentAccountRepo`]
//! implements it over one injected collection handle and one key codec.

use std::sync::Arc;

use async_trait::async_trait;
use ll_crypto::Key;
use tracing::warn;

use super::codec::KeyCodec;
use super::records::{self, Account, AccountRepoError};
use crate::store::{DocumentCollection, Filter};

/// Persistence operations for accounts.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    /// Create the account unless its ID is already registered.
    async fn create_account(&self, account: &Account) -> Result<(), AccountRepoError>;

    /// Store the account, replacing any record with the same ID.
    async fn write_account(&self, account: &Account) -> Result<(), AccountRepoError>;

    /// Whether a record with this ID could be read.
    ///
    /// Store failures also answer `false`, so "absent" and "unreachable" look
    /// the same here. Use [`AccountRepo::lookup_account`] to tell them apart.
    async fn account_exists(&self, id: &str) -> bool;

    /// `Ok(Some)` when found, `Ok(None)` when absent, `Err` when the store failed.
    async fn lookup_account(&self, id: &str) -> Result<Option<Account>, AccountRepoError>;

    async fn get_account(&self, id: &str) -> Result<Account, AccountRepoError>;

    /// Decode the stored public key of an account into a verify-only [`Key`].
    async fn get_account_public_key(&self, id: &str) -> Result<Key, AccountRepoError>;

    async fn list_accounts(&self) -> Result<Vec<Account>, AccountRepoError>;

    async fn search_accounts(
        &self,
        filter: &Filter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Account>, AccountRepoError>;
}

/// [`AccountRepo`] over a document collection.
#[derive(Clone)]
pub struct DocumentAccountRepo {
    collection: Arc<dyn DocumentCollection>,
    codec: Arc<dyn KeyCodec>,
}

impl DocumentAccountRepo {
    #[must_use]
    pub fn new(collection: Arc<dyn DocumentCollection>, codec: Arc<dyn KeyCodec>) -> Self {
        Self { collection, codec }
    }
}

#[async_trait]
impl AccountRepo for DocumentAccountRepo {
    async fn create_account(&self, account: &Account) -> Result<(), AccountRepoError> {
        records::create_account(self.collection.as_ref(), account).await
    }

    async fn write_account(&self, account: &Account) -> Result<(), AccountRepoError> {
        records::write_account(self.collection.as_ref(), account).await
    }

    async fn account_exists(&self, id: &str) -> bool {
        match self.lookup_account(id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!(account_id = %id, error = %e, "existence check failed; reporting absent");
                false
            }
        }
    }

    async fn lookup_account(&self, id: &str) -> Result<Option<Account>, AccountRepoError> {
        records::lookup_account(self.collection.as_ref(), id).await
    }

    async fn get_account(&self, id: &str) -> Result<Account, AccountRepoError> {
        records::get_account(self.collection.as_ref(), id).await
    }

    async fn get_account_public_key(&self, id: &str) -> Result<Key, AccountRepoError> {
        let account = self.get_account(id).await?;
        Ok(self.codec.decode_from_strings(&account.public_key, "")?)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AccountRepoError> {
        records::list_accounts(self.collection.as_ref()).await
    }

    async fn search_accounts(
        &self,
        filter: &Filter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Account>, AccountRepoError> {
        records::search_accounts(self.collection.as_ref(), filter, limit, offset).await
    }
}
