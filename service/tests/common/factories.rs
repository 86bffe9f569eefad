//! Test data factories for account setup.
//!
//! ```ignore
//! let account = AccountFactory::new().with_id("alice").with_seed(42).build();
//! AccountFactory::new().create(&repo).await.expect("create account");
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use ledgerline_accounts::accounts::{Account, AccountRepo, AccountRepoError};
use ll_crypto::Key;

/// Global counter for generating unique test data.
static FACTORY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Returns a unique ID for generating test data.
pub fn next_id() -> u64 {
    FACTORY_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Deterministic Ed25519 key pair for a seed byte.
pub fn test_key(seed: u8) -> Key {
    Key::from_secret_bytes(&[seed; 32])
}

/// Builder for test accounts with sensible defaults.
pub struct AccountFactory {
    id: Option<String>,
    seed: Option<u8>,
    public_key: Option<String>,
}

impl AccountFactory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: None,
            seed: None,
            public_key: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Different seeds produce different key pairs.
    #[must_use]
    pub fn with_seed(mut self, seed: u8) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Store this exact string instead of a generated key.
    #[must_use]
    pub fn with_raw_public_key(mut self, public_key: &str) -> Self {
        self.public_key = Some(public_key.to_string());
        self
    }

    pub fn build(self) -> Account {
        let n = next_id();
        let id = self.id.unwrap_or_else(|| format!("acc_{n}"));
        #[allow(clippy::cast_possible_truncation)]
        let seed = self.seed.unwrap_or((n % 256) as u8);
        let public_key = self
            .public_key
            .unwrap_or_else(|| test_key(seed).public_key_string());
        Account::new(id, public_key)
    }

    /// Build the account and register it through `create_account`.
    pub async fn create(self, repo: &dyn AccountRepo) -> Result<Account, AccountRepoError> {
        let account = self.build();
        repo.create_account(&account).await?;
        Ok(account)
    }
}

impl Default for AccountFactory {
    fn default() -> Self {
        Self::new()
    }
}
