//! Account registry
//!
//! Maps an account ID to its encoded public key on top of a
//! [`DocumentCollection`](crate::store::DocumentCollection), and decodes that
//! key on request through a [`KeyCodec`].

pub mod codec;
pub mod records;
pub mod repo;

pub use codec::{Ed25519Codec, KeyCodec};
pub use records::{
    account_indexes, by_id_prefix, by_public_key, create_account, get_account, list_accounts,
    lookup_account, search_accounts, write_account, Account, AccountRepoError,
    ACCOUNT_COLLECTION, PUBLIC_KEY_FIELD,
};
pub use repo::{AccountRepo, DocumentAccountRepo};
