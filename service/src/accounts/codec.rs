//! Key decoding seam between stored account strings and [`Key`] values.

use ll_crypto::{Key, KeyError};

/// Turns stored key strings into structured keys.
pub trait KeyCodec: Send + Sync {
    /// Decode a public key string and an optional private key string.
    ///
    /// An empty `private_key` yields a verify-only key.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyError`] if either string is malformed.
    fn decode_from_strings(&self, public_key: &str, private_key: &str) -> Result<Key, KeyError>;
}

/// Base64url Ed25519 keys, as produced by [`Key::public_key_string`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Codec;

impl KeyCodec for Ed25519Codec {
    fn decode_from_strings(&self, public_key: &str, private_key: &str) -> Result<Key, KeyError> {
        Key::from_strings(public_key, private_key)
    }
}
