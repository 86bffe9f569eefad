//! Key material for Ledgerline accounts.
//!
//! Accounts store their public key as a base64url string. This crate turns
//! those strings back into structured Ed25519 keys ([`Key`]) and provides the
//! small encoding helpers shared by the rest of the workspace.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
pub(crate) use sha2::{Digest, Sha256};

mod key;
pub use key::{Key, KeyError, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};

/// base64url alphabet, unpadded on encode, padding optional on decode.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Error type for base64url decoding failures
#[derive(Debug, thiserror::Error)]
#[error("invalid base64url encoding: {0}")]
pub struct DecodeError(#[from] base64::DecodeError);

/// Derive a key identifier (KID) from a public key.
///
/// The KID is `base64url(SHA-256(pubkey)[0:16])`, a 22 character string that
/// names a key without carrying the key itself.
#[must_use]
pub fn derive_kid(public_key: &[u8]) -> String {
    let hash = Sha256::digest(public_key);
    encode_base64url(&hash[..16])
}

/// Encode bytes as base64url (RFC 4648) without padding.
#[must_use]
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_LENIENT.encode(bytes)
}

/// Decode a base64url-encoded string (RFC 4648) to bytes.
///
/// Accepts input with or without trailing `=` padding.
///
/// # Errors
/// Returns `DecodeError` if the input is not valid base64url
pub fn decode_base64url(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_LENIENT.decode(encoded).map_err(DecodeError::from)
}
