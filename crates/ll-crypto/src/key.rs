//! Structured Ed25519 key decoded from its stored string form.
//!
//! Accounts persist only the base64url public key. A [`Key`] is rebuilt on
//! demand from that string plus an optional base64url private seed; an empty
//! private string yields a verify-only key.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::{decode_base64url, derive_kid, encode_base64url, DecodeError};

pub use ed25519_dalek::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors from decoding key strings or using the decoded key.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("public key is empty")]
    EmptyPublicKey,
    #[error(transparent)]
    Encoding(#[from] DecodeError),
    #[error("{which} key must be {expected} bytes, got {actual}")]
    Length {
        which: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid Ed25519 public key")]
    InvalidPublicKey,
    #[error("private key does not belong to the public key")]
    Mismatch,
    #[error("no private key loaded")]
    MissingPrivateKey,
    #[error("signature must be 64 bytes, got {0}")]
    SignatureLength(usize),
    #[error("signature verification failed")]
    SignatureMismatch,
}

/// An Ed25519 public key, optionally paired with its private seed.
#[derive(Clone)]
pub struct Key {
    public: VerifyingKey,
    secret: Option<SigningKey>,
}

fn decode_fixed<const N: usize>(encoded: &str, which: &'static str) -> Result<[u8; N], KeyError> {
    let bytes = decode_base64url(encoded)?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| KeyError::Length {
        which,
        expected: N,
        actual,
    })
}

impl Key {
    /// Decode a key from its base64url public key and optional private seed.
    ///
    /// Pass an empty `private_key` for a verify-only key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::EmptyPublicKey`] for an empty public key,
    /// [`KeyError::Encoding`] or [`KeyError::Length`] for malformed strings,
    /// [`KeyError::InvalidPublicKey`] if the bytes are not a curve point, and
    /// [`KeyError::Mismatch`] if the seed derives a different public key.
    pub fn from_strings(public_key: &str, private_key: &str) -> Result<Self, KeyError> {
        if public_key.is_empty() {
            return Err(KeyError::EmptyPublicKey);
        }

        let public_bytes = decode_fixed::<PUBLIC_KEY_LENGTH>(public_key, "public")?;
        let public =
            VerifyingKey::from_bytes(&public_bytes).map_err(|_| KeyError::InvalidPublicKey)?;

        if private_key.is_empty() {
            return Ok(Self {
                public,
                secret: None,
            });
        }

        let seed = decode_fixed::<SECRET_KEY_LENGTH>(private_key, "private")?;
        let secret = SigningKey::from_bytes(&seed);
        if secret.verifying_key() != public {
            return Err(KeyError::Mismatch);
        }

        Ok(Self {
            public,
            secret: Some(secret),
        })
    }

    /// Build a full key pair from a raw 32-byte seed.
    #[must_use]
    pub fn from_secret_bytes(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        let secret = SigningKey::from_bytes(seed);
        Self {
            public: secret.verifying_key(),
            secret: Some(secret),
        }
    }

    /// Drop the private half, keeping a verify-only key.
    #[must_use]
    pub fn public_only(&self) -> Self {
        Self {
            public: self.public,
            secret: None,
        }
    }

    #[must_use]
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.public.to_bytes()
    }

    /// The public key in its stored (base64url) form.
    #[must_use]
    pub fn public_key_string(&self) -> String {
        encode_base64url(self.public.as_bytes())
    }

    /// The private seed in base64url form, if this key carries one.
    #[must_use]
    pub fn private_key_string(&self) -> Option<String> {
        self.secret
            .as_ref()
            .map(|secret| encode_base64url(&secret.to_bytes()))
    }

    #[must_use]
    pub const fn has_private_key(&self) -> bool {
        self.secret.is_some()
    }

    /// Key identifier derived from the public key.
    #[must_use]
    pub fn kid(&self) -> String {
        derive_kid(self.public.as_bytes())
    }

    /// Sign a message with the private half.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::MissingPrivateKey`] for a verify-only key.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], KeyError> {
        let secret = self.secret.as_ref().ok_or(KeyError::MissingPrivateKey)?;
        Ok(secret.sign(message).to_bytes())
    }

    /// Verify a signature over `message` with strict Ed25519 rules.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::SignatureLength`] if the signature is not 64 bytes
    /// and [`KeyError::SignatureMismatch`] if verification fails.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), KeyError> {
        let sig_bytes: [u8; SIGNATURE_LENGTH] = signature
            .try_into()
            .map_err(|_| KeyError::SignatureLength(signature.len()))?;
        let sig = Signature::from_bytes(&sig_bytes);
        self.public
            .verify_strict(message, &sig)
            .map_err(|_| KeyError::SignatureMismatch)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
            && self.secret.as_ref().map(SigningKey::to_bytes)
                == other.secret.as_ref().map(SigningKey::to_bytes)
    }
}

impl Eq for Key {}

// Never print the private seed.
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("kid", &self.kid())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}
