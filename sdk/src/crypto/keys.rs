//! # Account Keys
//!
//! ECDSA P-256 key pairs, the signature scheme ledger accounts register.
//!
//! Public keys use the ledger's 64-byte form: the uncompressed SEC1 point
//! without its leading `0x04`. Signatures are 64 bytes, `r || s`.
//!
//! Key bytes are never logged. Neither `PrivateKey`'s `Debug` impl nor any
//! error in this module prints them.

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use super::hash::HashAlgorithm;

/// Errors during key parsing and signing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid private key bytes")]
    InvalidPrivateKey,

    #[error("invalid public key bytes")]
    InvalidPublicKey,

    #[error("signing failed")]
    SigningFailed,
}

/// Length of a serialized private key scalar.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Length of a serialized public key (X || Y).
pub const PUBLIC_KEY_LENGTH: usize = 64;

/// Length of a serialized signature (r || s).
pub const SIGNATURE_LENGTH: usize = 64;

/// An ECDSA P-256 private key.
#[derive(Clone)]
pub struct PrivateKey {
    signing_key: SigningKey,
}

/// An ECDSA P-256 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PrivateKey {
    /// Generates a fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Loads a key from its 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(KeyError::InvalidPrivateKey);
        }
        let signing_key = SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Loads a key from hex, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, KeyError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(digits).map_err(|_| KeyError::InvalidPrivateKey)?;
        Self::from_bytes(&bytes)
    }

    /// The 32-byte scalar. Handle with care.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: VerifyingKey::from(&self.signing_key),
        }
    }

    /// Signs `message` after hashing it with `hash`. Returns `r || s`.
    pub fn sign(&self, message: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>, KeyError> {
        let digest = hash.digest(message);
        let signature: Signature = self
            .signing_key
            .sign_prehash(&digest)
            .map_err(|_| KeyError::SigningFailed)?;
        Ok(signature.to_bytes().to_vec())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

impl PublicKey {
    /// Parses the 64-byte `X || Y` form. The 65-byte SEC1 uncompressed
    /// form (leading `0x04`) is accepted too.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let verifying_key = match bytes.len() {
            PUBLIC_KEY_LENGTH => {
                let mut sec1 = Vec::with_capacity(PUBLIC_KEY_LENGTH + 1);
                sec1.push(0x04);
                sec1.extend_from_slice(bytes);
                VerifyingKey::from_sec1_bytes(&sec1)
            }
            _ => VerifyingKey::from_sec1_bytes(bytes),
        }
        .map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    pub fn from_hex(input: &str) -> Result<Self, KeyError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        let bytes = hex::decode(digits).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }

    /// The 64-byte `X || Y` form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let point = self.verifying_key.to_encoded_point(false);
        point.as_bytes()[1..].to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Checks an `r || s` signature over the `hash` digest of `message`.
    /// Malformed signatures simply fail to verify.
    pub fn verify(&self, message: &[u8], signature: &[u8], hash: HashAlgorithm) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        let digest = hash.digest(message);
        self.verifying_key
            .verify_prehash(&digest, &signature)
            .is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}
