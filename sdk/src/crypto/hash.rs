//! # Hashing
//!
//! The two digest functions an account key can be registered with, plus the
//! SHA3-256 used for transaction ids.
//!
//! - **SHA2-256** — what most hardware signers and browser wallets speak.
//! - **SHA3-256** — the ledger's own default, and the only choice for ids.
//!
//! Signatures are always computed over the digest of the domain-tagged
//! message, never over the raw bytes. Which digest is a property of the
//! account key, so the signer has to know it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Sha3_256;
use std::fmt;

/// Digest function bound to an account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA2_256")]
    Sha2_256,
    #[serde(rename = "SHA3_256")]
    Sha3_256,
}

impl HashAlgorithm {
    /// Hashes `data` with this algorithm.
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        match self {
            Self::Sha2_256 => sha2_256(data),
            Self::Sha3_256 => sha3_256(data),
        }
    }

    /// Parses the ledger's spelling (`SHA2_256` / `SHA3_256`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SHA2_256" => Some(Self::Sha2_256),
            "SHA3_256" => Some(Self::Sha3_256),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha2_256 => "SHA2_256",
            Self::Sha3_256 => "SHA3_256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// SHA2-256 of `data`.
pub fn sha2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA3-256 of `data`.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    hasher.finalize().into()
}
