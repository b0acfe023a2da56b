//! Core value types for transactions.
//!
//! Small, mostly `Copy` pieces that the builder, the signing engine and the
//! submission form share.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::TransactionError;
use crate::address::Address;
use crate::config::BLOCK_ID_LENGTH;

// ---------------------------------------------------------------------------
// BlockId
// ---------------------------------------------------------------------------

/// A 32-byte block identifier. Transactions name a recent block so the
/// chain can expire them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockId([u8; BLOCK_ID_LENGTH]);

impl BlockId {
    pub const fn new(bytes: [u8; BLOCK_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let array: [u8; BLOCK_ID_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| TransactionError::InvalidBlockId {
                    input: hex::encode(bytes),
                })?;
        Ok(Self(array))
    }

    /// Parses exactly 64 hex digits, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, TransactionError> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        let bytes = hex::decode(digits).map_err(|_| TransactionError::InvalidBlockId {
            input: input.to_string(),
        })?;
        if bytes.len() != BLOCK_ID_LENGTH {
            return Err(TransactionError::InvalidBlockId {
                input: input.to_string(),
            });
        }
        Self::from_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_ID_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for BlockId {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.to_hex())
    }
}

impl Serialize for BlockId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ProposalKey
// ---------------------------------------------------------------------------

/// The account key proposing a transaction. Its sequence number guards
/// against replay and must match the chain's value when the transaction
/// executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalKey {
    pub address: Address,
    pub key_index: u32,
    pub sequence_number: u64,
}

impl ProposalKey {
    pub fn new(address: Address, key_index: u32, sequence_number: u64) -> Self {
        Self {
            address,
            key_index,
            sequence_number,
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionSignature
// ---------------------------------------------------------------------------

/// One filled signature slot.
///
/// `signer_index` is the position of `address` in the transaction's
/// canonical signer list. It is what the envelope actually encodes; the
/// address is kept alongside for convenience and for the submission form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub address: Address,
    pub signer_index: u32,
    pub key_index: u32,
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

impl TransactionSignature {
    /// Sort key used for both signature lists.
    pub(crate) fn slot(&self) -> (u32, u32) {
        (self.signer_index, self.key_index)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
    }
}

/// Serde helper for an optional 32-byte digest as a hex string.
pub(crate) mod hex_digest {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        digest: &Option<[u8; 32]>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match digest {
            Some(d) => serializer.serialize_some(&hex::encode(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<[u8; 32]>, D::Error> {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let mut digest = [0u8; 32];
        hex::decode_to_slice(s.strip_prefix("0x").unwrap_or(&s), &mut digest)
            .map_err(serde::de::Error::custom)?;
        Ok(Some(digest))
    }
}

// ---------------------------------------------------------------------------
// SigningState
// ---------------------------------------------------------------------------

/// Where a transaction stands in the signing lifecycle.
///
/// `Draft → PayloadSigned → EnvelopeSigned`. Mutating signed content drops
/// a transaction back to `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningState {
    Draft,
    PayloadSigned,
    EnvelopeSigned,
}

impl fmt::Display for SigningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::PayloadSigned => write!(f, "PayloadSigned"),
            Self::EnvelopeSigned => write!(f, "EnvelopeSigned"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
