//! Domain separation tags.
//!
//! Every message handed to a signer starts with a 32-byte tag naming its
//! message class. A signature over a transaction payload can therefore never
//! be replayed as a signature over a user message, and vice versa.

use crate::config::{DOMAIN_TAG_LENGTH, TRANSACTION_DOMAIN_TAG, USER_DOMAIN_TAG};

/// The message classes a signer may be asked to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainTag {
    /// Transaction payloads and envelopes.
    Transaction,
    /// Arbitrary user messages.
    User,
}

impl DomainTag {
    /// The ASCII literal before padding.
    pub fn literal(&self) -> &'static str {
        match self {
            Self::Transaction => TRANSACTION_DOMAIN_TAG,
            Self::User => USER_DOMAIN_TAG,
        }
    }

    /// The literal right-padded with zero bytes to exactly 32 bytes.
    pub fn bytes(&self) -> [u8; DOMAIN_TAG_LENGTH] {
        let literal = self.literal().as_bytes();
        let mut tag = [0u8; DOMAIN_TAG_LENGTH];
        tag[..literal.len()].copy_from_slice(literal);
        tag
    }

    /// Returns `tag ++ message`, the exact bytes a signer sees.
    pub fn prefix(&self, message: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(DOMAIN_TAG_LENGTH + message.len());
        out.extend_from_slice(&self.bytes());
        out.extend_from_slice(message);
        out
    }
}
