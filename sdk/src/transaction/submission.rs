//! The submission form of a signed transaction.
//!
//! Access nodes take transactions as JSON with bytes in base64, addresses
//! and ids as bare hex, and every integer as a decimal string. This module
//! only shapes the body; sending it is the transport's job.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::builder::Transaction;
use super::error::TransactionError;
use super::types::{SigningState, TransactionSignature};

/// Request body for submitting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittableTransaction {
    pub script: String,
    pub arguments: Vec<String>,
    pub reference_block_id: String,
    pub gas_limit: String,
    pub payer: String,
    pub proposal_key: SubmittableProposalKey,
    pub authorizers: Vec<String>,
    pub payload_signatures: Vec<SubmittableSignature>,
    pub envelope_signatures: Vec<SubmittableSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittableProposalKey {
    pub address: String,
    pub key_index: String,
    pub sequence_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittableSignature {
    pub address: String,
    pub key_index: String,
    pub signature: String,
}

impl From<&TransactionSignature> for SubmittableSignature {
    fn from(sig: &TransactionSignature) -> Self {
        Self {
            address: sig.address.to_hex(),
            key_index: sig.key_index.to_string(),
            signature: STANDARD.encode(&sig.signature),
        }
    }
}

impl Transaction {
    /// Shapes a fully signed transaction for submission.
    ///
    /// Fails with `NotSubmittable` unless [`Transaction::state`] is
    /// `EnvelopeSigned`.
    pub fn to_submittable(&self) -> Result<SubmittableTransaction, TransactionError> {
        let state = self.state();
        if state != SigningState::EnvelopeSigned {
            return Err(TransactionError::NotSubmittable { state });
        }

        Ok(SubmittableTransaction {
            script: STANDARD.encode(self.script.as_bytes()),
            arguments: self
                .arguments
                .iter()
                .map(|a| STANDARD.encode(a.encode()))
                .collect(),
            reference_block_id: self.reference_block_id.to_hex(),
            gas_limit: self.gas_limit.to_string(),
            payer: self.payer.to_hex(),
            proposal_key: SubmittableProposalKey {
                address: self.proposal_key.address.to_hex(),
                key_index: self.proposal_key.key_index.to_string(),
                sequence_number: self.proposal_key.sequence_number.to_string(),
            },
            authorizers: self.authorizers.iter().map(|a| a.to_hex()).collect(),
            payload_signatures: self.payload_signatures.iter().map(Into::into).collect(),
            envelope_signatures: self.envelope_signatures.iter().map(Into::into).collect(),
        })
    }
}
