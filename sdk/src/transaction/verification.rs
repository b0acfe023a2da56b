//! Transaction verification: structural checks and cryptographic validation.
//!
//! Useful before submission (catch a wrong key index locally instead of
//! waiting for the chain to reject it) and in tests. The checks are ordered
//! from cheapest to most expensive: slot bookkeeping first, ECDSA last.

use thiserror::Error;

use super::builder::Transaction;
use super::error::TransactionError;
use super::types::TransactionSignature;
use crate::address::Address;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::keys::PublicKey;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during transaction verification.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// A payload signer has no payload signature.
    #[error("missing payload signature from {address}")]
    MissingPayloadSignature { address: Address },

    /// A payload signature comes from an address that must not sign the
    /// payload (the payer, or a non-signer).
    #[error("unexpected payload signature from {address}")]
    UnexpectedPayloadSigner { address: Address },

    /// The envelope must carry exactly one signature, from the payer.
    #[error("expected exactly one envelope signature from the payer, found {count}")]
    EnvelopeSignatureCount { count: usize },

    #[error("envelope signed by {address}, not the payer")]
    UnexpectedEnvelopeSigner { address: Address },

    /// The recorded signer index disagrees with the canonical signer list.
    #[error("signer index mismatch for {address}: expected {expected}, found {found}")]
    SignerIndexMismatch {
        address: Address,
        expected: u32,
        found: u32,
    },

    /// No signature from the proposer carries the proposal key's index.
    #[error("proposal key {key_index} of {address} did not sign")]
    ProposalKeyNotSigned { address: Address, key_index: u32 },

    /// The key lookup knows no such account key.
    #[error("unknown key {key_index} for {address}")]
    UnknownKey { address: Address, key_index: u32 },

    /// The signature does not verify against the account key.
    #[error("invalid signature from {address} (key {key_index})")]
    InvalidSignature { address: Address, key_index: u32 },

    /// The canonical bytes could not be built.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

// ---------------------------------------------------------------------------
// Key lookup
// ---------------------------------------------------------------------------

/// An account key as registered on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPublicKey {
    pub public_key: PublicKey,
    pub hash_algorithm: HashAlgorithm,
}

/// Source of account public keys, usually an access node or a local cache.
pub trait KeyLookup {
    fn account_key(&self, address: &Address, key_index: u32) -> Option<AccountPublicKey>;
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a fully signed transaction.
///
/// The checks, in order:
///
/// 1. **Payload slots**: every signature comes from a payload signer and
///    carries that signer's canonical index.
/// 2. **Payload coverage**: every payload signer has at least one signature.
/// 3. **Envelope**: exactly one signature, from the payer, correctly indexed.
/// 4. **Proposal key**: the proposer signed with the key whose sequence
///    number the transaction consumes. That signature is in the payload
///    list, or in the envelope when the proposer also pays.
/// 5. **Payload signatures**: ECDSA over `tag ++ payload`.
/// 6. **Envelope signature**: ECDSA over `tag ++ envelope`.
///
/// Content changed after signing surfaces in steps 5 and 6.
///
/// # Errors
///
/// Returns the first failing check as a [`VerificationError`].
pub fn verify_transaction(
    tx: &Transaction,
    keys: &dyn KeyLookup,
) -> Result<(), VerificationError> {
    let payload_signers = tx.payload_signers();

    // 1. Every payload signature sits in a valid slot.
    for sig in &tx.payload_signatures {
        if !payload_signers.contains(&sig.address) {
            return Err(VerificationError::UnexpectedPayloadSigner {
                address: sig.address,
            });
        }
        check_index(tx, sig)?;
    }

    // 2. Nobody required is missing.
    if let Some(address) = payload_signers
        .iter()
        .find(|a| !tx.payload_signatures.iter().any(|s| s.address == **a))
    {
        return Err(VerificationError::MissingPayloadSignature { address: *address });
    }

    // 3. One envelope signature, from the payer.
    let envelope_sig = match tx.envelope_signatures.as_slice() {
        [sig] => sig,
        other => {
            return Err(VerificationError::EnvelopeSignatureCount { count: other.len() });
        }
    };
    if envelope_sig.address != tx.payer {
        return Err(VerificationError::UnexpectedEnvelopeSigner {
            address: envelope_sig.address,
        });
    }
    check_index(tx, envelope_sig)?;

    // 4. The proposal key signed.
    let proposal = &tx.proposal_key;
    let proposer_signatures = if proposal.address == tx.payer {
        &tx.envelope_signatures
    } else {
        &tx.payload_signatures
    };
    if !proposer_signatures
        .iter()
        .any(|s| s.address == proposal.address && s.key_index == proposal.key_index)
    {
        return Err(VerificationError::ProposalKeyNotSigned {
            address: proposal.address,
            key_index: proposal.key_index,
        });
    }

    // 5. Payload signatures.
    let payload_message = tx.payload_message()?;
    for sig in &tx.payload_signatures {
        check_signature(keys, sig, &payload_message)?;
    }

    // 6. Envelope signature.
    let envelope_message = tx.envelope_message()?;
    check_signature(keys, envelope_sig, &envelope_message)?;

    Ok(())
}

fn check_index(tx: &Transaction, sig: &TransactionSignature) -> Result<(), VerificationError> {
    let expected = tx
        .signer_index(&sig.address)
        .ok_or(VerificationError::UnexpectedPayloadSigner {
            address: sig.address,
        })?;
    if expected != sig.signer_index {
        return Err(VerificationError::SignerIndexMismatch {
            address: sig.address,
            expected,
            found: sig.signer_index,
        });
    }
    Ok(())
}

fn check_signature(
    keys: &dyn KeyLookup,
    sig: &TransactionSignature,
    message: &[u8],
) -> Result<(), VerificationError> {
    let key = keys
        .account_key(&sig.address, sig.key_index)
        .ok_or(VerificationError::UnknownKey {
            address: sig.address,
            key_index: sig.key_index,
        })?;
    if !key
        .public_key
        .verify(message, &sig.signature, key.hash_algorithm)
    {
        return Err(VerificationError::InvalidSignature {
            address: sig.address,
            key_index: sig.key_index,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
