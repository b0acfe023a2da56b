//! Errors raised while assembling and signing transactions.

use thiserror::Error;

use super::signing::SignerError;
use super::types::SigningState;
use crate::address::Address;
use crate::rlp::EncodeError;

/// Errors from the builder, the signing engine and the submission form.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// `build()` was called before a required field was set.
    #[error("transaction is incomplete: missing {field}")]
    Incomplete { field: &'static str },

    #[error("invalid block id: {input}")]
    InvalidBlockId { input: String },

    #[error("gas limit {limit} exceeds the maximum of {max}")]
    GasLimitTooHigh { limit: u64, max: u64 },

    /// The address is not one of the transaction's signers.
    #[error("{address} is not a signer of this transaction")]
    NotASigner { address: Address },

    /// No signer capability can produce a signature for a required address.
    #[error("no signer registered for {address}")]
    MissingSigner { address: Address },

    /// A registered signer failed for a reason other than missing keys.
    #[error("signer for {address} failed: {source}")]
    SignerFailed {
        address: Address,
        #[source]
        source: SignerError,
    },

    /// Signed content changed underneath the transaction. Signatures have
    /// been cleared; start again from `Draft`.
    #[error("preparing transaction failed: {reason}")]
    PreparingTransactionFailed { reason: String },

    /// The envelope was requested before every payload signer had signed.
    #[error("payload signature from {address} is missing")]
    MissingPayloadSignature { address: Address },

    /// Only fully signed transactions can be submitted.
    #[error("transaction is not submittable in state {state}")]
    NotSubmittable { state: SigningState },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The chain context could not supply a reference block or sequence
    /// number.
    #[error("chain context: {0}")]
    ChainContext(String),
}
