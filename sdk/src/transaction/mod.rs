//! # Transaction Module
//!
//! Construction, signing, verification and submission shaping for ledger
//! transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — BlockId, ProposalKey, TransactionSignature, SigningState
//! domain.rs       — 32-byte domain separation tags
//! builder.rs      — Transaction, its canonical bytes, TransactionBuilder, ChainContext
//! signing.rs      — Signer trait and the SigningEngine
//! verification.rs — Structural and cryptographic verification
//! submission.rs   — Access-node request body
//! error.rs        — TransactionError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`], optionally [`resolved`](TransactionBuilder::resolve)
//!    against a [`ChainContext`]. The result is a `Draft`.
//! 2. **Sign payload**: every non-payer signer signs the payload.
//! 3. **Sign envelope**: the payer signs payload plus payload signatures.
//! 4. **Submit**: [`Transaction::to_submittable`] shapes the request body.
//!
//! ## Design Decisions
//!
//! - Every signed message starts with a [`DomainTag`]. Forgetting it is not
//!   a style issue; the chain will reject the signature.
//! - Signer indices are positions in the deduplicated signer list
//!   `[proposer, authorizers.., payer]`. An address signing with several
//!   keys shares one signer index; key indices tell the signatures apart.
//! - The lifecycle state is derived from digests of the signed bytes rather
//!   than stored, so editing a signed transaction can't leave it looking
//!   signed. The digests are serialized with the transaction, so a
//!   half-signed transaction can be handed to the next party as JSON.

pub mod builder;
pub mod domain;
pub mod error;
pub mod signing;
pub mod submission;
pub mod types;
pub mod verification;

pub use builder::{ChainContext, ChainContextError, Transaction, TransactionBuilder};
pub use domain::DomainTag;
pub use error::TransactionError;
pub use signing::{Signer, SignerError, SignerOutput, SigningEngine};
pub use submission::{SubmittableProposalKey, SubmittableSignature, SubmittableTransaction};
pub use types::{BlockId, ProposalKey, SigningState, TransactionSignature};
pub use verification::{verify_transaction, AccountPublicKey, KeyLookup, VerificationError};
