//! The signing engine.
//!
//! Signing is a separate step from building because the key material may
//! not be available at construction time (hardware wallet, remote signer,
//! a second party co-signing). The engine only knows signers through the
//! [`Signer`] trait and treats every call as an opaque await: timeouts and
//! retries belong to the signer, not to us.
//!
//! # Procedure
//!
//! 1. **Payload**: every payload signer (all distinct signers except the
//!    payer) signs `tag ++ payload`. Requests go out concurrently; results
//!    come back in signer order regardless of who answers first.
//! 2. **Envelope**: the payer signs `tag ++ envelope`, where the envelope
//!    covers the payload and every payload signature.
//!
//! Step 2 refuses to run if the payload changed since step 1 finished, or
//! if a payload signer has not signed yet.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::builder::Transaction;
use super::domain::DomainTag;
use super::error::TransactionError;
use crate::address::Address;
use crate::config::SdkConfig;
use crate::crypto::hash::sha3_256;

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Errors a signer capability may report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The signer holds no key for this address.
    #[error("no key for address {address}")]
    NoKeyForAddress { address: Address },

    /// Key material was found but producing the signature failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The signer could not be reached (device unplugged, remote down).
    #[error("signer unavailable: {0}")]
    Unavailable(String),
}

/// What a signer hands back: the key it used and the raw signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerOutput {
    pub key_index: u32,
    pub signature: Vec<u8>,
}

/// Anything that can sign a message on behalf of an account.
///
/// `message` already carries its domain tag. Implementations hash it with
/// whatever algorithm the account key was registered with and must report
/// which key index they used.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, address: Address, message: &[u8]) -> Result<SignerOutput, SignerError>;
}

fn signer_failure(address: Address, err: SignerError) -> TransactionError {
    match err {
        SignerError::NoKeyForAddress { .. } => TransactionError::MissingSigner { address },
        other => TransactionError::SignerFailed {
            address,
            source: other,
        },
    }
}

// ---------------------------------------------------------------------------
// SigningEngine
// ---------------------------------------------------------------------------

/// Collects signatures for transactions from registered signers.
///
/// Signers are registered per address. The same signer may be registered
/// for several addresses (an in-memory keyring usually is).
pub struct SigningEngine {
    config: SdkConfig,
    signers: HashMap<Address, Arc<dyn Signer>>,
}

impl SigningEngine {
    pub fn new(config: SdkConfig) -> Self {
        Self {
            config,
            signers: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Registers `signer` for `address`, replacing any previous one.
    pub fn register(&mut self, address: Address, signer: Arc<dyn Signer>) {
        self.signers.insert(address, signer);
    }

    /// Builder-style [`Self::register`].
    pub fn with_signer(mut self, address: Address, signer: Arc<dyn Signer>) -> Self {
        self.register(address, signer);
        self
    }

    fn signer_for(&self, address: Address) -> Result<Arc<dyn Signer>, TransactionError> {
        self.signers
            .get(&address)
            .cloned()
            .ok_or(TransactionError::MissingSigner { address })
    }

    /// Draft → PayloadSigned.
    ///
    /// Clears any earlier signatures first, so running this twice over the
    /// same draft signs the same bytes both times. Every required signer is
    /// looked up before any of them is called: a missing one fails the step
    /// without side effects on the signers.
    pub async fn sign_payload(&self, tx: &mut Transaction) -> Result<(), TransactionError> {
        tx.reset_signatures();

        let payload = tx.payload_bytes()?;
        let message = DomainTag::Transaction.prefix(&payload);

        let parties = tx
            .payload_signers()
            .into_iter()
            .map(|address| Ok((address, self.signer_for(address)?)))
            .collect::<Result<Vec<_>, TransactionError>>()?;

        debug!(
            network = %self.config.network,
            signers = parties.len(),
            payload_len = payload.len(),
            "collecting payload signatures"
        );

        let message = message.as_slice();
        let outputs = try_join_all(parties.iter().map(|(address, signer)| async move {
            signer
                .sign(*address, message)
                .await
                .map(|output| (*address, output))
                .map_err(|e| signer_failure(*address, e))
        }))
        .await?;

        for (address, output) in outputs {
            debug!(%address, key_index = output.key_index, "payload signature attached");
            tx.add_payload_signature(address, output.key_index, output.signature)?;
        }
        tx.seal_payload(&payload);

        Ok(())
    }

    /// PayloadSigned → EnvelopeSigned.
    ///
    /// Fails with `PreparingTransactionFailed` (and resets the transaction
    /// to `Draft`) if the payload changed since it was signed. A payload
    /// signer with no signature yet fails with `MissingPayloadSignature`
    /// and leaves the signatures already collected in place, so a
    /// transaction passed between parties can be finished by whoever holds
    /// the last key.
    pub async fn sign_envelope(&self, tx: &mut Transaction) -> Result<(), TransactionError> {
        let payload = tx.payload_bytes()?;
        if tx
            .signed_payload_digest()
            .is_some_and(|signed| signed != sha3_256(&payload))
        {
            let reason = "payload changed since it was signed".to_string();
            warn!(%reason, "envelope signing refused, transaction reset to draft");
            tx.reset_signatures();
            return Err(TransactionError::PreparingTransactionFailed { reason });
        }
        if let Some(address) = tx.missing_payload_signer() {
            warn!(%address, "envelope signing refused, payload signature missing");
            return Err(TransactionError::MissingPayloadSignature { address });
        }
        tx.seal_payload(&payload);

        let payer = tx.payer;
        let signer = self.signer_for(payer)?;
        let message = tx.envelope_message()?;

        let output = signer
            .sign(payer, &message)
            .await
            .map_err(|e| signer_failure(payer, e))?;

        tx.envelope_signatures.clear();
        tx.add_envelope_signature(payer, output.key_index, output.signature)?;
        debug!(%payer, key_index = output.key_index, "envelope signature attached");

        Ok(())
    }

    /// Runs both steps. On success the transaction is `EnvelopeSigned`.
    pub async fn sign(&self, tx: &mut Transaction) -> Result<(), TransactionError> {
        self.sign_payload(tx).await?;
        self.sign_envelope(tx).await?;
        info!(
            network = %self.config.network,
            id = %tx.id_hex()?,
            payload_signatures = tx.payload_signatures.len(),
            "transaction signed"
        );
        Ok(())
    }

    /// Signs an arbitrary message for `address` under the user domain tag.
    pub async fn sign_user_message(
        &self,
        address: Address,
        message: &[u8],
    ) -> Result<SignerOutput, TransactionError> {
        let signer = self.signer_for(address)?;
        let tagged = DomainTag::User.prefix(message);
        signer
            .sign(address, &tagged)
            .await
            .map_err(|e| signer_failure(address, e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::types::{BlockId, SigningState};
    use std::sync::Mutex;

    /// Records every message it is asked to sign and "signs" with a
    /// recognisable byte pattern.
    struct RecordingSigner {
        key_index: u32,
        seen: Mutex<Vec<(Address, Vec<u8>)>>,
    }

    impl RecordingSigner {
        fn new(key_index: u32) -> Arc<Self> {
            Arc::new(Self {
                key_index,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<(Address, Vec<u8>)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Signer for RecordingSigner {
        async fn sign(
            &self,
            address: Address,
            message: &[u8],
        ) -> Result<SignerOutput, SignerError> {
            self.seen.lock().unwrap().push((address, message.to_vec()));
            Ok(SignerOutput {
                key_index: self.key_index,
                signature: address.as_bytes().to_vec(),
            })
        }
    }

    struct BrokenSigner(SignerError);

    #[async_trait]
    impl Signer for BrokenSigner {
        async fn sign(
            &self,
            _address: Address,
            _message: &[u8],
        ) -> Result<SignerOutput, SignerError> {
            Err(self.0.clone())
        }
    }

    fn addr(n: u64) -> Address {
        Address::from(n)
    }

    fn draft(proposer: u64, authorizers: &[u64], payer: u64) -> Transaction {
        let mut builder = TransactionBuilder::new()
            .script("transaction {}")
            .reference_block_id(BlockId::new([1; 32]))
            .proposal_key(addr(proposer), 0, 5)
            .payer(addr(payer));
        for a in authorizers {
            builder = builder.authorizer(addr(*a));
        }
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn proposer_authorizer_with_separate_payer() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default())
            .with_signer(addr(1), signer.clone())
            .with_signer(addr(2), signer.clone());

        let mut tx = draft(1, &[1], 2);
        engine.sign_payload(&mut tx).await.unwrap();
        assert_eq!(tx.state(), SigningState::PayloadSigned);
        assert_eq!(tx.payload_signatures.len(), 1);
        assert_eq!(tx.payload_signatures[0].address, addr(1));
        assert_eq!(tx.payload_signatures[0].signer_index, 0);

        engine.sign_envelope(&mut tx).await.unwrap();
        assert_eq!(tx.state(), SigningState::EnvelopeSigned);
        assert_eq!(tx.envelope_signatures.len(), 1);
        assert_eq!(tx.envelope_signatures[0].address, addr(2));
        assert_eq!(tx.envelope_signatures[0].signer_index, 1);

        let seen = signer.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1, tx.payload_message().unwrap());
        assert_eq!(seen[1].0, addr(2));
        assert_eq!(seen[1].1, tx.envelope_message().unwrap());
    }

    #[tokio::test]
    async fn payer_as_sole_signer_skips_payload() {
        let signer = RecordingSigner::new(3);
        let engine = SigningEngine::new(SdkConfig::default()).with_signer(addr(7), signer.clone());

        let mut tx = draft(7, &[7], 7);
        engine.sign(&mut tx).await.unwrap();
        assert!(tx.payload_signatures.is_empty());
        assert_eq!(tx.envelope_signatures.len(), 1);
        assert_eq!(tx.envelope_signatures[0].key_index, 3);
        assert_eq!(signer.seen().len(), 1);
        assert_eq!(tx.state(), SigningState::EnvelopeSigned);
    }

    #[tokio::test]
    async fn every_authorizer_signs_the_same_payload() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default())
            .with_signer(addr(1), signer.clone())
            .with_signer(addr(3), signer.clone())
            .with_signer(addr(4), signer.clone())
            .with_signer(addr(2), signer.clone());

        let mut tx = draft(1, &[4, 3], 2);
        engine.sign_payload(&mut tx).await.unwrap();

        let indices: Vec<_> = tx.payload_signatures.iter().map(|s| s.signer_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(tx.payload_signatures[1].address, addr(4));

        let message = tx.payload_message().unwrap();
        assert!(signer.seen().iter().all(|(_, m)| *m == message));
    }

    #[tokio::test]
    async fn missing_signer_fails_before_any_call() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default()).with_signer(addr(1), signer.clone());

        let mut tx = draft(1, &[3], 2);
        let err = engine.sign_payload(&mut tx).await.unwrap_err();
        assert!(matches!(err, TransactionError::MissingSigner { address } if address == addr(3)));
        assert!(signer.seen().is_empty());
    }

    #[tokio::test]
    async fn missing_payer_signer_fails_envelope() {
        let engine =
            SigningEngine::new(SdkConfig::default()).with_signer(addr(1), RecordingSigner::new(0));
        let mut tx = draft(1, &[], 2);
        engine.sign_payload(&mut tx).await.unwrap();
        let err = engine.sign_envelope(&mut tx).await.unwrap_err();
        assert!(matches!(err, TransactionError::MissingSigner { address } if address == addr(2)));
    }

    #[tokio::test]
    async fn no_key_maps_to_missing_signer() {
        let engine = SigningEngine::new(SdkConfig::default()).with_signer(
            addr(1),
            Arc::new(BrokenSigner(SignerError::NoKeyForAddress { address: addr(1) })),
        );
        let mut tx = draft(1, &[], 2);
        let err = engine.sign_payload(&mut tx).await.unwrap_err();
        assert!(matches!(err, TransactionError::MissingSigner { .. }));
    }

    #[tokio::test]
    async fn other_signer_errors_are_wrapped() {
        let engine = SigningEngine::new(SdkConfig::default()).with_signer(
            addr(1),
            Arc::new(BrokenSigner(SignerError::Unavailable("device locked".into()))),
        );
        let mut tx = draft(1, &[], 2);
        let err = engine.sign_payload(&mut tx).await.unwrap_err();
        assert!(matches!(
            err,
            TransactionError::SignerFailed {
                source: SignerError::Unavailable(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn stale_sequence_number_blocks_envelope() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default())
            .with_signer(addr(1), signer.clone())
            .with_signer(addr(2), signer.clone());

        let mut tx = draft(1, &[], 2);
        engine.sign_payload(&mut tx).await.unwrap();
        tx.proposal_key.sequence_number += 1;
        assert_eq!(tx.state(), SigningState::Draft);

        let err = engine.sign_envelope(&mut tx).await.unwrap_err();
        assert!(matches!(
            err,
            TransactionError::PreparingTransactionFailed { .. }
        ));
        assert!(tx.payload_signatures.is_empty());
        assert!(tx.envelope_signatures.is_empty());
    }

    #[tokio::test]
    async fn envelope_without_payload_step_is_refused() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default())
            .with_signer(addr(1), signer.clone())
            .with_signer(addr(2), signer.clone());
        let mut tx = draft(1, &[], 2);
        let err = engine.sign_envelope(&mut tx).await.unwrap_err();
        assert!(matches!(
            err,
            TransactionError::MissingPayloadSignature { address } if address == addr(1)
        ));
        assert!(signer.seen().is_empty());
        assert_eq!(tx.state(), SigningState::Draft);
    }

    #[tokio::test]
    async fn payer_only_draft_goes_straight_to_envelope() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default()).with_signer(addr(1), signer.clone());
        let mut tx = draft(1, &[], 1);
        engine.sign_envelope(&mut tx).await.unwrap();
        assert_eq!(tx.state(), SigningState::EnvelopeSigned);
        assert_eq!(signer.seen().len(), 1);
    }

    #[tokio::test]
    async fn missing_payload_signature_keeps_the_others() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default())
            .with_signer(addr(1), signer.clone())
            .with_signer(addr(3), signer.clone())
            .with_signer(addr(2), signer.clone());

        let mut tx = draft(1, &[3], 2);
        engine.sign_payload(&mut tx).await.unwrap();
        tx.payload_signatures.retain(|s| s.address != addr(3));

        let err = engine.sign_envelope(&mut tx).await.unwrap_err();
        assert!(matches!(
            err,
            TransactionError::MissingPayloadSignature { address } if address == addr(3)
        ));
        assert_eq!(tx.payload_signatures.len(), 1);
        assert_eq!(tx.payload_signatures[0].address, addr(1));
    }

    #[tokio::test]
    async fn reloaded_payload_signed_transaction_finishes() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default())
            .with_signer(addr(1), signer.clone())
            .with_signer(addr(2), signer.clone());

        let mut tx = draft(1, &[1], 2);
        engine.sign_payload(&mut tx).await.unwrap();
        let json = serde_json::to_string(&tx).unwrap();

        let mut back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state(), SigningState::PayloadSigned);
        engine.sign_envelope(&mut back).await.unwrap();
        assert_eq!(back.state(), SigningState::EnvelopeSigned);
        assert_eq!(back.payload_signatures, tx.payload_signatures);
        assert!(back.to_submittable().is_ok());
    }

    #[tokio::test]
    async fn foreign_payload_signatures_are_adopted() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default()).with_signer(addr(2), signer.clone());

        // The proposer signed on another machine; only the payer is local.
        let mut tx = draft(1, &[1], 2);
        tx.add_payload_signature(addr(1), 0, vec![0x01; 64]).unwrap();

        engine.sign_envelope(&mut tx).await.unwrap();
        assert_eq!(tx.state(), SigningState::EnvelopeSigned);
        assert_eq!(signer.seen()[0].1, tx.envelope_message().unwrap());
    }

    #[tokio::test]
    async fn signing_twice_signs_identical_content() {
        let signer = RecordingSigner::new(0);
        let engine = SigningEngine::new(SdkConfig::default())
            .with_signer(addr(1), signer.clone())
            .with_signer(addr(2), signer.clone());

        let mut tx = draft(1, &[1], 2);
        engine.sign(&mut tx).await.unwrap();
        let first = tx.clone();
        engine.sign(&mut tx).await.unwrap();

        assert_eq!(first.payload_bytes().unwrap(), tx.payload_bytes().unwrap());
        assert_eq!(first.payload_signatures, tx.payload_signatures);
        assert_eq!(first.envelope_signatures, tx.envelope_signatures);

        let seen = signer.seen();
        assert_eq!(seen[0].1, seen[2].1);
        assert_eq!(seen[1].1, seen[3].1);
    }

    #[tokio::test]
    async fn user_message_uses_user_tag() {
        let signer = RecordingSigner::new(4);
        let engine = SigningEngine::new(SdkConfig::default()).with_signer(addr(9), signer.clone());

        let out = engine.sign_user_message(addr(9), b"hello").await.unwrap();
        assert_eq!(out.key_index, 4);

        let seen = signer.seen();
        assert_eq!(seen[0].1, DomainTag::User.prefix(b"hello"));
    }
}
