//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] enforces a disciplined construction flow:
//! set the required fields (or let a [`ChainContext`] fill the ones that
//! come from the chain), call `.build()`, and get back a `Draft`
//! [`Transaction`].
//!
//! The builder does not sign. That happens in [`super::signing`], which
//! keeps construction testable without key material.
//!
//! # Canonical Byte Format
//!
//! ```text
//! payload  = rlp([script, [arg...], ref_block, gas, proposer, key_index, seq, payer, [authorizer...]])
//! envelope = rlp([payload, [[signer_index, key_index, sig]...]])
//! id       = sha3_256(rlp([payload, [payload sig...], [envelope sig...]]))
//! ```
//!
//! Arguments enter the payload as their JSON wire bytes. Signature lists are
//! kept sorted by `(signer_index, key_index)`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::DomainTag;
use super::error::TransactionError;
use super::types::{hex_digest, BlockId, ProposalKey, SigningState, TransactionSignature};
use crate::address::Address;
use crate::cadence::{Argument, Value};
use crate::config::{SdkConfig, DEFAULT_GAS_LIMIT, MAX_GAS_LIMIT};
use crate::crypto::hash::sha3_256;
use crate::rlp::{self, RlpItem};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A ledger transaction at any stage of signing.
///
/// Fields are public so callers can inspect and adjust a draft. Doing so
/// after signing is allowed but costs the signatures: [`Transaction::state`]
/// compares digests of the current canonical bytes against the digests
/// recorded when the signatures were attached, and any difference reads as
/// `Draft`. The digests travel with the serialized form.
///
/// A transaction assembled elsewhere may carry signatures but no digests.
/// Those signatures are taken to cover the current content; a forged or
/// stale one fails [`verify_transaction`](super::verify_transaction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Script source. Signed as its UTF-8 bytes.
    pub script: String,

    /// Script arguments, in call order.
    #[serde(default)]
    pub arguments: Vec<Argument>,

    pub reference_block_id: BlockId,

    pub gas_limit: u64,

    pub proposal_key: ProposalKey,

    pub payer: Address,

    /// Accounts authorizing the script, in call order. Order is signed.
    #[serde(default)]
    pub authorizers: Vec<Address>,

    #[serde(default)]
    pub payload_signatures: Vec<TransactionSignature>,

    #[serde(default)]
    pub envelope_signatures: Vec<TransactionSignature>,

    /// SHA3-256 of the payload bytes the payload signatures cover.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex_digest")]
    signed_payload_digest: Option<[u8; 32]>,

    /// SHA3-256 of the envelope bytes the envelope signature covers.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex_digest")]
    signed_envelope_digest: Option<[u8; 32]>,
}

impl Transaction {
    /// The canonical signer list: proposer, then authorizers not already
    /// listed, then the payer if new. One entry per distinct address.
    pub fn signers(&self) -> Vec<Address> {
        let mut signers = Vec::with_capacity(self.authorizers.len() + 2);
        let candidates = std::iter::once(self.proposal_key.address)
            .chain(self.authorizers.iter().copied())
            .chain(std::iter::once(self.payer));
        for address in candidates {
            if !signers.contains(&address) {
                signers.push(address);
            }
        }
        signers
    }

    /// Position of `address` in [`Transaction::signers`].
    pub fn signer_index(&self, address: &Address) -> Option<u32> {
        self.signers()
            .iter()
            .position(|a| a == address)
            .map(|i| i as u32)
    }

    /// Signers that sign the payload: everyone except the payer, who signs
    /// the envelope instead.
    pub fn payload_signers(&self) -> Vec<Address> {
        self.signers()
            .into_iter()
            .filter(|a| *a != self.payer)
            .collect()
    }

    /// The payload as an RLP list, before encoding.
    pub fn payload_rlp(&self) -> RlpItem {
        RlpItem::list([
            RlpItem::bytes(self.script.as_bytes()),
            RlpItem::list(self.arguments.iter().map(|a| RlpItem::Bytes(a.encode()))),
            RlpItem::bytes(self.reference_block_id.as_bytes().as_slice()),
            RlpItem::uint(self.gas_limit),
            RlpItem::bytes(self.proposal_key.address.as_bytes().as_slice()),
            RlpItem::uint(u64::from(self.proposal_key.key_index)),
            RlpItem::uint(self.proposal_key.sequence_number),
            RlpItem::bytes(self.payer.as_bytes().as_slice()),
            RlpItem::list(
                self.authorizers
                    .iter()
                    .map(|a| RlpItem::bytes(a.as_bytes().as_slice())),
            ),
        ])
    }

    /// Canonical payload bytes.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(rlp::encode(&self.payload_rlp())?)
    }

    /// What payload signers sign: transaction tag ++ payload bytes.
    pub fn payload_message(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(DomainTag::Transaction.prefix(&self.payload_bytes()?))
    }

    /// The envelope as an RLP list: the payload list plus the payload
    /// signatures.
    pub fn envelope_rlp(&self) -> RlpItem {
        RlpItem::list([
            self.payload_rlp(),
            signatures_rlp(&self.payload_signatures),
        ])
    }

    pub fn envelope_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(rlp::encode(&self.envelope_rlp())?)
    }

    /// What the payer signs: transaction tag ++ envelope bytes.
    pub fn envelope_message(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(DomainTag::Transaction.prefix(&self.envelope_bytes()?))
    }

    /// The transaction id: SHA3-256 over payload and both signature lists.
    pub fn id(&self) -> Result<[u8; 32], TransactionError> {
        let full = RlpItem::list([
            self.payload_rlp(),
            signatures_rlp(&self.payload_signatures),
            signatures_rlp(&self.envelope_signatures),
        ]);
        Ok(sha3_256(&rlp::encode(&full)?))
    }

    pub fn id_hex(&self) -> Result<String, TransactionError> {
        Ok(hex::encode(self.id()?))
    }

    /// Current lifecycle state, derived from the signature digests.
    pub fn state(&self) -> SigningState {
        let Ok(payload) = self.payload_bytes() else {
            return SigningState::Draft;
        };
        let payload_covered = match self.signed_payload_digest {
            Some(digest) => digest == sha3_256(&payload),
            None => !self.payload_signatures.is_empty() && self.missing_payload_signer().is_none(),
        };
        if !payload_covered {
            return SigningState::Draft;
        }
        if self.envelope_signatures.is_empty() {
            return SigningState::PayloadSigned;
        }
        let envelope_covered = match self.signed_envelope_digest {
            Some(digest) => self
                .envelope_bytes()
                .is_ok_and(|envelope| sha3_256(&envelope) == digest),
            None => self.envelope_signatures.iter().any(|s| s.address == self.payer),
        };
        if envelope_covered {
            SigningState::EnvelopeSigned
        } else {
            SigningState::Draft
        }
    }

    /// The first payload signer without a payload signature, if any.
    pub fn missing_payload_signer(&self) -> Option<Address> {
        self.payload_signers()
            .into_iter()
            .find(|a| !self.payload_signatures.iter().any(|s| s.address == *a))
    }

    /// Drops every signature and recorded digest, returning to `Draft`.
    pub fn reset_signatures(&mut self) {
        self.payload_signatures.clear();
        self.envelope_signatures.clear();
        self.signed_payload_digest = None;
        self.signed_envelope_digest = None;
    }

    /// Fills (or replaces) the payload signature slot for `address` and
    /// `key_index`.
    pub fn add_payload_signature(
        &mut self,
        address: Address,
        key_index: u32,
        signature: Vec<u8>,
    ) -> Result<(), TransactionError> {
        let signature = self.slot(address, key_index, signature)?;
        insert_sorted(&mut self.payload_signatures, signature);
        Ok(())
    }

    /// Fills (or replaces) an envelope signature slot and records the digest
    /// of the envelope it covers.
    pub fn add_envelope_signature(
        &mut self,
        address: Address,
        key_index: u32,
        signature: Vec<u8>,
    ) -> Result<(), TransactionError> {
        let signature = self.slot(address, key_index, signature)?;
        let envelope = self.envelope_bytes()?;
        insert_sorted(&mut self.envelope_signatures, signature);
        self.signed_envelope_digest = Some(sha3_256(&envelope));
        Ok(())
    }

    /// Records `payload` as the bytes the payload signatures cover.
    pub(crate) fn seal_payload(&mut self, payload: &[u8]) {
        self.signed_payload_digest = Some(sha3_256(payload));
    }

    pub(crate) fn signed_payload_digest(&self) -> Option<[u8; 32]> {
        self.signed_payload_digest
    }

    fn slot(
        &self,
        address: Address,
        key_index: u32,
        signature: Vec<u8>,
    ) -> Result<TransactionSignature, TransactionError> {
        let signer_index = self
            .signer_index(&address)
            .ok_or(TransactionError::NotASigner { address })?;
        Ok(TransactionSignature {
            address,
            signer_index,
            key_index,
            signature,
        })
    }
}

fn signatures_rlp(signatures: &[TransactionSignature]) -> RlpItem {
    RlpItem::list(signatures.iter().map(|s| {
        RlpItem::list([
            RlpItem::uint(u64::from(s.signer_index)),
            RlpItem::uint(u64::from(s.key_index)),
            RlpItem::bytes(s.signature.as_slice()),
        ])
    }))
}

fn insert_sorted(list: &mut Vec<TransactionSignature>, signature: TransactionSignature) {
    match list.binary_search_by_key(&signature.slot(), TransactionSignature::slot) {
        Ok(pos) => list[pos] = signature,
        Err(pos) => list.insert(pos, signature),
    }
}

// ---------------------------------------------------------------------------
// ChainContext
// ---------------------------------------------------------------------------

/// Error type chain context implementations may return.
pub type ChainContextError = Box<dyn std::error::Error + Send + Sync>;

/// The chain-facing values a draft needs: a recent block to anchor to and
/// the proposer's current sequence number. Usually backed by an access
/// node client.
#[async_trait]
pub trait ChainContext: Send + Sync {
    async fn latest_block_id(&self) -> Result<BlockId, ChainContextError>;

    async fn sequence_number(
        &self,
        address: Address,
        key_index: u32,
    ) -> Result<u64, ChainContextError>;
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Transaction`].
///
/// # Required Fields
///
/// - `proposal_key` (or `proposer` plus a sequence number)
/// - `payer`
/// - `reference_block_id`
///
/// The gas limit defaults to [`DEFAULT_GAS_LIMIT`]. The script may be empty
/// but rarely should be.
///
/// # Example
///
/// ```rust
/// use flow_sdk::address::Address;
/// use flow_sdk::transaction::{BlockId, TransactionBuilder};
///
/// let alice = Address::from(1u64);
/// let tx = TransactionBuilder::new()
///     .script("transaction { prepare(signer: &Account) {} }")
///     .argument(42u64)
///     .reference_block_id(BlockId::new([7u8; 32]))
///     .proposal_key(alice, 0, 12)
///     .payer(alice)
///     .authorizer(alice)
///     .build()
///     .unwrap();
/// assert_eq!(tx.signers(), vec![alice]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    script: String,
    arguments: Vec<Argument>,
    reference_block_id: Option<BlockId>,
    gas_limit: Option<u64>,
    proposer: Option<(Address, u32)>,
    sequence_number: Option<u64>,
    payer: Option<Address>,
    authorizers: Vec<Address>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    /// Appends one argument.
    pub fn argument(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(Argument::new(value));
        self
    }

    /// Appends several arguments, preserving order.
    pub fn arguments<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.arguments
            .extend(values.into_iter().map(Argument::new));
        self
    }

    pub fn reference_block_id(mut self, id: BlockId) -> Self {
        self.reference_block_id = Some(id);
        self
    }

    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = Some(limit);
        self
    }

    /// Sets the full proposal key.
    pub fn proposal_key(mut self, address: Address, key_index: u32, sequence_number: u64) -> Self {
        self.proposer = Some((address, key_index));
        self.sequence_number = Some(sequence_number);
        self
    }

    /// Sets the proposer without a sequence number; [`Self::resolve`] looks
    /// it up.
    pub fn proposer(mut self, address: Address, key_index: u32) -> Self {
        self.proposer = Some((address, key_index));
        self
    }

    pub fn sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    pub fn payer(mut self, address: Address) -> Self {
        self.payer = Some(address);
        self
    }

    /// Appends an authorizer. Order is part of what gets signed.
    pub fn authorizer(mut self, address: Address) -> Self {
        self.authorizers.push(address);
        self
    }

    /// Fills the fields that come from the chain: an unset reference block
    /// from `ctx`, an unset sequence number from `ctx`, and an unset gas
    /// limit from `config`. Fields the caller already set are left alone.
    pub async fn resolve(
        mut self,
        ctx: &dyn ChainContext,
        config: &SdkConfig,
    ) -> Result<Self, TransactionError> {
        if self.reference_block_id.is_none() {
            let id = ctx
                .latest_block_id()
                .await
                .map_err(|e| TransactionError::ChainContext(e.to_string()))?;
            debug!(block = %id, "resolved reference block");
            self.reference_block_id = Some(id);
        }

        if self.sequence_number.is_none() {
            let (address, key_index) = self
                .proposer
                .ok_or(TransactionError::Incomplete { field: "proposer" })?;
            let seq = ctx
                .sequence_number(address, key_index)
                .await
                .map_err(|e| TransactionError::ChainContext(e.to_string()))?;
            debug!(%address, key_index, sequence_number = seq, "resolved sequence number");
            self.sequence_number = Some(seq);
        }

        if self.gas_limit.is_none() {
            self.gas_limit = Some(config.default_gas_limit);
        }

        Ok(self)
    }

    /// Consumes the builder and returns a `Draft` transaction.
    pub fn build(self) -> Result<Transaction, TransactionError> {
        let (address, key_index) = self
            .proposer
            .ok_or(TransactionError::Incomplete { field: "proposer" })?;
        let sequence_number = self.sequence_number.ok_or(TransactionError::Incomplete {
            field: "sequence_number",
        })?;
        let payer = self
            .payer
            .ok_or(TransactionError::Incomplete { field: "payer" })?;
        let reference_block_id = self.reference_block_id.ok_or(TransactionError::Incomplete {
            field: "reference_block_id",
        })?;

        let gas_limit = self.gas_limit.unwrap_or(DEFAULT_GAS_LIMIT);
        if gas_limit > MAX_GAS_LIMIT {
            return Err(TransactionError::GasLimitTooHigh {
                limit: gas_limit,
                max: MAX_GAS_LIMIT,
            });
        }

        Ok(Transaction {
            script: self.script,
            arguments: self.arguments,
            reference_block_id,
            gas_limit,
            proposal_key: ProposalKey::new(address, key_index, sequence_number),
            payer,
            authorizers: self.authorizers,
            payload_signatures: Vec::new(),
            envelope_signatures: Vec::new(),
            signed_payload_digest: None,
            signed_envelope_digest: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from(n)
    }

    fn base() -> TransactionBuilder {
        TransactionBuilder::new()
            .script("transaction {}")
            .reference_block_id(BlockId::new([0xAB; 32]))
            .proposal_key(addr(1), 0, 7)
            .payer(addr(2))
    }

    #[test]
    fn build_requires_fields() {
        let err = TransactionBuilder::new().build().unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Incomplete { field: "proposer" }
        ));

        let err = TransactionBuilder::new()
            .proposal_key(addr(1), 0, 0)
            .reference_block_id(BlockId::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, TransactionError::Incomplete { field: "payer" }));

        let err = TransactionBuilder::new()
            .proposer(addr(1), 0)
            .payer(addr(1))
            .reference_block_id(BlockId::default())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Incomplete {
                field: "sequence_number"
            }
        ));
    }

    #[test]
    fn build_rejects_excessive_gas() {
        let err = base().gas_limit(MAX_GAS_LIMIT + 1).build().unwrap_err();
        assert!(matches!(err, TransactionError::GasLimitTooHigh { .. }));
    }

    #[test]
    fn build_defaults_gas_limit() {
        let tx = base().build().unwrap();
        assert_eq!(tx.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(tx.state(), SigningState::Draft);
    }

    #[test]
    fn signer_order_is_proposer_authorizers_payer() {
        let tx = base()
            .authorizer(addr(3))
            .authorizer(addr(1))
            .authorizer(addr(3))
            .build()
            .unwrap();
        assert_eq!(tx.signers(), vec![addr(1), addr(3), addr(2)]);
        assert_eq!(tx.signer_index(&addr(2)), Some(2));
        assert_eq!(tx.signer_index(&addr(9)), None);
        assert_eq!(tx.payload_signers(), vec![addr(1), addr(3)]);
    }

    #[test]
    fn payer_as_proposer_keeps_index_zero() {
        let tx = TransactionBuilder::new()
            .reference_block_id(BlockId::default())
            .proposal_key(addr(5), 1, 0)
            .payer(addr(5))
            .authorizer(addr(6))
            .build()
            .unwrap();
        assert_eq!(tx.signers(), vec![addr(5), addr(6)]);
        assert_eq!(tx.payload_signers(), vec![addr(6)]);
    }

    #[test]
    fn payload_bytes_are_deterministic_and_field_sensitive() {
        let a = base().argument(1u8).build().unwrap();
        let b = base().argument(1u8).build().unwrap();
        assert_eq!(a.payload_bytes().unwrap(), b.payload_bytes().unwrap());

        let c = base().argument(2u8).build().unwrap();
        assert_ne!(a.payload_bytes().unwrap(), c.payload_bytes().unwrap());

        let mut d = a.clone();
        d.proposal_key.sequence_number += 1;
        assert_ne!(a.payload_bytes().unwrap(), d.payload_bytes().unwrap());
    }

    #[test]
    fn payload_layout_matches_canonical_form() {
        let tx = base().argument(true).authorizer(addr(1)).build().unwrap();
        let expected = rlp::encode(&RlpItem::list([
            RlpItem::bytes("transaction {}"),
            RlpItem::list([RlpItem::bytes(r#"{"type":"Bool","value":true}"#)]),
            RlpItem::bytes(vec![0xAB; 32]),
            RlpItem::uint(DEFAULT_GAS_LIMIT),
            RlpItem::bytes(addr(1).as_bytes().to_vec()),
            RlpItem::uint(0),
            RlpItem::uint(7),
            RlpItem::bytes(addr(2).as_bytes().to_vec()),
            RlpItem::list([RlpItem::bytes(addr(1).as_bytes().to_vec())]),
        ]))
        .unwrap();
        assert_eq!(tx.payload_bytes().unwrap(), expected);
    }

    #[test]
    fn messages_carry_transaction_tag() {
        let tx = base().build().unwrap();
        let msg = tx.payload_message().unwrap();
        assert_eq!(&msg[..32], &DomainTag::Transaction.bytes());
        assert_eq!(&msg[32..], tx.payload_bytes().unwrap().as_slice());
        let env = tx.envelope_message().unwrap();
        assert_eq!(&env[32..], tx.envelope_bytes().unwrap().as_slice());
    }

    #[test]
    fn signatures_stay_sorted_and_replace_same_slot() {
        let mut tx = base().authorizer(addr(3)).build().unwrap();
        tx.add_payload_signature(addr(3), 0, vec![3]).unwrap();
        tx.add_payload_signature(addr(1), 2, vec![12]).unwrap();
        tx.add_payload_signature(addr(1), 0, vec![10]).unwrap();
        tx.add_payload_signature(addr(1), 0, vec![11]).unwrap();

        let slots: Vec<_> = tx.payload_signatures.iter().map(|s| s.slot()).collect();
        assert_eq!(slots, vec![(0, 0), (0, 2), (1, 0)]);
        assert_eq!(tx.payload_signatures[0].signature, vec![11]);
    }

    #[test]
    fn unknown_signer_is_rejected() {
        let mut tx = base().build().unwrap();
        let err = tx.add_payload_signature(addr(42), 0, vec![1]).unwrap_err();
        assert!(matches!(err, TransactionError::NotASigner { .. }));
    }

    #[test]
    fn envelope_covers_payload_signatures() {
        let mut tx = base().build().unwrap();
        let before = tx.envelope_bytes().unwrap();
        tx.add_payload_signature(addr(1), 0, vec![1, 2, 3]).unwrap();
        assert_ne!(before, tx.envelope_bytes().unwrap());
    }

    #[test]
    fn id_changes_with_signatures() {
        let mut tx = base().build().unwrap();
        let unsigned = tx.id().unwrap();
        tx.add_payload_signature(addr(1), 0, vec![9]).unwrap();
        assert_ne!(unsigned, tx.id().unwrap());
        assert_eq!(tx.id_hex().unwrap().len(), 64);
    }

    #[test]
    fn state_follows_digests() {
        let mut tx = base().build().unwrap();
        assert_eq!(tx.state(), SigningState::Draft);

        tx.add_payload_signature(addr(1), 0, vec![1]).unwrap();
        let payload = tx.payload_bytes().unwrap();
        tx.seal_payload(&payload);
        assert_eq!(tx.state(), SigningState::PayloadSigned);

        tx.add_envelope_signature(addr(2), 0, vec![2]).unwrap();
        assert_eq!(tx.state(), SigningState::EnvelopeSigned);

        tx.gas_limit -= 1;
        assert_eq!(tx.state(), SigningState::Draft);

        tx.reset_signatures();
        assert!(tx.payload_signatures.is_empty());
        assert!(tx.envelope_signatures.is_empty());
    }

    #[test]
    fn touching_payload_signatures_after_envelope_drops_to_draft() {
        let mut tx = base().build().unwrap();
        let payload = tx.payload_bytes().unwrap();
        tx.seal_payload(&payload);
        tx.add_envelope_signature(addr(2), 0, vec![2]).unwrap();
        assert_eq!(tx.state(), SigningState::EnvelopeSigned);

        tx.add_payload_signature(addr(1), 0, vec![1]).unwrap();
        assert_eq!(tx.state(), SigningState::Draft);
    }

    fn reload(tx: &Transaction) -> Transaction {
        serde_json::from_str(&serde_json::to_string(tx).unwrap()).unwrap()
    }

    #[test]
    fn json_roundtrip_keeps_signing_state() {
        let mut tx = base().argument("hi").authorizer(addr(1)).build().unwrap();
        assert_eq!(reload(&tx).state(), SigningState::Draft);

        tx.add_payload_signature(addr(1), 0, vec![0xAA]).unwrap();
        let payload = tx.payload_bytes().unwrap();
        tx.seal_payload(&payload);
        let back = reload(&tx);
        assert_eq!(back, tx);
        assert_eq!(back.state(), SigningState::PayloadSigned);

        tx.add_envelope_signature(addr(2), 0, vec![0xBB]).unwrap();
        let back = reload(&tx);
        assert_eq!(back.state(), SigningState::EnvelopeSigned);
        assert_eq!(back.id().unwrap(), tx.id().unwrap());
    }

    #[test]
    fn reloaded_digest_still_catches_edits() {
        let mut tx = base().build().unwrap();
        tx.add_payload_signature(addr(1), 0, vec![1]).unwrap();
        let payload = tx.payload_bytes().unwrap();
        tx.seal_payload(&payload);

        let mut back = reload(&tx);
        back.proposal_key.sequence_number += 1;
        assert_eq!(back.state(), SigningState::Draft);
    }

    #[test]
    fn draft_json_has_no_digest_members() {
        let json = serde_json::to_value(base().build().unwrap()).unwrap();
        assert!(json.get("signed_payload_digest").is_none());
        assert!(json.get("signed_envelope_digest").is_none());
    }

    #[test]
    fn malformed_digest_is_rejected() {
        let mut json = serde_json::to_value(base().build().unwrap()).unwrap();
        json["signed_payload_digest"] = serde_json::Value::from("abcd");
        assert!(serde_json::from_value::<Transaction>(json).is_err());
    }

    #[test]
    fn signatures_without_digests_are_taken_as_given() {
        let mut tx = base().authorizer(addr(3)).build().unwrap();
        tx.add_payload_signature(addr(1), 0, vec![1]).unwrap();
        assert_eq!(tx.missing_payload_signer(), Some(addr(3)));
        assert_eq!(tx.state(), SigningState::Draft);

        tx.add_payload_signature(addr(3), 0, vec![3]).unwrap();
        assert_eq!(tx.missing_payload_signer(), None);
        assert_eq!(tx.state(), SigningState::PayloadSigned);

        let mut json = serde_json::to_value(&tx).unwrap();
        json["envelope_signatures"] = serde_json::json!([{
            "address": "0x0000000000000002",
            "signer_index": 2,
            "key_index": 0,
            "signature": "bb"
        }]);
        let assembled: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(assembled.state(), SigningState::EnvelopeSigned);
    }

    struct FixedChain;

    #[async_trait]
    impl ChainContext for FixedChain {
        async fn latest_block_id(&self) -> Result<BlockId, ChainContextError> {
            Ok(BlockId::new([0x11; 32]))
        }

        async fn sequence_number(
            &self,
            _address: Address,
            key_index: u32,
        ) -> Result<u64, ChainContextError> {
            Ok(100 + u64::from(key_index))
        }
    }

    struct DownChain;

    #[async_trait]
    impl ChainContext for DownChain {
        async fn latest_block_id(&self) -> Result<BlockId, ChainContextError> {
            Err("access node unreachable".into())
        }

        async fn sequence_number(
            &self,
            _address: Address,
            _key_index: u32,
        ) -> Result<u64, ChainContextError> {
            Err("access node unreachable".into())
        }
    }

    #[tokio::test]
    async fn resolve_fills_unset_fields() {
        let config = SdkConfig {
            default_gas_limit: 500,
            ..SdkConfig::default()
        };
        let tx = TransactionBuilder::new()
            .proposer(addr(1), 3)
            .payer(addr(1))
            .resolve(&FixedChain, &config)
            .await
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(tx.reference_block_id, BlockId::new([0x11; 32]));
        assert_eq!(tx.proposal_key.sequence_number, 103);
        assert_eq!(tx.gas_limit, 500);
    }

    #[tokio::test]
    async fn resolve_keeps_caller_values() {
        let tx = base()
            .gas_limit(10)
            .resolve(&FixedChain, &SdkConfig::default())
            .await
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(tx.reference_block_id, BlockId::new([0xAB; 32]));
        assert_eq!(tx.proposal_key.sequence_number, 7);
        assert_eq!(tx.gas_limit, 10);
    }

    #[tokio::test]
    async fn resolve_surfaces_chain_errors() {
        let err = TransactionBuilder::new()
            .proposer(addr(1), 0)
            .resolve(&DownChain, &SdkConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::ChainContext(msg) if msg.contains("unreachable")));
    }
}
