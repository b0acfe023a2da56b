//! An in-process keyring that implements [`Signer`].
//!
//! Good for tests, scripts, and emulator work. Anything holding real funds
//! should sit behind a signer whose keys never enter process memory.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use super::hash::HashAlgorithm;
use super::keys::PrivateKey;
use crate::address::Address;
use crate::transaction::signing::{Signer, SignerError, SignerOutput};
use crate::transaction::verification::{AccountPublicKey, KeyLookup};

/// One account key: its on-chain index, the private half, and the hash
/// algorithm it was registered with.
#[derive(Debug, Clone)]
pub struct AccountKey {
    pub index: u32,
    pub private_key: PrivateKey,
    pub hash_algorithm: HashAlgorithm,
}

/// Keys held in memory, grouped by account.
#[derive(Debug, Clone, Default)]
pub struct InMemorySigner {
    keys: HashMap<Address, Vec<AccountKey>>,
    preferred: HashMap<Address, u32>,
}

impl InMemorySigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key for `address`. A key with the same index replaces the
    /// old one.
    pub fn add_key(
        &mut self,
        address: Address,
        index: u32,
        private_key: PrivateKey,
        hash_algorithm: HashAlgorithm,
    ) {
        let keys = self.keys.entry(address).or_default();
        keys.retain(|k| k.index != index);
        keys.push(AccountKey {
            index,
            private_key,
            hash_algorithm,
        });
    }

    /// Builder-style [`Self::add_key`].
    pub fn with_key(
        mut self,
        address: Address,
        index: u32,
        private_key: PrivateKey,
        hash_algorithm: HashAlgorithm,
    ) -> Self {
        self.add_key(address, index, private_key, hash_algorithm);
        self
    }

    /// Sign for `address` with key `index` instead of the first one added.
    pub fn prefer_key(&mut self, address: Address, index: u32) {
        self.preferred.insert(address, index);
    }

    /// Addresses this signer holds keys for.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.keys.keys()
    }

    fn key_for(&self, address: &Address) -> Option<&AccountKey> {
        let keys = self.keys.get(address)?;
        match self.preferred.get(address) {
            Some(index) => keys.iter().find(|k| k.index == *index),
            None => keys.first(),
        }
    }
}

#[async_trait]
impl Signer for InMemorySigner {
    async fn sign(&self, address: Address, message: &[u8]) -> Result<SignerOutput, SignerError> {
        let key = self
            .key_for(&address)
            .ok_or(SignerError::NoKeyForAddress { address })?;

        let signature = key
            .private_key
            .sign(message, key.hash_algorithm)
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        debug!(
            %address,
            key_index = key.index,
            hash = %key.hash_algorithm,
            "signed with in-memory key"
        );

        Ok(SignerOutput {
            key_index: key.index,
            signature,
        })
    }
}

impl KeyLookup for InMemorySigner {
    fn account_key(&self, address: &Address, key_index: u32) -> Option<AccountPublicKey> {
        self.keys
            .get(address)?
            .iter()
            .find(|k| k.index == key_index)
            .map(|k| AccountPublicKey {
                public_key: k.private_key.public_key(),
                hash_algorithm: k.hash_algorithm,
            })
    }
}
