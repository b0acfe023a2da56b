//! Key files: the JSON the `keygen` subcommand writes and `sign` reads.
//!
//! ```json
//! { "keys": [ { "address": "0xf8d6e0586b0a20c7", "key_index": 0,
//!               "hash_algorithm": "SHA3_256", "private_key": "…",
//!               "public_key": "…" } ] }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use flow_sdk::address::Address;
use flow_sdk::crypto::{HashAlgorithm, InMemorySigner, PrivateKey};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyFile {
    pub keys: Vec<KeyEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEntry {
    pub address: Address,
    #[serde(default)]
    pub key_index: u32,
    pub hash_algorithm: HashAlgorithm,
    pub private_key: String,
    /// Informational; recomputed from the private key on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl KeyEntry {
    pub fn new(address: Address, key_index: u32, key: &PrivateKey, hash: HashAlgorithm) -> Self {
        Self {
            address,
            key_index,
            hash_algorithm: hash,
            private_key: key.to_hex(),
            public_key: Some(key.public_key().to_hex()),
        }
    }
}

impl KeyFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("malformed key file {}", path.display()))
    }

    /// Writes the file, restricting permissions on Unix.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write key file {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Loads every key into an in-memory signer.
    pub fn into_signer(self) -> Result<InMemorySigner> {
        let mut signer = InMemorySigner::new();
        for entry in self.keys {
            let key = PrivateKey::from_hex(&entry.private_key).with_context(|| {
                format!(
                    "invalid private key for {} (key {})",
                    entry.address, entry.key_index
                )
            })?;
            if let Some(public) = &entry.public_key {
                if *public != key.public_key().to_hex() {
                    anyhow::bail!(
                        "public key for {} (key {}) does not match its private key",
                        entry.address,
                        entry.key_index
                    );
                }
            }
            signer.add_key(entry.address, entry.key_index, key, entry.hash_algorithm);
        }
        Ok(signer)
    }
}
