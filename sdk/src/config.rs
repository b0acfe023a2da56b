//! # SDK Configuration & Constants
//!
//! Every protocol constant the SDK depends on lives here, next to the
//! [`SdkConfig`] value that callers thread through the signing engine and
//! the transaction builder. There is no process-wide state: if two parts of
//! a program want different settings, they build two configs.
//!
//! Changing any of the byte-level constants below changes what gets signed.
//! The chain will reject the result.

use serde::{Deserialize, Serialize};

use crate::cadence::NumericSource;

// ---------------------------------------------------------------------------
// Domain Separation
// ---------------------------------------------------------------------------

/// Tag literal prepended to every transaction payload and envelope before
/// signing.
pub const TRANSACTION_DOMAIN_TAG: &str = "FLOW-V0.0-transaction";

/// Tag literal prepended to arbitrary user messages before signing.
pub const USER_DOMAIN_TAG: &str = "FLOW-V0.0-user";

/// Every domain tag is right-padded with zero bytes to this length.
pub const DOMAIN_TAG_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Ledger Primitives
// ---------------------------------------------------------------------------

/// Account addresses are 8 bytes, rendered as 16 lowercase hex digits.
pub const ADDRESS_LENGTH: usize = 8;

/// Block identifiers are SHA3-256 digests.
pub const BLOCK_ID_LENGTH: usize = 32;

/// Number of fractional decimal digits carried by `Fix64` and `UFix64`.
pub const FIX64_DECIMALS: u32 = 8;

/// Scale factor between a fixed-point value and its raw integer.
pub const FIX64_SCALE: u64 = 100_000_000;

// ---------------------------------------------------------------------------
// Transaction Defaults
// ---------------------------------------------------------------------------

/// Gas limit used when the caller does not set one.
pub const DEFAULT_GAS_LIMIT: u64 = 9_999;

/// Highest gas limit an access node accepts for a single transaction.
pub const MAX_GAS_LIMIT: u64 = 9_999;

/// Default source priority for flexible numeric decoding: exact integer
/// kinds first, then whole-valued fixed-point, then decimal text.
pub const DEFAULT_NUMERIC_PRIORITY: [NumericSource; 3] = [
    NumericSource::Integer,
    NumericSource::FixedPoint,
    NumericSource::Text,
];

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// The chain a configuration targets. Only used to label log output and
/// CLI reports; addresses are not re-validated per network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Emulator,
}

impl Network {
    /// Parse a network name. Accepts "mainnet", "testnet" or "emulator"
    /// (case-insensitive). Returns `None` for anything else. We don't guess.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            "emulator" => Some(Self::Emulator),
            _ => None,
        }
    }

    /// Lowercase display name, mainly for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Emulator => "emulator",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// SdkConfig
// ---------------------------------------------------------------------------

/// Explicit configuration handed to the signing engine, the builder and
/// [`Value::decode_numeric`](crate::cadence::Value::decode_numeric).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Network label attached to log events.
    pub network: Network,
    /// Gas limit applied by
    /// [`TransactionBuilder::resolve`](crate::transaction::TransactionBuilder::resolve) when
    /// none was set.
    pub default_gas_limit: u64,
    /// Source priority for [`Value::decode_numeric`](crate::cadence::Value::decode_numeric).
    pub numeric_priority: Vec<NumericSource>,
}

impl SdkConfig {
    /// A configuration for the given network with default limits.
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            network: Network::Emulator,
            default_gas_limit: DEFAULT_GAS_LIMIT,
            numeric_priority: DEFAULT_NUMERIC_PRIORITY.to_vec(),
        }
    }
}
