//! # Cryptographic Primitives
//!
//! Everything the SDK needs to sign on behalf of an account:
//!
//! - **ECDSA P-256** for account keys, the curve the ledger accepts from
//!   the widest range of wallets and HSMs.
//! - **SHA2-256 / SHA3-256** as the per-key message digest.
//! - **SHA3-256** for transaction ids.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. If you're tempted to optimize these functions, please
//! reconsider. Then reconsider again.

pub mod hash;
pub mod keys;
pub mod signer;

pub use hash::{sha2_256, sha3_256, HashAlgorithm};
pub use keys::{KeyError, PrivateKey, PublicKey};
pub use signer::{AccountKey, InMemorySigner};
