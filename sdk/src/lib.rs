// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Flow SDK — Core Library
//!
//! The client-side half of talking to the ledger: the part where a single
//! wrong byte means the chain rejects your transaction, or worse, accepts
//! one you didn't mean to sign.
//!
//! ## Architecture
//!
//! - **cadence** — Typed ledger values and their JSON interchange codec.
//! - **rlp** — The canonical binary encoding signatures are computed over.
//! - **address** — Fixed 8-byte account addresses.
//! - **transaction** — Building, signing, verifying and shaping transactions.
//! - **crypto** — P-256 keys, hashing, and an in-memory signer.
//! - **config** — Protocol constants and the explicit `SdkConfig`.
//!
//! Transport is not here. The SDK produces bytes and signed bodies; moving
//! them to an access node is someone else's problem.
//!
//! ## Design Philosophy
//!
//! 1. Canonical bytes are computed, never cached where they could go stale.
//! 2. No global state. Configuration is a value you pass around.
//! 3. Every value kind is an enum variant; the compiler checks we handled it.
//! 4. If it ends up in a signature, it has tests. Plural.

pub mod address;
pub mod cadence;
pub mod config;
pub mod crypto;
pub mod rlp;
pub mod transaction;

pub use address::{Address, AddressError};
pub use cadence::{Argument, DecodeError, Value};
pub use config::SdkConfig;
pub use transaction::{SigningEngine, Transaction, TransactionBuilder, TransactionError};
