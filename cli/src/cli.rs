//! # CLI Interface
//!
//! Defines the command-line argument structure for `flow-tx` using `clap`
//! derive. Five subcommands: `decode-value`, `encode-value`, `keygen`,
//! `sign`, and `version`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use flow_sdk::config::Network;
use flow_sdk::crypto::HashAlgorithm;

use crate::logging::LogFormat;

/// Offline tooling for Flow transactions.
///
/// Decodes and normalizes JSON-Cadence values, generates P-256 account keys,
/// and signs draft transactions into access-node request bodies. Nothing
/// here talks to the network.
#[derive(Parser, Debug)]
#[command(
    name = "flow-tx",
    about = "Offline Flow transaction tooling",
    version,
    propagate_version = true
)]
pub struct FlowTxCli {
    /// Log output format. Logs go to stderr.
    #[arg(
        long,
        global = true,
        env = "FLOW_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Network label for log output and signing config.
    #[arg(
        long,
        global = true,
        env = "FLOW_NETWORK",
        default_value = "emulator",
        value_parser = parse_network
    )]
    pub network: Network,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a JSON-Cadence value and print its native form.
    DecodeValue(DecodeArgs),
    /// Decode a JSON-Cadence value and print it re-encoded canonically.
    EncodeValue(ValueArgs),
    /// Generate a fresh P-256 account key.
    Keygen(KeygenArgs),
    /// Sign a draft transaction with keys from a key file.
    Sign(SignArgs),
    /// Print version information and exit.
    Version,
}

/// Input for the value subcommands.
#[derive(Args, Debug)]
pub struct ValueArgs {
    /// File holding the wire value. Reads stdin when omitted.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,
}

/// Arguments for the `decode-value` subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding the wire value. Reads stdin when omitted.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Coerce the value into this integer width instead of printing its
    /// native form. Sources are tried in the configured numeric priority.
    #[arg(long = "as", value_enum)]
    pub width: Option<IntWidth>,
}

/// Integer widths `decode-value --as` can coerce into.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Account the key belongs to. When set, the output is a key file entry.
    #[arg(long, short = 'a')]
    pub address: Option<String>,

    /// Key index on the account.
    #[arg(long, default_value_t = 0)]
    pub key_index: u32,

    /// Digest the key is registered with: SHA2_256 or SHA3_256.
    #[arg(long, default_value = "SHA3_256", value_parser = parse_hash)]
    pub hash: HashAlgorithm,

    /// Write the key file here (mode 0600) instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

/// Arguments for the `sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Draft transaction JSON.
    #[arg(long, short = 't')]
    pub tx: PathBuf,

    /// Key file holding every signer's keys.
    ///
    /// **Never commit this file.** It contains private keys in plain hex.
    #[arg(long, short = 'k', env = "FLOW_KEY_FILE")]
    pub keys: PathBuf,

    /// Print the signed transaction itself instead of the submission body.
    #[arg(long)]
    pub raw: bool,
}

fn parse_network(s: &str) -> Result<Network, String> {
    Network::from_name(s).ok_or_else(|| format!("unknown network '{s}'"))
}

fn parse_hash(s: &str) -> Result<HashAlgorithm, String> {
    HashAlgorithm::from_name(&s.to_ascii_uppercase())
        .ok_or_else(|| format!("unknown hash algorithm '{s}'"))
}
