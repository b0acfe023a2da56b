// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # flow-tx
//!
//! Entry point for the `flow-tx` binary. Parses CLI arguments, initializes
//! logging, and dispatches to a subcommand:
//!
//! - `decode-value` — JSON-Cadence value to its native form, or an integer
//! - `encode-value` — JSON-Cadence value, normalized
//! - `keygen`       — fresh P-256 account key
//! - `sign`         — draft transaction to signed submission body
//! - `version`      — print build version information
//!
//! Logs go to stderr, results to stdout.

mod cli;
mod keyfile;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use flow_sdk::address::Address;
use flow_sdk::cadence::{DecodeError, Value};
use flow_sdk::config::SdkConfig;
use flow_sdk::crypto::PrivateKey;
use flow_sdk::transaction::{verify_transaction, KeyLookup, SigningEngine, Transaction};

use cli::{Commands, FlowTxCli, IntWidth};
use keyfile::{KeyEntry, KeyFile};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = FlowTxCli::parse();
    logging::init_logging(cli.log_format);

    let config = SdkConfig::for_network(cli.network);

    match cli.command {
        Commands::DecodeValue(args) => decode_value(&args, &config),
        Commands::EncodeValue(args) => encode_value(args.input.as_deref()),
        Commands::Keygen(args) => keygen(args),
        Commands::Sign(args) => sign(args, config).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Reads a file, or stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn parse_value(path: Option<&Path>) -> Result<Value> {
    let raw = read_input(path)?;
    Value::from_json_str(raw.trim()).context("input is not a valid JSON-Cadence value")
}

fn decode_value(args: &cli::DecodeArgs, config: &SdkConfig) -> Result<()> {
    let value = parse_value(args.input.as_deref())?;
    tracing::debug!(tag = %value.type_tag(), "decoded value");

    if let Some(width) = args.width {
        let number = coerce(&value, width, config)
            .with_context(|| format!("value does not coerce to {width:?}"))?;
        println!("{number}");
        return Ok(());
    }

    let native = value
        .to_native()
        .context("value does not lower to native types")?;
    println!("{native:#?}");
    Ok(())
}

/// Flexible numeric decode into the requested width, rendered as decimal.
fn coerce(value: &Value, width: IntWidth, config: &SdkConfig) -> Result<String, DecodeError> {
    Ok(match width {
        IntWidth::U8 => value.decode_numeric::<u8>(config)?.to_string(),
        IntWidth::U16 => value.decode_numeric::<u16>(config)?.to_string(),
        IntWidth::U32 => value.decode_numeric::<u32>(config)?.to_string(),
        IntWidth::U64 => value.decode_numeric::<u64>(config)?.to_string(),
        IntWidth::U128 => value.decode_numeric::<u128>(config)?.to_string(),
        IntWidth::I8 => value.decode_numeric::<i8>(config)?.to_string(),
        IntWidth::I16 => value.decode_numeric::<i16>(config)?.to_string(),
        IntWidth::I32 => value.decode_numeric::<i32>(config)?.to_string(),
        IntWidth::I64 => value.decode_numeric::<i64>(config)?.to_string(),
        IntWidth::I128 => value.decode_numeric::<i128>(config)?.to_string(),
    })
}

fn encode_value(path: Option<&Path>) -> Result<()> {
    let value = parse_value(path)?;
    let bytes = value.to_json_bytes();
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let key = PrivateKey::generate();
    let public = key.public_key().to_hex();

    let Some(address) = args.address else {
        // No account yet: print the pair so the public half can be registered.
        println!("private_key    {}", key.to_hex());
        println!("public_key     {public}");
        println!("hash_algorithm {}", args.hash);
        return Ok(());
    };

    let address: Address = address
        .parse()
        .with_context(|| format!("invalid address '{address}'"))?;
    let file = KeyFile {
        keys: vec![KeyEntry::new(address, args.key_index, &key, args.hash)],
    };

    match args.out {
        Some(path) => {
            file.save(&path)?;
            tracing::info!(
                %address,
                key_index = args.key_index,
                path = %path.display(),
                "key file written"
            );
            println!("{public}");
        }
        None => println!("{}", serde_json::to_string_pretty(&file)?),
    }
    Ok(())
}

async fn sign(args: cli::SignArgs, config: SdkConfig) -> Result<()> {
    let raw = read_input(Some(&args.tx))?;
    let mut tx: Transaction = serde_json::from_str(&raw)
        .with_context(|| format!("malformed draft transaction {}", args.tx.display()))?;

    let mut signer = KeyFile::load(&args.keys)?.into_signer()?;
    let proposal = tx.proposal_key;
    if signer
        .account_key(&proposal.address, proposal.key_index)
        .is_some()
    {
        signer.prefer_key(proposal.address, proposal.key_index);
    }
    let signer = Arc::new(signer);
    let mut engine = SigningEngine::new(config);
    for address in signer.addresses() {
        engine.register(*address, signer.clone());
    }

    tracing::info!(
        network = %engine.config().network,
        signers = tx.signers().len(),
        "signing transaction"
    );
    engine.sign(&mut tx).await.context("signing failed")?;
    verify_transaction(&tx, signer.as_ref()).context("signed transaction does not verify")?;

    let id = tx.id_hex()?;
    let output = if args.raw {
        serde_json::json!({ "id": id, "transaction": tx })
    } else {
        serde_json::json!({ "id": id, "submission": tx.to_submittable()? })
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("flow-tx {}", env!("CARGO_PKG_VERSION"));
    println!("rustc   {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
