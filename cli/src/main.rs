// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # stellar-wire CLI
//!
//! Entry point for the `stellar-wire` binary. Parses CLI arguments,
//! initializes logging and runs one offline command:
//!
//! - `decode`  — base64 envelope to JSON
//! - `hash`    — transaction hash for a network
//! - `sign`    — append a signature to an envelope
//! - `strkey`  — encode/decode StrKey addresses
//! - `keygen`  — generate a random keypair

mod cli;
mod logging;

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Parser;

use stellar_wire::crypto::KeyPair;
use stellar_wire::strkey::{self, Version};
use stellar_wire::transaction::TransactionEnvelope;
use stellar_wire::xdr::WriteXdr;

use cli::{Commands, EnvelopeInput, StellarWireCli, StrKeyCommand};

fn main() -> Result<()> {
    let cli = StellarWireCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Decode(args) => {
            let envelope = read_envelope(&args.input)?;
            let json = if args.compact {
                serde_json::to_string(&envelope)
            } else {
                serde_json::to_string_pretty(&envelope)
            }
            .context("failed to serialize envelope as JSON")?;
            println!("{json}");
        }
        Commands::Hash(args) => {
            let envelope = read_envelope(&args.input)?;
            let network = args.network.resolve();
            println!("{}", hex::encode(envelope.hash(&network)));
        }
        Commands::Sign(args) => {
            let mut envelope = read_envelope(&args.input)?;
            let network = args.network.resolve();
            let keypair =
                KeyPair::from_secret_seed(&args.secret).context("invalid secret seed")?;
            envelope
                .sign(&keypair, &network)
                .context("failed to add signature")?;
            tracing::info!(
                signer = %keypair.address(),
                hash = %hex::encode(envelope.hash(&network)),
                signatures = envelope.signatures().len(),
                "envelope signed"
            );
            println!("{}", envelope.to_xdr_base64());
        }
        Commands::Strkey(command) => run_strkey(command)?,
        Commands::Keygen => {
            let keypair = KeyPair::random();
            println!("public key : {}", keypair.address());
            println!("secret seed: {}", keypair.secret_seed());
        }
    }

    Ok(())
}

/// Reads the envelope from the argument, or from stdin when it is absent or
/// `-`. Surrounding whitespace is ignored.
fn read_envelope(input: &EnvelopeInput) -> Result<TransactionEnvelope> {
    let raw = match input.envelope.as_deref() {
        Some(value) if value != "-" => value.to_string(),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read envelope from stdin")?;
            buf
        }
    };
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("no envelope given");
    }
    TransactionEnvelope::parse(raw).context("failed to decode transaction envelope")
}

fn run_strkey(command: StrKeyCommand) -> Result<()> {
    match command {
        StrKeyCommand::Encode { kind, payload } => {
            let version = Version::from(kind);
            let bytes = hex::decode(payload.trim()).context("payload is not valid hex")?;
            let encoded = strkey::encode(version, &bytes);
            // decoding applies the per-kind payload rules
            strkey::decode_as(version, &encoded)
                .with_context(|| format!("payload is not a valid {version}"))?;
            println!("{encoded}");
        }
        StrKeyCommand::Decode { key } => {
            let (version, payload) =
                strkey::decode(key.trim()).context("failed to decode StrKey")?;
            let out = serde_json::json!({
                "version": version,
                "payload": hex::encode(payload),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
