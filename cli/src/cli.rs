//! # CLI Interface
//!
//! Defines the command-line argument structure for `stellar-wire` using
//! `clap` derive. Every command works offline: input is a base64 envelope
//! or a StrKey, output goes to stdout.

use clap::{Args, Parser, Subcommand, ValueEnum};
use stellar_wire::config::Network;
use stellar_wire::strkey::Version;

use crate::logging::LogFormat;

/// Decode, hash and sign Stellar transaction envelopes.
#[derive(Parser, Debug)]
#[command(
    name = "stellar-wire",
    about = "Offline tool for Stellar transaction envelopes",
    version,
    propagate_version = true
)]
pub struct StellarWireCli {
    /// Log output format. Logs go to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a base64 envelope and print it as JSON.
    Decode(DecodeArgs),
    /// Print the hex transaction hash of an envelope.
    Hash(HashArgs),
    /// Add a signature to an envelope and print the result as base64.
    Sign(SignArgs),
    /// Encode or decode StrKey addresses.
    #[command(subcommand)]
    Strkey(StrKeyCommand),
    /// Generate a new random keypair.
    Keygen,
}

/// Where an envelope comes from: an argument, or stdin when omitted or `-`.
#[derive(Args, Debug)]
pub struct EnvelopeInput {
    /// Base64 `TransactionEnvelope`.
    pub envelope: Option<String>,
}

/// Network selection, shared by every command that hashes.
#[derive(Args, Debug)]
pub struct NetworkArgs {
    /// Network alias (`public`, `testnet`, `futurenet`, `standalone`,
    /// `sandbox`) or a literal passphrase.
    #[arg(long, short = 'n', env = "STELLAR_NETWORK_PASSPHRASE")]
    pub network: String,
}

impl NetworkArgs {
    pub fn resolve(&self) -> Network {
        Network::from_alias(&self.network).unwrap_or_else(|| Network::new(self.network.clone()))
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: EnvelopeInput,

    /// Print compact single-line JSON.
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug)]
pub struct HashArgs {
    #[command(flatten)]
    pub input: EnvelopeInput,

    #[command(flatten)]
    pub network: NetworkArgs,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub input: EnvelopeInput,

    #[command(flatten)]
    pub network: NetworkArgs,

    /// `S...` secret seed of the signer.
    ///
    /// Prefer the environment variable; flags end up in shell history.
    #[arg(long, env = "STELLAR_SECRET_KEY", hide_env_values = true)]
    pub secret: String,
}

#[derive(Subcommand, Debug)]
pub enum StrKeyCommand {
    /// Encode a hex payload as a StrKey.
    Encode {
        /// Kind of key to produce.
        #[arg(long, short = 'k', value_enum)]
        kind: KeyKind,
        /// Hex payload.
        payload: String,
    },
    /// Decode a StrKey into its kind and hex payload.
    Decode {
        key: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Account,
    Muxed,
    Seed,
    PreAuthTx,
    HashX,
    SignedPayload,
    Contract,
    LiquidityPool,
    ClaimableBalance,
}

impl From<KeyKind> for Version {
    fn from(kind: KeyKind) -> Self {
        match kind {
            KeyKind::Account => Version::AccountId,
            KeyKind::Muxed => Version::MuxedAccount,
            KeyKind::Seed => Version::Seed,
            KeyKind::PreAuthTx => Version::PreAuthTx,
            KeyKind::HashX => Version::HashX,
            KeyKind::SignedPayload => Version::SignedPayload,
            KeyKind::Contract => Version::Contract,
            KeyKind::LiquidityPool => Version::LiquidityPool,
            KeyKind::ClaimableBalance => Version::ClaimableBalance,
        }
    }
}
