// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # stellar-wire — Core Library
//!
//! Turns typed transaction objects into the exact bytes the Stellar network
//! accepts, and back again. Nothing here talks to a server: the crate builds,
//! parses, hashes and signs byte streams, and trusts the network to judge
//! their semantics.
//!
//! ## Architecture
//!
//! Modules, leaves first:
//!
//! - **xdr** — The canonical binary codec: integers, opaque data, strings,
//!   optionals, bounded arrays and discriminated unions.
//! - **strkey** — Versioned, checksummed base32 addresses (`G...`, `M...`,
//!   `S...`, `C...` and friends).
//! - **crypto** — Ed25519 keypairs, SHA-256, decorated signatures.
//! - **types** — Accounts, assets, prices, amounts, memos, signers,
//!   claimants and ledger keys.
//! - **soroban** — Contract values, host functions, authorization entries
//!   and resource data.
//! - **operation** — The operation union and a builder per operation.
//! - **transaction** — Transactions, preconditions, envelopes and fee bumps.
//! - **config** — Network passphrases and protocol limits.
//!
//! ## Example
//!
//! ```rust
//! use stellar_wire::config::Network;
//! use stellar_wire::crypto::KeyPair;
//! use stellar_wire::operation::PaymentBuilder;
//! use stellar_wire::transaction::TransactionBuilder;
//! use stellar_wire::types::Asset;
//! use stellar_wire::xdr::WriteXdr;
//!
//! let keypair = KeyPair::from_seed(&[7; 32]);
//! let payment = PaymentBuilder::new(
//!     "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H",
//!     Asset::native(),
//!     "12.5",
//! )
//! .build()
//! .unwrap();
//!
//! let mut envelope = TransactionBuilder::new(&keypair.address(), 42)
//!     .add_operation(payment)
//!     .set_timeout(300)
//!     .build()
//!     .unwrap()
//!     .into_envelope();
//! envelope.sign(&keypair, &Network::testnet()).unwrap();
//!
//! let wire = envelope.to_xdr_base64();
//! assert!(!wire.is_empty());
//! ```
//!
//! ## Conventions
//!
//! 1. Builders never panic; bad input surfaces from `build()` as an [`Error`].
//! 2. Decoding is strict: non-zero padding, unknown discriminants and
//!    trailing bytes are all rejected.
//! 3. Every signature is bound to a [`config::Network`]; there is no default.

pub mod config;
pub mod crypto;
pub mod error;
pub mod operation;
pub mod soroban;
pub mod strkey;
pub mod transaction;
pub mod types;
pub mod xdr;

pub use error::{Error, ErrorKind, Result};
