//! # Transaction Module
//!
//! Construction, hashing and signing of transactions and their envelopes.
//!
//! ## Architecture
//!
//! ```text
//! builder.rs       — Transaction and the fluent TransactionBuilder
//! preconditions.rs — time/ledger bounds and the extended V2 preconditions
//! envelope.rs      — V0/V1/fee-bump envelopes, signature payloads, signing
//! fee_bump.rs      — FeeBumpTransaction and its builder
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: assemble a [`Transaction`] with [`TransactionBuilder`].
//! 2. **Wrap**: `tx.into_envelope()` gives an unsigned [`TransactionEnvelope`].
//! 3. **Sign**: [`TransactionEnvelope::sign`] appends a decorated signature
//!    over the network-bound hash.
//! 4. **Submit**: `envelope.to_xdr_base64()` is what the network accepts.
//!
//! Optionally, wrap a signed V1 envelope with [`FeeBumpBuilder`] to have
//! another account pay a higher fee.
//!
//! ## Hashing
//!
//! The hash of any transaction is `SHA-256(network_id || envelope type ||
//! transaction XDR)`. The network id makes a signature taken for testnet
//! useless on the public network.

pub mod builder;
pub mod envelope;
pub mod fee_bump;
pub mod preconditions;

pub use builder::{Transaction, TransactionBuilder, TransactionExt};
pub use envelope::{
    EnvelopeType, FeeBumpTransactionEnvelope, Signatures, TaggedTransaction,
    TransactionEnvelope, TransactionSignaturePayload, TransactionV0, TransactionV0Envelope,
    TransactionV1Envelope,
};
pub use fee_bump::{FeeBumpBuilder, FeeBumpTransaction};
pub use preconditions::{LedgerBounds, Preconditions, PreconditionsV2, TimeBounds};
