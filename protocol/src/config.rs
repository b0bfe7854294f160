//! # Protocol Configuration & Constants
//!
//! Every magic number the wire format depends on lives here. If you're
//! hardcoding one of these somewhere else, you're doing it wrong.
//!
//! These values are fixed by the deployed network, not by us. Changing any of
//! them produces transactions that every validator rejects, so treat this file
//! as read-only unless the protocol itself moves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::hash::sha256;

// ---------------------------------------------------------------------------
// Network Passphrases
// ---------------------------------------------------------------------------

/// The public network. Mistakes here cost real money.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// The SDF test network, reset periodically.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Futurenet, where protocol features land before testnet.
pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";

/// A local standalone network, e.g. the quickstart container.
pub const STANDALONE_PASSPHRASE: &str = "Standalone Network ; February 2017";

/// Sandbox network used by local contract tooling.
pub const SANDBOX_PASSPHRASE: &str = "Local Sandbox Stellar Network ; September 2022";

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// Minimum fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// Stroops per unit of any asset. Amounts carry seven decimal places.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Number of fractional digits an amount string may carry.
pub const AMOUNT_DECIMALS: usize = 7;

/// Constant-product pool fee in basis points (protocol 18 onwards).
pub const LIQUIDITY_POOL_FEE_V18: i32 = 30;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum operations in a single transaction.
pub const MAX_OPS_PER_TX: u32 = 100;

/// Maximum decorated signatures on an envelope.
pub const MAX_SIGNATURES: u32 = 20;

/// Maximum intermediate assets in a path payment.
pub const MAX_PATH_LENGTH: u32 = 5;

/// Maximum claimants on a claimable balance.
pub const MAX_CLAIMANTS: u32 = 10;

/// Maximum extra signers in V2 preconditions.
pub const MAX_EXTRA_SIGNERS: u32 = 2;

/// Maximum bytes in a text memo.
pub const MAX_MEMO_TEXT_LENGTH: u32 = 28;

/// Maximum bytes in a manage-data entry name or value.
pub const MAX_DATA_LENGTH: u32 = 64;

/// Maximum bytes in a home domain.
pub const MAX_HOME_DOMAIN_LENGTH: u32 = 32;

/// Maximum bytes of payload in an ed25519 signed-payload signer.
pub const MAX_SIGNED_PAYLOAD_LENGTH: u32 = 64;

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Nesting limit for recursive XDR structures on decode. Deep enough for any
/// real contract value, shallow enough that hostile input can't blow the stack.
pub const XDR_DEPTH_LIMIT: u32 = 500;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// A network, identified entirely by its passphrase.
///
/// The passphrase is hashed into every signature base, which is what stops a
/// testnet signature from being replayed on the public network. There is
/// deliberately no `Default`: signing for the wrong network is the one
/// mistake nobody notices until it's too late.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    passphrase: String,
}

impl Network {
    /// A network with an arbitrary passphrase.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    pub fn public() -> Self {
        Self::new(PUBLIC_NETWORK_PASSPHRASE)
    }

    pub fn testnet() -> Self {
        Self::new(TESTNET_PASSPHRASE)
    }

    pub fn futurenet() -> Self {
        Self::new(FUTURENET_PASSPHRASE)
    }

    pub fn standalone() -> Self {
        Self::new(STANDALONE_PASSPHRASE)
    }

    pub fn sandbox() -> Self {
        Self::new(SANDBOX_PASSPHRASE)
    }

    /// Resolves a well-known alias (`public`, `testnet`, ...). Returns `None`
    /// for anything else; we don't guess.
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias.to_ascii_lowercase().as_str() {
            "public" | "mainnet" | "pubnet" => Some(Self::public()),
            "testnet" => Some(Self::testnet()),
            "futurenet" => Some(Self::futurenet()),
            "standalone" | "local" => Some(Self::standalone()),
            "sandbox" => Some(Self::sandbox()),
            _ => None,
        }
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// SHA-256 of the passphrase. The first 32 bytes of every signature base.
    pub fn network_id(&self) -> [u8; 32] {
        sha256(self.passphrase.as_bytes())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.passphrase)
    }
}
