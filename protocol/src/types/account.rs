//! Accounts and multiplexed accounts.
//!
//! An [`AccountId`] is an ed25519 public key. A [`MuxedAccount`] optionally
//! adds a 64-bit id so one on-chain account can stand in for many virtual
//! ones (exchange deposit ids, custodial sub-accounts).
//!
//! ## The muxed field order
//!
//! The `M...` StrKey payload is `key || id`. The XDR arm is the other way
//! round: `id` first, then `key`. Both orders are mandated by the deployed
//! protocol and are reproduced exactly; do not "fix" either side.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::strkey::{self, StrKeyError, Version};
use crate::xdr::{invalid_discriminant, ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::serde_via_str;

const PUBLIC_KEY_TYPE_ED25519: i32 = 0;
const KEY_TYPE_ED25519: i32 = 0;
const KEY_TYPE_MUXED_ED25519: i32 = 0x100;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// An ed25519 account key (`AccountID` / `PublicKey` in XDR).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The `G...` form.
    pub fn to_strkey(&self) -> String {
        strkey::encode_account_id(&self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_strkey())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_strkey())
    }
}

impl FromStr for AccountId {
    type Err = StrKeyError;

    fn from_str(s: &str) -> std::result::Result<Self, StrKeyError> {
        strkey::decode_account_id(s).map(Self)
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl WriteXdr for AccountId {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_discriminant(PUBLIC_KEY_TYPE_ED25519);
        w.write_fixed_opaque(&self.0);
    }
}

impl ReadXdr for AccountId {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            PUBLIC_KEY_TYPE_ED25519 => Ok(Self(r.read_fixed_opaque()?)),
            other => Err(invalid_discriminant("PublicKey", other)),
        }
    }
}

serde_via_str!(AccountId);

// ---------------------------------------------------------------------------
// MuxedAccount
// ---------------------------------------------------------------------------

/// A transaction or operation source, or a payment destination.
///
/// A muxed account without an id encodes byte-for-byte like the bare account
/// it wraps. The `M...` form only exists when an id is present.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuxedAccount {
    Ed25519([u8; 32]),
    MuxedEd25519 { id: u64, ed25519: [u8; 32] },
}

impl MuxedAccount {
    /// Wraps `account`, multiplexed under `id` when one is given.
    pub fn new(account: AccountId, id: Option<u64>) -> Self {
        match id {
            None => Self::Ed25519(account.0),
            Some(id) => Self::MuxedEd25519 {
                id,
                ed25519: account.0,
            },
        }
    }

    /// Parses either a `G...` or an `M...` address.
    pub fn parse(address: &str) -> Result<Self> {
        Ok(address.parse()?)
    }

    /// The underlying account, with any id stripped.
    pub fn account_id(&self) -> AccountId {
        match self {
            Self::Ed25519(key) | Self::MuxedEd25519 { ed25519: key, .. } => AccountId(*key),
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Ed25519(_) => None,
            Self::MuxedEd25519 { id, .. } => Some(*id),
        }
    }

    /// `G...` without an id, `M...` with one.
    pub fn address(&self) -> String {
        match self {
            Self::Ed25519(key) => strkey::encode_account_id(key),
            Self::MuxedEd25519 { id, ed25519 } => strkey::encode_muxed_account(ed25519, *id),
        }
    }
}

impl From<AccountId> for MuxedAccount {
    fn from(account: AccountId) -> Self {
        Self::Ed25519(account.0)
    }
}

impl fmt::Display for MuxedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

impl fmt::Debug for MuxedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MuxedAccount({})", self.address())
    }
}

impl FromStr for MuxedAccount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (version, _) = strkey::decode(s)?;
        match version {
            Version::AccountId => Ok(Self::Ed25519(strkey::decode_account_id(s)?)),
            Version::MuxedAccount => {
                let (ed25519, id) = strkey::decode_muxed_account(s)?;
                Ok(Self::MuxedEd25519 { id, ed25519 })
            }
            found => Err(StrKeyError::UnexpectedVersion {
                expected: Version::AccountId,
                found,
            }
            .into()),
        }
    }
}

impl WriteXdr for MuxedAccount {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Ed25519(key) => {
                w.write_discriminant(KEY_TYPE_ED25519);
                w.write_fixed_opaque(key);
            }
            Self::MuxedEd25519 { id, ed25519 } => {
                w.write_discriminant(KEY_TYPE_MUXED_ED25519);
                // id before key, unlike the StrKey payload
                w.write_u64(*id);
                w.write_fixed_opaque(ed25519);
            }
        }
    }
}

impl ReadXdr for MuxedAccount {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            KEY_TYPE_ED25519 => Ok(Self::Ed25519(r.read_fixed_opaque()?)),
            KEY_TYPE_MUXED_ED25519 => {
                let id = r.read_u64()?;
                let ed25519 = r.read_fixed_opaque()?;
                Ok(Self::MuxedEd25519 { id, ed25519 })
            }
            other => Err(invalid_discriminant("MuxedAccount", other)),
        }
    }
}

serde_via_str!(MuxedAccount);
