//! Assets, trust-line assets and liquidity pool parameters.
//!
//! A credit asset is a code plus an issuer. Codes of 1 to 4 characters go in
//! the `AlphaNum4` arm, 5 to 12 in `AlphaNum12`; the code length alone picks
//! the arm, and builders refuse anything else. Codes are right-padded with
//! zero bytes on the wire.
//!
//! Assets are totally ordered by (type, code, issuer), compared as raw
//! bytes. Liquidity pools require their two assets in that order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::LIQUIDITY_POOL_FEE_V18;
use crate::crypto::{sha256, Hash};
use crate::error::{Error, Result};
use crate::xdr::{invalid_discriminant, ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::ids::PoolId;
use super::{serde_via_str, AccountId};

const ASSET_TYPE_NATIVE: i32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: i32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: i32 = 2;
const ASSET_TYPE_POOL_SHARE: i32 = 3;
const LIQUIDITY_POOL_CONSTANT_PRODUCT: i32 = 0;

// ---------------------------------------------------------------------------
// Asset codes
// ---------------------------------------------------------------------------

fn validate_code(code: &str, min: usize, max: usize) -> Result<()> {
    if code.len() < min || code.len() > max {
        return Err(Error::constraint(
            "asset code",
            format!("{code:?} must be {min} to {max} characters"),
        ));
    }
    if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::constraint(
            "asset code",
            format!("{code:?} must be alphanumeric"),
        ));
    }
    Ok(())
}

fn trimmed(code: &[u8]) -> String {
    let end = code.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&code[..end]).into_owned()
}

macro_rules! asset_code {
    ($name:ident, $len:literal, $min:literal) => {
        #[doc = concat!("A zero-padded asset code of up to ", $len, " bytes.")]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// The code with its zero padding removed.
            pub fn as_string(&self) -> String {
                trimmed(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(code: &str) -> Result<Self> {
                validate_code(code, $min, $len)?;
                let mut out = [0u8; $len];
                out[..code.len()].copy_from_slice(code.as_bytes());
                Ok(Self(out))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.as_string())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.as_string())
            }
        }

        impl WriteXdr for $name {
            fn write_xdr(&self, w: &mut XdrWriter) {
                w.write_fixed_opaque(&self.0);
            }
        }

        impl ReadXdr for $name {
            fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
                Ok(Self(r.read_fixed_opaque()?))
            }
        }

        serde_via_str!($name);
    };
}

asset_code!(AssetCode4, 4, 1);
asset_code!(AssetCode12, 12, 5);

/// An asset code of either width (`AssetCode` in XDR), as used by
/// allow-trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCode {
    CreditAlphanum4(AssetCode4),
    CreditAlphanum12(AssetCode12),
}

impl FromStr for AssetCode {
    type Err = Error;

    fn from_str(code: &str) -> Result<Self> {
        if code.len() <= 4 {
            Ok(Self::CreditAlphanum4(code.parse()?))
        } else {
            Ok(Self::CreditAlphanum12(code.parse()?))
        }
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreditAlphanum4(code) => code.fmt(f),
            Self::CreditAlphanum12(code) => code.fmt(f),
        }
    }
}

impl WriteXdr for AssetCode {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::CreditAlphanum4(code) => {
                w.write_discriminant(ASSET_TYPE_CREDIT_ALPHANUM4);
                code.write_xdr(w);
            }
            Self::CreditAlphanum12(code) => {
                w.write_discriminant(ASSET_TYPE_CREDIT_ALPHANUM12);
                code.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for AssetCode {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            ASSET_TYPE_CREDIT_ALPHANUM4 => Ok(Self::CreditAlphanum4(AssetCode4::read_xdr(r)?)),
            ASSET_TYPE_CREDIT_ALPHANUM12 => Ok(Self::CreditAlphanum12(AssetCode12::read_xdr(r)?)),
            other => Err(invalid_discriminant("AssetCode", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlphaNum4 {
    pub asset_code: AssetCode4,
    pub issuer: AccountId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlphaNum12 {
    pub asset_code: AssetCode12,
    pub issuer: AccountId,
}

macro_rules! alphanum_codec {
    ($name:ident, $code:ident) => {
        impl WriteXdr for $name {
            fn write_xdr(&self, w: &mut XdrWriter) {
                self.asset_code.write_xdr(w);
                self.issuer.write_xdr(w);
            }
        }

        impl ReadXdr for $name {
            fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
                Ok(Self {
                    asset_code: $code::read_xdr(r)?,
                    issuer: AccountId::read_xdr(r)?,
                })
            }
        }
    };
}

alphanum_codec!(AlphaNum4, AssetCode4);
alphanum_codec!(AlphaNum12, AssetCode12);

/// The native asset or a credit asset.
///
/// Variant order matches the XDR discriminants, so the derived `Ord` is the
/// protocol's (type, code, issuer) order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    Native,
    CreditAlphanum4(AlphaNum4),
    CreditAlphanum12(AlphaNum12),
}

impl Asset {
    pub fn native() -> Self {
        Self::Native
    }

    /// A credit asset; the code length picks the 4- or 12-byte arm.
    pub fn credit(code: &str, issuer: &str) -> Result<Self> {
        let issuer: AccountId = issuer.parse()?;
        Self::credit_with_issuer(code, issuer)
    }

    pub fn credit_with_issuer(code: &str, issuer: AccountId) -> Result<Self> {
        Ok(match code.parse::<AssetCode>()? {
            AssetCode::CreditAlphanum4(asset_code) => {
                Self::CreditAlphanum4(AlphaNum4 { asset_code, issuer })
            }
            AssetCode::CreditAlphanum12(asset_code) => {
                Self::CreditAlphanum12(AlphaNum12 { asset_code, issuer })
            }
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// `"XLM"` for native, otherwise the trimmed code.
    pub fn code(&self) -> String {
        match self {
            Self::Native => "XLM".to_string(),
            Self::CreditAlphanum4(a) => a.asset_code.as_string(),
            Self::CreditAlphanum12(a) => a.asset_code.as_string(),
        }
    }

    pub fn issuer(&self) -> Option<AccountId> {
        match self {
            Self::Native => None,
            Self::CreditAlphanum4(a) => Some(a.issuer),
            Self::CreditAlphanum12(a) => Some(a.issuer),
        }
    }
}

impl fmt::Display for Asset {
    /// `native` or `CODE:ISSUER`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issuer() {
            None => f.write_str("native"),
            Some(issuer) => write!(f, "{}:{}", self.code(), issuer),
        }
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset({self})")
    }
}

impl FromStr for Asset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "native" {
            return Ok(Self::Native);
        }
        let (code, issuer) = s
            .split_once(':')
            .ok_or_else(|| Error::constraint("asset", format!("expected native or CODE:ISSUER, got {s:?}")))?;
        Self::credit(code, issuer)
    }
}

impl WriteXdr for Asset {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Native => w.write_discriminant(ASSET_TYPE_NATIVE),
            Self::CreditAlphanum4(a) => {
                w.write_discriminant(ASSET_TYPE_CREDIT_ALPHANUM4);
                a.write_xdr(w);
            }
            Self::CreditAlphanum12(a) => {
                w.write_discriminant(ASSET_TYPE_CREDIT_ALPHANUM12);
                a.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for Asset {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            ASSET_TYPE_NATIVE => Self::Native,
            ASSET_TYPE_CREDIT_ALPHANUM4 => Self::CreditAlphanum4(AlphaNum4::read_xdr(r)?),
            ASSET_TYPE_CREDIT_ALPHANUM12 => Self::CreditAlphanum12(AlphaNum12::read_xdr(r)?),
            other => return Err(invalid_discriminant("Asset", other)),
        })
    }
}

serde_via_str!(Asset);

// ---------------------------------------------------------------------------
// Liquidity pools
// ---------------------------------------------------------------------------

/// Parameters of a constant-product pool
/// (`LiquidityPoolParameters`, single arm).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiquidityPoolParameters {
    pub asset_a: Asset,
    pub asset_b: Asset,
    /// Fee in basis points.
    pub fee: i32,
}

impl LiquidityPoolParameters {
    /// The standard pool over two assets. They must be distinct and given
    /// in ascending order.
    pub fn constant_product(asset_a: Asset, asset_b: Asset) -> Result<Self> {
        if asset_a >= asset_b {
            return Err(Error::constraint(
                "liquidity pool assets",
                "asset_a must sort strictly before asset_b",
            ));
        }
        Ok(Self {
            asset_a,
            asset_b,
            fee: LIQUIDITY_POOL_FEE_V18,
        })
    }

    /// SHA-256 of the parameters' XDR.
    pub fn pool_id(&self) -> PoolId {
        PoolId(Hash(sha256(&self.to_xdr())))
    }
}

impl WriteXdr for LiquidityPoolParameters {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_discriminant(LIQUIDITY_POOL_CONSTANT_PRODUCT);
        self.asset_a.write_xdr(w);
        self.asset_b.write_xdr(w);
        w.write_i32(self.fee);
    }
}

impl ReadXdr for LiquidityPoolParameters {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            LIQUIDITY_POOL_CONSTANT_PRODUCT => Ok(Self {
                asset_a: Asset::read_xdr(r)?,
                asset_b: Asset::read_xdr(r)?,
                fee: r.read_i32()?,
            }),
            other => Err(invalid_discriminant("LiquidityPoolParameters", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeTrustAsset / TrustLineAsset
// ---------------------------------------------------------------------------

/// The line in a change-trust operation: an asset or a pool share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeTrustAsset {
    Native,
    CreditAlphanum4(AlphaNum4),
    CreditAlphanum12(AlphaNum12),
    PoolShare(LiquidityPoolParameters),
}

impl From<Asset> for ChangeTrustAsset {
    fn from(asset: Asset) -> Self {
        match asset {
            Asset::Native => Self::Native,
            Asset::CreditAlphanum4(a) => Self::CreditAlphanum4(a),
            Asset::CreditAlphanum12(a) => Self::CreditAlphanum12(a),
        }
    }
}

impl WriteXdr for ChangeTrustAsset {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Native => Asset::Native.write_xdr(w),
            Self::CreditAlphanum4(a) => Asset::CreditAlphanum4(*a).write_xdr(w),
            Self::CreditAlphanum12(a) => Asset::CreditAlphanum12(*a).write_xdr(w),
            Self::PoolShare(params) => {
                w.write_discriminant(ASSET_TYPE_POOL_SHARE);
                params.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for ChangeTrustAsset {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            ASSET_TYPE_NATIVE => Self::Native,
            ASSET_TYPE_CREDIT_ALPHANUM4 => Self::CreditAlphanum4(AlphaNum4::read_xdr(r)?),
            ASSET_TYPE_CREDIT_ALPHANUM12 => Self::CreditAlphanum12(AlphaNum12::read_xdr(r)?),
            ASSET_TYPE_POOL_SHARE => Self::PoolShare(LiquidityPoolParameters::read_xdr(r)?),
            other => return Err(invalid_discriminant("ChangeTrustAsset", other)),
        })
    }
}

/// The asset of an existing trust line: an asset or a pool id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustLineAsset {
    Native,
    CreditAlphanum4(AlphaNum4),
    CreditAlphanum12(AlphaNum12),
    PoolShare(PoolId),
}

impl From<Asset> for TrustLineAsset {
    fn from(asset: Asset) -> Self {
        match asset {
            Asset::Native => Self::Native,
            Asset::CreditAlphanum4(a) => Self::CreditAlphanum4(a),
            Asset::CreditAlphanum12(a) => Self::CreditAlphanum12(a),
        }
    }
}

impl WriteXdr for TrustLineAsset {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Native => Asset::Native.write_xdr(w),
            Self::CreditAlphanum4(a) => Asset::CreditAlphanum4(*a).write_xdr(w),
            Self::CreditAlphanum12(a) => Asset::CreditAlphanum12(*a).write_xdr(w),
            Self::PoolShare(id) => {
                w.write_discriminant(ASSET_TYPE_POOL_SHARE);
                id.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for TrustLineAsset {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            ASSET_TYPE_NATIVE => Self::Native,
            ASSET_TYPE_CREDIT_ALPHANUM4 => Self::CreditAlphanum4(AlphaNum4::read_xdr(r)?),
            ASSET_TYPE_CREDIT_ALPHANUM12 => Self::CreditAlphanum12(AlphaNum12::read_xdr(r)?),
            ASSET_TYPE_POOL_SHARE => Self::PoolShare(PoolId::read_xdr(r)?),
            other => return Err(invalid_discriminant("TrustLineAsset", other)),
        })
    }
}
