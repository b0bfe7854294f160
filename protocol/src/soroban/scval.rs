//! Smart-contract values (`SCVal`) and addresses (`SCAddress`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::Hash;
use crate::error::{Error, Result};
use crate::strkey::{self, Version};
use crate::types::{AccountId, ClaimableBalanceId, ContractId, PoolId};
use crate::xdr::{
    invalid_discriminant, xdr_enum, BytesM, ReadXdr, StringM, VecM, WriteXdr, XdrError,
    XdrReader, XdrWriter,
};

/// Longest symbol a contract can name.
pub const SC_SYMBOL_LIMIT: u32 = 32;

pub type ScSymbol = StringM<SC_SYMBOL_LIMIT>;
pub type ScVec = VecM<ScVal>;
pub type ScMap = VecM<ScMapEntry>;

/// Validates and wraps a contract symbol: `[a-zA-Z0-9_]`, at most 32 bytes.
pub fn symbol(name: &str) -> Result<ScSymbol> {
    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(Error::constraint("symbol", format!("{name:?} has characters outside [a-zA-Z0-9_]")));
    }
    ScSymbol::try_from(name)
        .map_err(|_| Error::constraint("symbol", format!("{name:?} is longer than {SC_SYMBOL_LIMIT} bytes")))
}

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// A muxed account as a contract sees it (`MuxedEd25519Account`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MuxedEd25519Account {
    pub id: u64,
    pub ed25519: [u8; 32],
}

impl WriteXdr for MuxedEd25519Account {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_u64(self.id);
        w.write_fixed_opaque(&self.ed25519);
    }
}

impl ReadXdr for MuxedEd25519Account {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            id: r.read_u64()?,
            ed25519: r.read_fixed_opaque()?,
        })
    }
}

const SC_ADDRESS_TYPE_ACCOUNT: i32 = 0;
const SC_ADDRESS_TYPE_CONTRACT: i32 = 1;
const SC_ADDRESS_TYPE_MUXED_ACCOUNT: i32 = 2;
const SC_ADDRESS_TYPE_CLAIMABLE_BALANCE: i32 = 3;
const SC_ADDRESS_TYPE_LIQUIDITY_POOL: i32 = 4;

/// Anything a contract can address. The string form is the matching StrKey.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScAddress {
    Account(AccountId),
    Contract(ContractId),
    MuxedAccount(MuxedEd25519Account),
    ClaimableBalance(ClaimableBalanceId),
    LiquidityPool(PoolId),
}

impl fmt::Display for ScAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(id) => id.fmt(f),
            Self::Contract(id) => id.fmt(f),
            Self::MuxedAccount(m) => f.write_str(&strkey::encode_muxed_account(&m.ed25519, m.id)),
            Self::ClaimableBalance(id) => id.fmt(f),
            Self::LiquidityPool(id) => id.fmt(f),
        }
    }
}

impl fmt::Debug for ScAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScAddress({self})")
    }
}

impl FromStr for ScAddress {
    type Err = Error;

    /// Accepts `G...`, `C...`, `M...`, `B...` and `L...`.
    fn from_str(s: &str) -> Result<Self> {
        let (version, _) = strkey::decode(s)?;
        Ok(match version {
            Version::AccountId => Self::Account(s.parse()?),
            Version::Contract => Self::Contract(s.parse()?),
            Version::MuxedAccount => {
                let (ed25519, id) = strkey::decode_muxed_account(s)?;
                Self::MuxedAccount(MuxedEd25519Account { id, ed25519 })
            }
            Version::ClaimableBalance => Self::ClaimableBalance(s.parse()?),
            Version::LiquidityPool => Self::LiquidityPool(s.parse()?),
            other => {
                return Err(Error::constraint(
                    "address",
                    format!("{other} strkey is not a contract address"),
                ))
            }
        })
    }
}

impl From<AccountId> for ScAddress {
    fn from(id: AccountId) -> Self {
        Self::Account(id)
    }
}

impl From<ContractId> for ScAddress {
    fn from(id: ContractId) -> Self {
        Self::Contract(id)
    }
}

impl WriteXdr for ScAddress {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Account(id) => {
                w.write_discriminant(SC_ADDRESS_TYPE_ACCOUNT);
                id.write_xdr(w);
            }
            Self::Contract(id) => {
                w.write_discriminant(SC_ADDRESS_TYPE_CONTRACT);
                id.write_xdr(w);
            }
            Self::MuxedAccount(m) => {
                w.write_discriminant(SC_ADDRESS_TYPE_MUXED_ACCOUNT);
                m.write_xdr(w);
            }
            Self::ClaimableBalance(id) => {
                w.write_discriminant(SC_ADDRESS_TYPE_CLAIMABLE_BALANCE);
                id.write_xdr(w);
            }
            Self::LiquidityPool(id) => {
                w.write_discriminant(SC_ADDRESS_TYPE_LIQUIDITY_POOL);
                id.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for ScAddress {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            SC_ADDRESS_TYPE_ACCOUNT => Self::Account(AccountId::read_xdr(r)?),
            SC_ADDRESS_TYPE_CONTRACT => Self::Contract(ContractId::read_xdr(r)?),
            SC_ADDRESS_TYPE_MUXED_ACCOUNT => Self::MuxedAccount(MuxedEd25519Account::read_xdr(r)?),
            SC_ADDRESS_TYPE_CLAIMABLE_BALANCE => {
                Self::ClaimableBalance(ClaimableBalanceId::read_xdr(r)?)
            }
            SC_ADDRESS_TYPE_LIQUIDITY_POOL => Self::LiquidityPool(PoolId::read_xdr(r)?),
            other => return Err(invalid_discriminant("ScAddress", other)),
        })
    }
}

crate::types::serde_via_str!(ScAddress);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

xdr_enum! {
    /// Generic error codes carried by host errors.
    pub enum ScErrorCode {
        ArithDomain = 0,
        IndexBounds = 1,
        InvalidInput = 2,
        MissingValue = 3,
        ExistingValue = 4,
        ExceededLimit = 5,
        InvalidAction = 6,
        InternalError = 7,
        UnexpectedType = 8,
        UnexpectedSize = 9,
    }
}

/// A contract or host error value (`SCError`).
///
/// Contract errors carry the contract's own code; every host subsystem
/// carries a generic [`ScErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScError {
    Contract(u32),
    WasmVm(ScErrorCode),
    Context(ScErrorCode),
    Storage(ScErrorCode),
    Object(ScErrorCode),
    Crypto(ScErrorCode),
    Events(ScErrorCode),
    Budget(ScErrorCode),
    Value(ScErrorCode),
    Auth(ScErrorCode),
}

impl WriteXdr for ScError {
    fn write_xdr(&self, w: &mut XdrWriter) {
        let (disc, code) = match *self {
            Self::Contract(code) => {
                w.write_discriminant(0);
                w.write_u32(code);
                return;
            }
            Self::WasmVm(code) => (1, code),
            Self::Context(code) => (2, code),
            Self::Storage(code) => (3, code),
            Self::Object(code) => (4, code),
            Self::Crypto(code) => (5, code),
            Self::Events(code) => (6, code),
            Self::Budget(code) => (7, code),
            Self::Value(code) => (8, code),
            Self::Auth(code) => (9, code),
        };
        w.write_discriminant(disc);
        code.write_xdr(w);
    }
}

impl ReadXdr for ScError {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        let disc = r.read_discriminant()?;
        if disc == 0 {
            return Ok(Self::Contract(r.read_u32()?));
        }
        let wrap: fn(ScErrorCode) -> Self = match disc {
            1 => Self::WasmVm,
            2 => Self::Context,
            3 => Self::Storage,
            4 => Self::Object,
            5 => Self::Crypto,
            6 => Self::Events,
            7 => Self::Budget,
            8 => Self::Value,
            9 => Self::Auth,
            other => return Err(invalid_discriminant("ScError", other)),
        };
        Ok(wrap(ScErrorCode::read_xdr(r)?))
    }
}

// ---------------------------------------------------------------------------
// Wide integers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UInt128Parts {
    pub hi: u64,
    pub lo: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Int128Parts {
    pub hi: i64,
    pub lo: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UInt256Parts {
    pub hi_hi: u64,
    pub hi_lo: u64,
    pub lo_hi: u64,
    pub lo_lo: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Int256Parts {
    pub hi_hi: i64,
    pub hi_lo: u64,
    pub lo_hi: u64,
    pub lo_lo: u64,
}

impl From<u128> for UInt128Parts {
    fn from(v: u128) -> Self {
        Self {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

impl From<UInt128Parts> for u128 {
    fn from(p: UInt128Parts) -> Self {
        (u128::from(p.hi) << 64) | u128::from(p.lo)
    }
}

impl From<i128> for Int128Parts {
    fn from(v: i128) -> Self {
        Self {
            hi: (v >> 64) as i64,
            lo: v as u64,
        }
    }
}

impl From<Int128Parts> for i128 {
    fn from(p: Int128Parts) -> Self {
        (i128::from(p.hi) << 64) | i128::from(p.lo)
    }
}

macro_rules! parts_codec {
    ($name:ident { $($field:ident: $read:ident / $write:ident),+ }) => {
        impl WriteXdr for $name {
            fn write_xdr(&self, w: &mut XdrWriter) {
                $(w.$write(self.$field);)+
            }
        }

        impl ReadXdr for $name {
            fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
                Ok(Self { $($field: r.$read()?),+ })
            }
        }
    };
}

parts_codec!(UInt128Parts { hi: read_u64 / write_u64, lo: read_u64 / write_u64 });
parts_codec!(Int128Parts { hi: read_i64 / write_i64, lo: read_u64 / write_u64 });
parts_codec!(UInt256Parts {
    hi_hi: read_u64 / write_u64,
    hi_lo: read_u64 / write_u64,
    lo_hi: read_u64 / write_u64,
    lo_lo: read_u64 / write_u64
});
parts_codec!(Int256Parts {
    hi_hi: read_i64 / write_i64,
    hi_lo: read_u64 / write_u64,
    lo_hi: read_u64 / write_u64,
    lo_lo: read_u64 / write_u64
});

// ---------------------------------------------------------------------------
// Contract instances
// ---------------------------------------------------------------------------

/// What a contract instance runs (`ContractExecutable`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractExecutable {
    /// Hash of uploaded Wasm.
    Wasm(Hash),
    /// The built-in asset contract.
    StellarAsset,
}

impl WriteXdr for ContractExecutable {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Wasm(hash) => {
                w.write_discriminant(0);
                hash.write_xdr(w);
            }
            Self::StellarAsset => w.write_discriminant(1),
        }
    }
}

impl ReadXdr for ContractExecutable {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            0 => Self::Wasm(Hash::read_xdr(r)?),
            1 => Self::StellarAsset,
            other => return Err(invalid_discriminant("ContractExecutable", other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScContractInstance {
    pub executable: ContractExecutable,
    pub storage: Option<ScMap>,
}

impl WriteXdr for ScContractInstance {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.executable.write_xdr(w);
        w.write_option(&self.storage);
    }
}

impl ReadXdr for ScContractInstance {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            executable: ContractExecutable::read_xdr(r)?,
            storage: r.read_option()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScMapEntry {
    pub key: ScVal,
    pub val: ScVal,
}

impl WriteXdr for ScMapEntry {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.key.write_xdr(w);
        self.val.write_xdr(w);
    }
}

impl ReadXdr for ScMapEntry {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            key: ScVal::read_xdr(r)?,
            val: ScVal::read_xdr(r)?,
        })
    }
}

// ---------------------------------------------------------------------------
// ScVal
// ---------------------------------------------------------------------------

mod tag {
    pub const BOOL: i32 = 0;
    pub const VOID: i32 = 1;
    pub const ERROR: i32 = 2;
    pub const U32: i32 = 3;
    pub const I32: i32 = 4;
    pub const U64: i32 = 5;
    pub const I64: i32 = 6;
    pub const TIMEPOINT: i32 = 7;
    pub const DURATION: i32 = 8;
    pub const U128: i32 = 9;
    pub const I128: i32 = 10;
    pub const U256: i32 = 11;
    pub const I256: i32 = 12;
    pub const BYTES: i32 = 13;
    pub const STRING: i32 = 14;
    pub const SYMBOL: i32 = 15;
    pub const VEC: i32 = 16;
    pub const MAP: i32 = 17;
    pub const ADDRESS: i32 = 18;
    pub const CONTRACT_INSTANCE: i32 = 19;
    pub const LEDGER_KEY_CONTRACT_INSTANCE: i32 = 20;
    pub const LEDGER_KEY_NONCE: i32 = 21;
}

/// A value passed to or stored by a contract.
///
/// `Vec` and `Map` are optional on the wire; `None` is distinct from an
/// empty collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScVal {
    Bool(bool),
    Void,
    Error(ScError),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Timepoint(u64),
    Duration(u64),
    U128(UInt128Parts),
    I128(Int128Parts),
    U256(UInt256Parts),
    I256(Int256Parts),
    Bytes(BytesM),
    String(StringM),
    Symbol(ScSymbol),
    Vec(Option<ScVec>),
    Map(Option<ScMap>),
    Address(ScAddress),
    ContractInstance(ScContractInstance),
    LedgerKeyContractInstance,
    /// The nonce of an address-credential authorization.
    LedgerKeyNonce(i64),
}

impl ScVal {
    pub fn symbol(name: &str) -> Result<Self> {
        Ok(Self::Symbol(symbol(name)?))
    }

    pub fn string(s: &str) -> Result<Self> {
        Ok(Self::String(StringM::try_from(s)?))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self::Bytes(BytesM::try_from(bytes.into())?))
    }

    pub fn vec(items: Vec<ScVal>) -> Result<Self> {
        Ok(Self::Vec(Some(VecM::try_from(items)?)))
    }

    /// A map in the given entry order. The host requires keys sorted, which
    /// is left to the caller.
    pub fn map(entries: Vec<(ScVal, ScVal)>) -> Result<Self> {
        let entries: Vec<ScMapEntry> = entries
            .into_iter()
            .map(|(key, val)| ScMapEntry { key, val })
            .collect();
        Ok(Self::Map(Some(VecM::try_from(entries)?)))
    }

    pub fn address(address: &str) -> Result<Self> {
        Ok(Self::Address(address.parse()?))
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::U128(parts) => Some((*parts).into()),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::I128(parts) => Some((*parts).into()),
            _ => None,
        }
    }
}

macro_rules! scval_from {
    ($($ty:ty => $arm:ident),+ $(,)?) => {
        $(
            impl From<$ty> for ScVal {
                fn from(v: $ty) -> Self {
                    Self::$arm(v.into())
                }
            }
        )+
    };
}

scval_from! {
    bool => Bool,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    u128 => U128,
    i128 => I128,
    ScAddress => Address,
    ScError => Error,
}

impl From<()> for ScVal {
    fn from(_: ()) -> Self {
        Self::Void
    }
}

impl WriteXdr for ScVal {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Bool(v) => {
                w.write_discriminant(tag::BOOL);
                w.write_bool(*v);
            }
            Self::Void => w.write_discriminant(tag::VOID),
            Self::Error(e) => {
                w.write_discriminant(tag::ERROR);
                e.write_xdr(w);
            }
            Self::U32(v) => {
                w.write_discriminant(tag::U32);
                w.write_u32(*v);
            }
            Self::I32(v) => {
                w.write_discriminant(tag::I32);
                w.write_i32(*v);
            }
            Self::U64(v) => {
                w.write_discriminant(tag::U64);
                w.write_u64(*v);
            }
            Self::I64(v) => {
                w.write_discriminant(tag::I64);
                w.write_i64(*v);
            }
            Self::Timepoint(v) => {
                w.write_discriminant(tag::TIMEPOINT);
                w.write_u64(*v);
            }
            Self::Duration(v) => {
                w.write_discriminant(tag::DURATION);
                w.write_u64(*v);
            }
            Self::U128(v) => {
                w.write_discriminant(tag::U128);
                v.write_xdr(w);
            }
            Self::I128(v) => {
                w.write_discriminant(tag::I128);
                v.write_xdr(w);
            }
            Self::U256(v) => {
                w.write_discriminant(tag::U256);
                v.write_xdr(w);
            }
            Self::I256(v) => {
                w.write_discriminant(tag::I256);
                v.write_xdr(w);
            }
            Self::Bytes(v) => {
                w.write_discriminant(tag::BYTES);
                v.write_xdr(w);
            }
            Self::String(v) => {
                w.write_discriminant(tag::STRING);
                v.write_xdr(w);
            }
            Self::Symbol(v) => {
                w.write_discriminant(tag::SYMBOL);
                v.write_xdr(w);
            }
            Self::Vec(v) => {
                w.write_discriminant(tag::VEC);
                w.write_option(v);
            }
            Self::Map(v) => {
                w.write_discriminant(tag::MAP);
                w.write_option(v);
            }
            Self::Address(v) => {
                w.write_discriminant(tag::ADDRESS);
                v.write_xdr(w);
            }
            Self::ContractInstance(v) => {
                w.write_discriminant(tag::CONTRACT_INSTANCE);
                v.write_xdr(w);
            }
            Self::LedgerKeyContractInstance => {
                w.write_discriminant(tag::LEDGER_KEY_CONTRACT_INSTANCE)
            }
            Self::LedgerKeyNonce(nonce) => {
                w.write_discriminant(tag::LEDGER_KEY_NONCE);
                w.write_i64(*nonce);
            }
        }
    }
}

impl ReadXdr for ScVal {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        let disc = r.read_discriminant()?;
        r.nested(|r| {
            Ok(match disc {
                tag::BOOL => Self::Bool(r.read_bool()?),
                tag::VOID => Self::Void,
                tag::ERROR => Self::Error(ScError::read_xdr(r)?),
                tag::U32 => Self::U32(r.read_u32()?),
                tag::I32 => Self::I32(r.read_i32()?),
                tag::U64 => Self::U64(r.read_u64()?),
                tag::I64 => Self::I64(r.read_i64()?),
                tag::TIMEPOINT => Self::Timepoint(r.read_u64()?),
                tag::DURATION => Self::Duration(r.read_u64()?),
                tag::U128 => Self::U128(UInt128Parts::read_xdr(r)?),
                tag::I128 => Self::I128(Int128Parts::read_xdr(r)?),
                tag::U256 => Self::U256(UInt256Parts::read_xdr(r)?),
                tag::I256 => Self::I256(Int256Parts::read_xdr(r)?),
                tag::BYTES => Self::Bytes(BytesM::read_xdr(r)?),
                tag::STRING => Self::String(StringM::read_xdr(r)?),
                tag::SYMBOL => Self::Symbol(ScSymbol::read_xdr(r)?),
                tag::VEC => Self::Vec(r.read_option()?),
                tag::MAP => Self::Map(r.read_option()?),
                tag::ADDRESS => Self::Address(ScAddress::read_xdr(r)?),
                tag::CONTRACT_INSTANCE => Self::ContractInstance(ScContractInstance::read_xdr(r)?),
                tag::LEDGER_KEY_CONTRACT_INSTANCE => Self::LedgerKeyContractInstance,
                tag::LEDGER_KEY_NONCE => Self::LedgerKeyNonce(r.read_i64()?),
                other => return Err(invalid_discriminant("ScVal", other)),
            })
        })
    }
}
