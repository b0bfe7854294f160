//! Hash-valued identifiers: liquidity pools, claimable balances, contracts.
//!
//! All three are 32-byte hashes on the wire. They display as StrKeys (`L...`,
//! `B...`, `C...`); pool and balance ids also parse from the hex form APIs
//! tend to return.

use std::fmt;
use std::str::FromStr;

use crate::crypto::Hash;
use crate::error::{Error, Result};
use crate::strkey;
use crate::xdr::{invalid_discriminant, ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::serde_via_str;

fn parse_hex32(s: &str) -> Option<[u8; 32]> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(s, &mut out).ok()?;
    Some(out)
}

// ---------------------------------------------------------------------------
// PoolId
// ---------------------------------------------------------------------------

/// A liquidity pool id: SHA-256 of the pool's parameters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(pub Hash);

impl PoolId {
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&strkey::encode_liquidity_pool(&self.0 .0))
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({})", self.to_hex())
    }
}

impl FromStr for PoolId {
    type Err = Error;

    /// Accepts `L...` or 64 hex characters.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(bytes) = parse_hex32(s) {
            return Ok(Self(Hash(bytes)));
        }
        Ok(Self(Hash(strkey::decode_liquidity_pool(s)?)))
    }
}

impl WriteXdr for PoolId {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.0.write_xdr(w);
    }
}

impl ReadXdr for PoolId {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self(Hash::read_xdr(r)?))
    }
}

serde_via_str!(PoolId);

// ---------------------------------------------------------------------------
// ClaimableBalanceId
// ---------------------------------------------------------------------------

const CLAIMABLE_BALANCE_ID_TYPE_V0: i32 = 0;

/// A claimable balance id (`ClaimableBalanceID`, only the v0 arm exists).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimableBalanceId(pub Hash);

impl ClaimableBalanceId {
    /// Hex of the full XDR, type prefix included: the form Horizon returns.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_xdr())
    }
}

impl fmt::Display for ClaimableBalanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&strkey::encode_claimable_balance(&self.0 .0))
    }
}

impl fmt::Debug for ClaimableBalanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimableBalanceId({})", self.0.to_hex())
    }
}

impl FromStr for ClaimableBalanceId {
    type Err = Error;

    /// Accepts `B...`, the 72-character hex XDR form, or a bare 64-character hash.
    fn from_str(s: &str) -> Result<Self> {
        if s.len() == 72 {
            if let Ok(bytes) = hex::decode(s) {
                return Ok(Self::from_xdr(&bytes)?);
            }
        }
        if let Some(bytes) = parse_hex32(s) {
            return Ok(Self(Hash(bytes)));
        }
        Ok(Self(Hash(strkey::decode_claimable_balance(s)?)))
    }
}

impl WriteXdr for ClaimableBalanceId {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_discriminant(CLAIMABLE_BALANCE_ID_TYPE_V0);
        self.0.write_xdr(w);
    }
}

impl ReadXdr for ClaimableBalanceId {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            CLAIMABLE_BALANCE_ID_TYPE_V0 => Ok(Self(Hash::read_xdr(r)?)),
            other => Err(invalid_discriminant("ClaimableBalanceID", other)),
        }
    }
}

serde_via_str!(ClaimableBalanceId);

// ---------------------------------------------------------------------------
// ContractId
// ---------------------------------------------------------------------------

/// A contract id (`C...`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractId(pub Hash);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&strkey::encode_contract(&self.0 .0))
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({self})")
    }
}

impl FromStr for ContractId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(Hash(strkey::decode_contract(s)?)))
    }
}

impl WriteXdr for ContractId {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.0.write_xdr(w);
    }
}

impl ReadXdr for ContractId {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self(Hash::read_xdr(r)?))
    }
}

serde_via_str!(ContractId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_id_parses_hex_and_strkey() {
        let id = PoolId(Hash([0x5a; 32]));
        assert_eq!(id.to_string().parse::<PoolId>().unwrap(), id);
        assert_eq!(id.to_hex().parse::<PoolId>().unwrap(), id);
        assert!(id.to_string().starts_with('L'));
    }

    #[test]
    fn test_balance_id_hex_includes_type() {
        let id = ClaimableBalanceId(Hash([0x11; 32]));
        let hex_form = id.to_hex();
        assert!(hex_form.starts_with("00000000"));
        assert_eq!(hex_form.len(), 72);
        assert_eq!(hex_form.parse::<ClaimableBalanceId>().unwrap(), id);
        assert_eq!(id.to_string().parse::<ClaimableBalanceId>().unwrap(), id);
    }

    #[test]
    fn test_balance_id_rejects_unknown_type() {
        let mut bytes = vec![0, 0, 0, 1];
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(ClaimableBalanceId::from_xdr(&bytes).is_err());
    }

    #[test]
    fn test_contract_id_strkey() {
        let c = "CA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQGAXE";
        let id: ContractId = c.parse().unwrap();
        assert_eq!(id.to_string(), c);
        assert_eq!(id.to_xdr().len(), 32);
    }
}
