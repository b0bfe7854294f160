//! Signer keys and weighted signers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::MAX_SIGNED_PAYLOAD_LENGTH;
use crate::error::{Error, Result};
use crate::strkey::{self, Version};
use crate::xdr::{invalid_discriminant, BytesM, ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::serde_via_str;

const SIGNER_KEY_TYPE_ED25519: i32 = 0;
const SIGNER_KEY_TYPE_PRE_AUTH_TX: i32 = 1;
const SIGNER_KEY_TYPE_HASH_X: i32 = 2;
const SIGNER_KEY_TYPE_ED25519_SIGNED_PAYLOAD: i32 = 3;

/// Anything that can be added as a signer on an account.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum SignerKey {
    /// An ed25519 public key (`G...`).
    Ed25519([u8; 32]),
    /// Hash of a specific transaction that is pre-authorized (`T...`).
    PreAuthTx([u8; 32]),
    /// SHA-256 of a secret preimage (`X...`).
    HashX([u8; 32]),
    /// An ed25519 key that must sign `payload` (`P...`).
    Ed25519SignedPayload {
        ed25519: [u8; 32],
        payload: BytesM<MAX_SIGNED_PAYLOAD_LENGTH>,
    },
}

impl fmt::Display for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ed25519(key) => strkey::encode_account_id(key),
            Self::PreAuthTx(hash) => strkey::encode_pre_auth_tx(hash),
            Self::HashX(hash) => strkey::encode_hash_x(hash),
            Self::Ed25519SignedPayload { ed25519, payload } => {
                strkey::encode_signed_payload(ed25519, payload).map_err(|_| fmt::Error)?
            }
        };
        f.write_str(&s)
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignerKey({self})")
    }
}

impl FromStr for SignerKey {
    type Err = Error;

    /// Parses `G...`, `T...`, `X...` or `P...`.
    fn from_str(s: &str) -> Result<Self> {
        let (version, payload) = strkey::decode(s)?;
        let fixed = |bytes: &[u8]| -> Result<[u8; 32]> {
            bytes
                .try_into()
                .map_err(|_| Error::constraint("signer", "expected a 32-byte key"))
        };
        match version {
            Version::AccountId => Ok(Self::Ed25519(fixed(&payload)?)),
            Version::PreAuthTx => Ok(Self::PreAuthTx(fixed(&payload)?)),
            Version::HashX => Ok(Self::HashX(fixed(&payload)?)),
            Version::SignedPayload => {
                let (ed25519, payload) = strkey::decode_signed_payload(s)?;
                Ok(Self::Ed25519SignedPayload {
                    ed25519,
                    payload: BytesM::try_from(payload)?,
                })
            }
            other => Err(Error::constraint(
                "signer",
                format!("{other} strkey is not a signer key"),
            )),
        }
    }
}

impl WriteXdr for SignerKey {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Ed25519(key) => {
                w.write_discriminant(SIGNER_KEY_TYPE_ED25519);
                w.write_fixed_opaque(key);
            }
            Self::PreAuthTx(hash) => {
                w.write_discriminant(SIGNER_KEY_TYPE_PRE_AUTH_TX);
                w.write_fixed_opaque(hash);
            }
            Self::HashX(hash) => {
                w.write_discriminant(SIGNER_KEY_TYPE_HASH_X);
                w.write_fixed_opaque(hash);
            }
            Self::Ed25519SignedPayload { ed25519, payload } => {
                w.write_discriminant(SIGNER_KEY_TYPE_ED25519_SIGNED_PAYLOAD);
                w.write_fixed_opaque(ed25519);
                payload.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for SignerKey {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            SIGNER_KEY_TYPE_ED25519 => Self::Ed25519(r.read_fixed_opaque()?),
            SIGNER_KEY_TYPE_PRE_AUTH_TX => Self::PreAuthTx(r.read_fixed_opaque()?),
            SIGNER_KEY_TYPE_HASH_X => Self::HashX(r.read_fixed_opaque()?),
            SIGNER_KEY_TYPE_ED25519_SIGNED_PAYLOAD => Self::Ed25519SignedPayload {
                ed25519: r.read_fixed_opaque()?,
                payload: BytesM::read_xdr(r)?,
            },
            other => return Err(invalid_discriminant("SignerKey", other)),
        })
    }
}

serde_via_str!(SignerKey);

/// A signer and its weight (`Signer` in XDR).
///
/// Weights are 0..=255; a weight of 0 removes the signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signer {
    pub key: SignerKey,
    pub weight: u32,
}

impl Signer {
    pub fn new(key: SignerKey, weight: u32) -> Result<Self> {
        if weight > 255 {
            return Err(Error::constraint("signer weight", "must be at most 255"));
        }
        Ok(Self { key, weight })
    }
}

impl WriteXdr for Signer {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.key.write_xdr(w);
        w.write_u32(self.weight);
    }
}

impl ReadXdr for Signer {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            key: SignerKey::read_xdr(r)?,
            weight: r.read_u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strkey_roundtrip_for_every_kind() {
        let keys = [
            SignerKey::Ed25519([1; 32]),
            SignerKey::PreAuthTx([2; 32]),
            SignerKey::HashX([3; 32]),
            SignerKey::Ed25519SignedPayload {
                ed25519: [4; 32],
                payload: BytesM::try_from(vec![5u8; 7]).unwrap(),
            },
        ];
        let prefixes = ['G', 'T', 'X', 'P'];
        for (key, prefix) in keys.iter().zip(prefixes) {
            let s = key.to_string();
            assert!(s.starts_with(prefix));
            assert_eq!(&s.parse::<SignerKey>().unwrap(), key);
            assert_eq!(&SignerKey::from_xdr(&key.to_xdr()).unwrap(), key);
        }
    }

    #[test]
    fn test_contract_is_not_a_signer() {
        let c = strkey::encode_contract(&[0; 32]);
        assert!(c.parse::<SignerKey>().is_err());
    }

    #[test]
    fn test_weight_bound() {
        assert!(Signer::new(SignerKey::Ed25519([0; 32]), 256).is_err());
        let signer = Signer::new(SignerKey::Ed25519([0; 32]), 255).unwrap();
        assert_eq!(signer.to_xdr().len(), 4 + 32 + 4);
    }
}
