//! # Hashing Utilities
//!
//! The network uses exactly one hash function: SHA-256. Network ids, the
//! transaction hash, pool ids, contract ids, hash-x signers and
//! authorization payloads are all SHA-256 of something. This module wraps it
//! once so nobody has to touch `sha2` directly.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::xdr::{ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

/// SHA-256 of `data`.
///
/// ```
/// use stellar_wire::crypto::sha256;
///
/// let digest = sha256(b"Test SDF Network ; September 2015");
/// assert_eq!(digest[0], 0xce);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 over the concatenation of `parts`, without building the
/// concatenation in memory.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// A 32-byte hash (`Hash` / `uint256` in XDR).
///
/// Displays and serializes as lowercase hex, which is how every explorer and
/// API shows transaction hashes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Hash of `data`.
    pub fn of(data: &[u8]) -> Self {
        Self(sha256(data))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out)?;
        Ok(Self(out))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl WriteXdr for Hash {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_fixed_opaque(&self.0);
    }
}

impl ReadXdr for Hash {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self(r.read_fixed_opaque()?))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        // SHA-256("abc"), FIPS 180-2 appendix B.1
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_empty_input() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_multi_matches_concatenation() {
        assert_eq!(sha256_multi(&[b"ab", b"", b"c"]), sha256(b"abc"));
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let h = Hash::of(b"payload");
        let parsed: Hash = h.to_string().parse().unwrap();
        assert_eq!(parsed, h);
        assert!(Hash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_hash_xdr_is_bare_32_bytes() {
        let h = Hash([9u8; 32]);
        assert_eq!(h.to_xdr(), vec![9u8; 32]);
        assert_eq!(Hash::from_xdr(&[9u8; 32]), Ok(h));
    }

    #[test]
    fn test_hash_serde_is_hex() {
        let h = Hash([0xab; 32]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        assert_eq!(serde_json::from_str::<Hash>(&json).unwrap(), h);
    }
}
