//! # StrKey Addresses
//!
//! The human-facing form of every key and identifier on the network:
//!
//! ```text
//! base32( version_byte || payload || crc16_xmodem(version_byte || payload) as little-endian )
//! ```
//!
//! The version byte is chosen so the first base32 character spells the kind
//! of thing you're looking at: `G` for accounts, `S` for seeds, `C` for
//! contracts, and so on.
//!
//! The checksum is the only thing standing between a fat-fingered address and
//! a payment to nowhere, so decoding is strict. A string that fails any check
//! is rejected outright; there is no "best effort" mode.
//!
//! Decode checks run in a fixed order: base32 shape, then checksum, then
//! version byte, then payload length. A typo therefore surfaces as
//! [`StrKeyError::Checksum`], not as some other error that happens to fire
//! first on the corrupted bytes.

mod base32;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MAX_SIGNED_PAYLOAD_LENGTH;
use crate::xdr::padding_len;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrKeyError {
    /// Not canonical base32, or too short to hold a version and checksum.
    #[error("invalid base32 encoding")]
    InvalidEncoding,

    /// The checksum does not match. Almost always a typo.
    #[error("checksum mismatch: expected {expected:#06x}, computed {actual:#06x}")]
    Checksum { expected: u16, actual: u16 },

    #[error("unknown version byte {0:#04x}")]
    UnknownVersion(u8),

    /// A valid StrKey of the wrong kind, e.g. a seed where an account was expected.
    #[error("expected {expected} strkey, found {found}")]
    UnexpectedVersion { expected: Version, found: Version },

    #[error("invalid payload length {len} for {version} strkey")]
    InvalidLength { version: Version, len: usize },

    #[error("invalid payload: {0}")]
    InvalidPayload(&'static str),
}

// ---------------------------------------------------------------------------
// Version bytes
// ---------------------------------------------------------------------------

/// The kinds of StrKey, by version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    /// `G...`, an ed25519 public key.
    AccountId,
    /// `M...`, an ed25519 public key plus a 64-bit multiplexing id.
    MuxedAccount,
    /// `S...`, an ed25519 secret seed.
    Seed,
    /// `T...`, a pre-authorized transaction hash.
    PreAuthTx,
    /// `X...`, the SHA-256 hash of a signing preimage.
    HashX,
    /// `P...`, an ed25519 key plus a payload it must sign.
    SignedPayload,
    /// `C...`, a contract id.
    Contract,
    /// `L...`, a liquidity pool id.
    LiquidityPool,
    /// `B...`, a claimable balance id.
    ClaimableBalance,
}

impl Version {
    pub const ALL: [Version; 9] = [
        Version::AccountId,
        Version::MuxedAccount,
        Version::Seed,
        Version::PreAuthTx,
        Version::HashX,
        Version::SignedPayload,
        Version::Contract,
        Version::LiquidityPool,
        Version::ClaimableBalance,
    ];

    /// The version byte. Always a multiple of 8 so it fills exactly the
    /// first base32 character.
    pub const fn byte(self) -> u8 {
        match self {
            Version::AccountId => 6 << 3,
            Version::MuxedAccount => 12 << 3,
            Version::Seed => 18 << 3,
            Version::PreAuthTx => 19 << 3,
            Version::HashX => 23 << 3,
            Version::SignedPayload => 15 << 3,
            Version::Contract => 2 << 3,
            Version::LiquidityPool => 11 << 3,
            Version::ClaimableBalance => 1 << 3,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.byte() == byte)
    }

    /// The leading character of every StrKey of this kind.
    pub const fn prefix(self) -> char {
        match self {
            Version::AccountId => 'G',
            Version::MuxedAccount => 'M',
            Version::Seed => 'S',
            Version::PreAuthTx => 'T',
            Version::HashX => 'X',
            Version::SignedPayload => 'P',
            Version::Contract => 'C',
            Version::LiquidityPool => 'L',
            Version::ClaimableBalance => 'B',
        }
    }

    fn check_payload(self, payload: &[u8]) -> Result<(), StrKeyError> {
        let len = payload.len();
        let bad_len = || StrKeyError::InvalidLength { version: self, len };
        match self {
            Version::MuxedAccount => (len == 40).then_some(()).ok_or_else(bad_len),
            Version::ClaimableBalance => {
                if len != 33 {
                    return Err(bad_len());
                }
                match payload[0] {
                    0 => Ok(()),
                    _ => Err(StrKeyError::InvalidPayload("unknown claimable balance id type")),
                }
            }
            Version::SignedPayload => check_signed_payload(payload).map(|_| ()),
            _ => (len == 32).then_some(()).ok_or_else(bad_len),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Version::AccountId => "account id",
            Version::MuxedAccount => "muxed account",
            Version::Seed => "secret seed",
            Version::PreAuthTx => "pre-auth tx",
            Version::HashX => "hash-x",
            Version::SignedPayload => "signed payload",
            Version::Contract => "contract",
            Version::LiquidityPool => "liquidity pool",
            Version::ClaimableBalance => "claimable balance",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Checksum
// ---------------------------------------------------------------------------

/// CRC-16/XMODEM: polynomial 0x1021, initial value 0, no reflection.
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

// ---------------------------------------------------------------------------
// Generic encode / decode
// ---------------------------------------------------------------------------

/// Encodes `payload` under `version`. Payload length is the caller's
/// responsibility; the typed helpers below always get it right.
pub fn encode(version: Version, payload: &[u8]) -> String {
    let mut raw = Vec::with_capacity(payload.len() + 3);
    raw.push(version.byte());
    raw.extend_from_slice(payload);
    let checksum = crc16_xmodem(&raw);
    raw.extend_from_slice(&checksum.to_le_bytes());
    base32::encode(&raw)
}

/// Decodes any StrKey, returning its kind and raw payload.
pub fn decode(s: &str) -> Result<(Version, Vec<u8>), StrKeyError> {
    let raw = base32::decode(s).ok_or(StrKeyError::InvalidEncoding)?;
    if raw.len() < 3 {
        return Err(StrKeyError::InvalidEncoding);
    }

    let (body, checksum) = raw.split_at(raw.len() - 2);
    let expected = u16::from_le_bytes([checksum[0], checksum[1]]);
    let actual = crc16_xmodem(body);
    if expected != actual {
        return Err(StrKeyError::Checksum { expected, actual });
    }

    let version = Version::from_byte(body[0]).ok_or(StrKeyError::UnknownVersion(body[0]))?;
    let payload = &body[1..];
    version.check_payload(payload)?;
    Ok((version, payload.to_vec()))
}

/// Decodes a StrKey that must be of kind `expected`.
pub fn decode_as(expected: Version, s: &str) -> Result<Vec<u8>, StrKeyError> {
    let (found, payload) = decode(s)?;
    if found != expected {
        return Err(StrKeyError::UnexpectedVersion { expected, found });
    }
    Ok(payload)
}

fn into_array<const N: usize>(version: Version, payload: &[u8]) -> Result<[u8; N], StrKeyError> {
    payload
        .try_into()
        .map_err(|_| StrKeyError::InvalidLength {
            version,
            len: payload.len(),
        })
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

macro_rules! fixed_32 {
    ($version:ident, $encode:ident, $decode:ident, $is_valid:ident, $what:literal) => {
        #[doc = concat!("Encodes ", $what, ".")]
        pub fn $encode(bytes: &[u8; 32]) -> String {
            encode(Version::$version, bytes)
        }

        #[doc = concat!("Decodes ", $what, ".")]
        pub fn $decode(s: &str) -> Result<[u8; 32], StrKeyError> {
            into_array(Version::$version, &decode_as(Version::$version, s)?)
        }

        pub fn $is_valid(s: &str) -> bool {
            $decode(s).is_ok()
        }
    };
}

fixed_32!(AccountId, encode_account_id, decode_account_id, is_valid_account_id, "an ed25519 public key as `G...`");
fixed_32!(Seed, encode_secret_seed, decode_secret_seed, is_valid_secret_seed, "an ed25519 secret seed as `S...`");
fixed_32!(PreAuthTx, encode_pre_auth_tx, decode_pre_auth_tx, is_valid_pre_auth_tx, "a pre-authorized transaction hash as `T...`");
fixed_32!(HashX, encode_hash_x, decode_hash_x, is_valid_hash_x, "a hash-x signer as `X...`");
fixed_32!(Contract, encode_contract, decode_contract, is_valid_contract, "a contract id as `C...`");
fixed_32!(LiquidityPool, encode_liquidity_pool, decode_liquidity_pool, is_valid_liquidity_pool, "a liquidity pool id as `L...`");

/// Encodes a muxed account as `M...`.
///
/// The StrKey payload is key then id. The XDR union puts the id first; see
/// `types::account` for that side.
pub fn encode_muxed_account(ed25519: &[u8; 32], id: u64) -> String {
    let mut payload = [0u8; 40];
    payload[..32].copy_from_slice(ed25519);
    payload[32..].copy_from_slice(&id.to_be_bytes());
    encode(Version::MuxedAccount, &payload)
}

/// Decodes `M...` into its ed25519 key and id.
pub fn decode_muxed_account(s: &str) -> Result<([u8; 32], u64), StrKeyError> {
    let payload = decode_as(Version::MuxedAccount, s)?;
    let key = into_array::<32>(Version::MuxedAccount, &payload[..32])?;
    let id = u64::from_be_bytes(into_array::<8>(Version::MuxedAccount, &payload[32..])?);
    Ok((key, id))
}

pub fn is_valid_muxed_account(s: &str) -> bool {
    decode_muxed_account(s).is_ok()
}

/// Encodes an ed25519 signed-payload signer as `P...`.
///
/// Layout: key (32), payload length (u32 big-endian), payload zero-padded to
/// a multiple of four. Payloads longer than 64 bytes are rejected.
pub fn encode_signed_payload(ed25519: &[u8; 32], payload: &[u8]) -> Result<String, StrKeyError> {
    if payload.len() > MAX_SIGNED_PAYLOAD_LENGTH as usize {
        return Err(StrKeyError::InvalidPayload("signed payload longer than 64 bytes"));
    }
    let mut raw = Vec::with_capacity(36 + payload.len() + 3);
    raw.extend_from_slice(ed25519);
    raw.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    raw.extend_from_slice(payload);
    raw.resize(raw.len() + padding_len(payload.len()), 0);
    Ok(encode(Version::SignedPayload, &raw))
}

/// Decodes `P...` into its ed25519 key and the inner payload.
pub fn decode_signed_payload(s: &str) -> Result<([u8; 32], Vec<u8>), StrKeyError> {
    let raw = decode_as(Version::SignedPayload, s)?;
    check_signed_payload(&raw)
}

pub fn is_valid_signed_payload(s: &str) -> bool {
    decode_signed_payload(s).is_ok()
}

fn check_signed_payload(raw: &[u8]) -> Result<([u8; 32], Vec<u8>), StrKeyError> {
    let bad_len = || StrKeyError::InvalidLength {
        version: Version::SignedPayload,
        len: raw.len(),
    };
    if raw.len() < 36 || raw.len() > 36 + MAX_SIGNED_PAYLOAD_LENGTH as usize {
        return Err(bad_len());
    }
    let key = into_array::<32>(Version::SignedPayload, &raw[..32])?;
    let inner_len = u32::from_be_bytes(into_array::<4>(Version::SignedPayload, &raw[32..36])?);
    if inner_len > MAX_SIGNED_PAYLOAD_LENGTH {
        return Err(StrKeyError::InvalidPayload("signed payload length out of range"));
    }
    let inner_len = inner_len as usize;
    if raw.len() != 36 + inner_len + padding_len(inner_len) {
        return Err(bad_len());
    }
    if raw[36 + inner_len..].iter().any(|b| *b != 0) {
        return Err(StrKeyError::InvalidPayload("non-zero signed payload padding"));
    }
    Ok((key, raw[36..36 + inner_len].to_vec()))
}

/// Encodes a claimable balance id (v0 hash) as `B...`.
pub fn encode_claimable_balance(hash: &[u8; 32]) -> String {
    let mut payload = [0u8; 33];
    payload[1..].copy_from_slice(hash);
    encode(Version::ClaimableBalance, &payload)
}

/// Decodes `B...` into the v0 balance hash.
pub fn decode_claimable_balance(s: &str) -> Result<[u8; 32], StrKeyError> {
    let payload = decode_as(Version::ClaimableBalance, s)?;
    into_array(Version::ClaimableBalance, &payload[1..])
}

pub fn is_valid_claimable_balance(s: &str) -> bool {
    decode_claimable_balance(s).is_ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
    const ACCOUNT_HEX: &str = "3f0c34bf93ad0d9971d04ccc90f705511c838aad9734a4a2fb0d7a03fc7fe89a";

    fn account_bytes() -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&hex::decode(ACCOUNT_HEX).unwrap());
        out
    }

    #[test]
    fn crc16_check_value() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31c3);
    }

    #[test]
    fn test_known_account_vector() {
        assert_eq!(encode_account_id(&account_bytes()), ACCOUNT);
        assert_eq!(decode_account_id(ACCOUNT).unwrap(), account_bytes());
    }

    #[test]
    fn test_version_prefixes() {
        for version in Version::ALL {
            let payload = match version {
                Version::MuxedAccount => vec![1u8; 40],
                Version::ClaimableBalance => {
                    let mut p = vec![0u8; 33];
                    p[1] = 9;
                    p
                }
                Version::SignedPayload => {
                    let mut p = vec![3u8; 32];
                    p.extend_from_slice(&[0, 0, 0, 4, 1, 2, 3, 4]);
                    p
                }
                _ => vec![7u8; 32],
            };
            let s = encode(version, &payload);
            assert!(s.starts_with(version.prefix()), "{version}: {s}");
            assert_eq!(decode(&s).unwrap(), (version, payload));
        }
    }

    #[test]
    fn test_every_single_character_mutation_is_rejected() {
        for (i, c) in ACCOUNT.char_indices() {
            for replacement in "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567".chars() {
                if replacement == c {
                    continue;
                }
                let mut mutated = ACCOUNT.to_string();
                mutated.replace_range(i..i + 1, &replacement.to_string());
                assert!(decode_account_id(&mutated).is_err(), "{mutated} decoded");
            }
        }
    }

    #[test]
    fn test_flipped_payload_bit_is_checksum_error() {
        let mut raw = vec![Version::AccountId.byte()];
        raw.extend_from_slice(&account_bytes());
        let checksum = crc16_xmodem(&raw);
        raw.extend_from_slice(&checksum.to_le_bytes());
        raw[10] ^= 0x01;
        let corrupted = base32::encode(&raw);

        assert!(matches!(
            decode(&corrupted),
            Err(StrKeyError::Checksum { .. })
        ));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let seed = encode_secret_seed(&[1u8; 32]);
        assert_eq!(
            decode_account_id(&seed),
            Err(StrKeyError::UnexpectedVersion {
                expected: Version::AccountId,
                found: Version::Seed,
            })
        );
    }

    #[test]
    fn test_unknown_version_byte() {
        let mut raw = vec![5u8 << 3];
        raw.extend_from_slice(&[0u8; 32]);
        let checksum = crc16_xmodem(&raw);
        raw.extend_from_slice(&checksum.to_le_bytes());
        assert_eq!(
            decode(&base32::encode(&raw)),
            Err(StrKeyError::UnknownVersion(5 << 3))
        );
    }

    #[test]
    fn test_wrong_payload_length() {
        let s = encode(Version::AccountId, &[0u8; 31]);
        assert!(matches!(
            decode(&s),
            Err(StrKeyError::InvalidLength { len: 31, .. })
        ));
    }

    #[test]
    fn test_lowercase_and_garbage_rejected() {
        assert_eq!(
            decode(&ACCOUNT.to_lowercase()),
            Err(StrKeyError::InvalidEncoding)
        );
        assert_eq!(decode(""), Err(StrKeyError::InvalidEncoding));
        assert_eq!(decode("GA"), Err(StrKeyError::InvalidEncoding));
        assert!(!is_valid_account_id("not an address"));
    }

    #[test]
    fn test_muxed_roundtrip() {
        let m = encode_muxed_account(&account_bytes(), 1234);
        assert!(m.starts_with('M'));
        assert_eq!(decode_muxed_account(&m).unwrap(), (account_bytes(), 1234));
        assert!(is_valid_muxed_account(&m));
        assert!(!is_valid_account_id(&m));
    }

    #[test]
    fn test_signed_payload_roundtrip() {
        let key = account_bytes();
        for len in [0usize, 1, 3, 4, 29, 64] {
            let payload: Vec<u8> = (0..len as u8).collect();
            let s = encode_signed_payload(&key, &payload).unwrap();
            assert!(s.starts_with('P'));
            assert_eq!(decode_signed_payload(&s).unwrap(), (key, payload));
        }
        assert!(encode_signed_payload(&key, &[0u8; 65]).is_err());
    }

    #[test]
    fn test_signed_payload_nonzero_padding_rejected() {
        let mut raw = account_bytes().to_vec();
        raw.extend_from_slice(&[0, 0, 0, 1, 0xaa, 0, 0, 1]);
        let s = encode(Version::SignedPayload, &raw);
        assert!(matches!(
            decode_signed_payload(&s),
            Err(StrKeyError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_claimable_balance_type_byte() {
        let s = encode_claimable_balance(&[4u8; 32]);
        assert!(s.starts_with('B'));
        assert_eq!(decode_claimable_balance(&s).unwrap(), [4u8; 32]);

        let mut bad = vec![1u8];
        bad.extend_from_slice(&[4u8; 32]);
        assert!(matches!(
            decode(&encode(Version::ClaimableBalance, &bad)),
            Err(StrKeyError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_known_contract_vector() {
        let c = "CA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQGAXE";
        let bytes = decode_contract(c).unwrap();
        assert_eq!(encode_contract(&bytes), c);
    }
}
