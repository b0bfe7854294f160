//! Transaction memos.

use serde::{Deserialize, Serialize};

use crate::config::MAX_MEMO_TEXT_LENGTH;
use crate::crypto::Hash;
use crate::error::{Error, Result};
use crate::xdr::{invalid_discriminant, ReadXdr, StringM, WriteXdr, XdrError, XdrReader, XdrWriter};

const MEMO_NONE: i32 = 0;
const MEMO_TEXT: i32 = 1;
const MEMO_ID: i32 = 2;
const MEMO_HASH: i32 = 3;
const MEMO_RETURN: i32 = 4;

/// An optional note attached to a transaction.
///
/// Exchanges use these to route deposits, so a memo is often the difference
/// between a payment landing in the right sub-account and a support ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Memo {
    #[default]
    None,
    /// Up to 28 bytes. Not necessarily UTF-8 on the wire.
    Text(StringM<MAX_MEMO_TEXT_LENGTH>),
    Id(u64),
    Hash(Hash),
    /// Hash of the transaction this one refunds.
    Return(Hash),
}

impl Memo {
    /// A text memo; fails above 28 bytes.
    pub fn text(text: &str) -> Result<Self> {
        let text = StringM::try_from(text)
            .map_err(|_| Error::constraint("memo", "text must be at most 28 bytes"))?;
        Ok(Self::Text(text))
    }

    pub fn id(id: u64) -> Self {
        Self::Id(id)
    }

    pub fn hash(hash: [u8; 32]) -> Self {
        Self::Hash(Hash(hash))
    }

    pub fn return_hash(hash: [u8; 32]) -> Self {
        Self::Return(Hash(hash))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl WriteXdr for Memo {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::None => w.write_discriminant(MEMO_NONE),
            Self::Text(text) => {
                w.write_discriminant(MEMO_TEXT);
                text.write_xdr(w);
            }
            Self::Id(id) => {
                w.write_discriminant(MEMO_ID);
                w.write_u64(*id);
            }
            Self::Hash(hash) => {
                w.write_discriminant(MEMO_HASH);
                hash.write_xdr(w);
            }
            Self::Return(hash) => {
                w.write_discriminant(MEMO_RETURN);
                hash.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for Memo {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(match r.read_discriminant()? {
            MEMO_NONE => Self::None,
            MEMO_TEXT => Self::Text(StringM::read_xdr(r)?),
            MEMO_ID => Self::Id(r.read_u64()?),
            MEMO_HASH => Self::Hash(Hash::read_xdr(r)?),
            MEMO_RETURN => Self::Return(Hash::read_xdr(r)?),
            other => return Err(invalid_discriminant("Memo", other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_limit_is_bytes_not_chars() {
        assert!(Memo::text(&"a".repeat(28)).is_ok());
        assert!(Memo::text(&"a".repeat(29)).is_err());
        // 10 three-byte characters = 30 bytes
        assert!(Memo::text(&"€".repeat(10)).is_err());
    }

    #[test]
    fn test_none_is_one_word() {
        assert_eq!(Memo::None.to_xdr(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_text_encoding() {
        let memo = Memo::text("hi").unwrap();
        assert_eq!(memo.to_xdr(), vec![0, 0, 0, 1, 0, 0, 0, 2, b'h', b'i', 0, 0]);
        assert_eq!(Memo::from_xdr(&memo.to_xdr()), Ok(memo));
    }

    #[test]
    fn test_non_utf8_text_survives_roundtrip() {
        let bytes = vec![0, 0, 0, 1, 0, 0, 0, 2, 0xff, 0xfe, 0, 0];
        let memo = Memo::from_xdr(&bytes).unwrap();
        assert_eq!(memo.to_xdr(), bytes);
    }

    #[test]
    fn test_id_and_hashes() {
        for memo in [Memo::id(u64::MAX), Memo::hash([3; 32]), Memo::return_hash([4; 32])] {
            assert_eq!(Memo::from_xdr(&memo.to_xdr()), Ok(memo));
        }
        assert!(Memo::from_xdr(&[0, 0, 0, 5]).is_err());
    }
}
