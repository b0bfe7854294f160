//! Transaction preconditions.
//!
//! The wire union has three arms: none, time bounds only, and the extended
//! V2 form. A value built here always takes the smallest arm that can carry
//! its fields ([`Preconditions::from_v2`]); decoding keeps whichever arm the
//! bytes used, so re-encoding a decoded value reproduces the input.

use serde::{Deserialize, Serialize};

use crate::config::MAX_EXTRA_SIGNERS;
use crate::error::{Error, Result};
use crate::types::SignerKey;
use crate::xdr::{invalid_discriminant, ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

const PRECOND_NONE: i32 = 0;
const PRECOND_TIME: i32 = 1;
const PRECOND_V2: i32 = 2;

/// Validity window in UNIX seconds. A `max_time` of 0 means no upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    pub fn new(min_time: u64, max_time: u64) -> Result<Self> {
        if max_time != 0 && min_time > max_time {
            return Err(Error::constraint("time bounds", "min time is after max time"));
        }
        Ok(Self { min_time, max_time })
    }
}

impl WriteXdr for TimeBounds {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_u64(self.min_time);
        w.write_u64(self.max_time);
    }
}

impl ReadXdr for TimeBounds {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            min_time: r.read_u64()?,
            max_time: r.read_u64()?,
        })
    }
}

/// Ledger-sequence window. A `max_ledger` of 0 means no upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerBounds {
    pub min_ledger: u32,
    pub max_ledger: u32,
}

impl LedgerBounds {
    pub fn new(min_ledger: u32, max_ledger: u32) -> Result<Self> {
        if max_ledger != 0 && min_ledger > max_ledger {
            return Err(Error::constraint("ledger bounds", "min ledger is after max ledger"));
        }
        Ok(Self { min_ledger, max_ledger })
    }
}

impl WriteXdr for LedgerBounds {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_u32(self.min_ledger);
        w.write_u32(self.max_ledger);
    }
}

impl ReadXdr for LedgerBounds {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            min_ledger: r.read_u32()?,
            max_ledger: r.read_u32()?,
        })
    }
}

/// The extended precondition set (CAP-21).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreconditionsV2 {
    pub time_bounds: Option<TimeBounds>,
    pub ledger_bounds: Option<LedgerBounds>,
    /// When set, the source's sequence number may be anywhere in
    /// `[min_seq_num, tx.seq_num)` instead of exactly `tx.seq_num - 1`.
    pub min_seq_num: Option<i64>,
    /// Seconds.
    pub min_seq_age: u64,
    pub min_seq_ledger_gap: u32,
    pub extra_signers: VecM<SignerKey, MAX_EXTRA_SIGNERS>,
}

impl PreconditionsV2 {
    /// Whether any field beyond time bounds is in use.
    fn needs_v2(&self) -> bool {
        self.ledger_bounds.is_some()
            || self.min_seq_num.is_some()
            || self.min_seq_age != 0
            || self.min_seq_ledger_gap != 0
            || !self.extra_signers.is_empty()
    }
}

impl WriteXdr for PreconditionsV2 {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_option(&self.time_bounds);
        w.write_option(&self.ledger_bounds);
        w.write_option(&self.min_seq_num);
        w.write_u64(self.min_seq_age);
        w.write_u32(self.min_seq_ledger_gap);
        self.extra_signers.write_xdr(w);
    }
}

impl ReadXdr for PreconditionsV2 {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            time_bounds: r.read_option()?,
            ledger_bounds: r.read_option()?,
            min_seq_num: r.read_option()?,
            min_seq_age: r.read_u64()?,
            min_seq_ledger_gap: r.read_u32()?,
            extra_signers: VecM::read_xdr(r)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preconditions {
    #[default]
    None,
    Time(TimeBounds),
    V2(PreconditionsV2),
}

impl Preconditions {
    /// The smallest arm that represents `v2`.
    pub fn from_v2(v2: PreconditionsV2) -> Self {
        if v2.needs_v2() {
            Self::V2(v2)
        } else if let Some(bounds) = v2.time_bounds {
            Self::Time(bounds)
        } else {
            Self::None
        }
    }

    pub fn time_bounds(&self) -> Option<&TimeBounds> {
        match self {
            Self::None => None,
            Self::Time(bounds) => Some(bounds),
            Self::V2(v2) => v2.time_bounds.as_ref(),
        }
    }

    /// Every field, whichever arm carries them.
    pub fn to_v2(&self) -> PreconditionsV2 {
        match self {
            Self::None => PreconditionsV2::default(),
            Self::Time(bounds) => PreconditionsV2 {
                time_bounds: Some(*bounds),
                ..PreconditionsV2::default()
            },
            Self::V2(v2) => v2.clone(),
        }
    }

    /// Whether this value uses the smallest arm for its fields. Decoded
    /// values need not be minimal.
    pub fn is_minimal(&self) -> bool {
        *self == Self::from_v2(self.to_v2())
    }
}

impl WriteXdr for Preconditions {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::None => w.write_discriminant(PRECOND_NONE),
            Self::Time(bounds) => {
                w.write_discriminant(PRECOND_TIME);
                bounds.write_xdr(w);
            }
            Self::V2(v2) => {
                w.write_discriminant(PRECOND_V2);
                v2.write_xdr(w);
            }
        }
    }
}

impl ReadXdr for Preconditions {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            PRECOND_NONE => Ok(Self::None),
            PRECOND_TIME => Ok(Self::Time(TimeBounds::read_xdr(r)?)),
            PRECOND_V2 => Ok(Self::V2(PreconditionsV2::read_xdr(r)?)),
            other => Err(invalid_discriminant("Preconditions", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> TimeBounds {
        TimeBounds::new(10, 20).unwrap()
    }

    #[test]
    fn time_only_stays_simple() {
        let cond = Preconditions::from_v2(PreconditionsV2 {
            time_bounds: Some(bounds()),
            ..Default::default()
        });
        assert_eq!(cond, Preconditions::Time(bounds()));
        let bytes = cond.to_xdr();
        assert_eq!(&bytes[..4], &[0, 0, 0, 1]);
        assert_eq!(bytes.len(), 4 + 16);
        assert_eq!(Preconditions::from_xdr(&bytes).unwrap(), cond);
    }

    #[test]
    fn empty_is_none() {
        let cond = Preconditions::from_v2(PreconditionsV2::default());
        assert_eq!(cond, Preconditions::None);
        assert_eq!(cond.to_xdr(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn extended_fields_force_v2() {
        let v2 = PreconditionsV2 {
            time_bounds: Some(bounds()),
            min_seq_ledger_gap: 3,
            ..Default::default()
        };
        let cond = Preconditions::from_v2(v2.clone());
        assert_eq!(cond, Preconditions::V2(v2));
        let bytes = cond.to_xdr();
        assert_eq!(&bytes[..4], &[0, 0, 0, 2]);
        assert_eq!(Preconditions::from_xdr(&bytes).unwrap(), cond);
    }

    #[test]
    fn decoded_non_minimal_form_is_preserved() {
        // a V2 arm carrying nothing but time bounds
        let wide = Preconditions::V2(PreconditionsV2 {
            time_bounds: Some(bounds()),
            ..Default::default()
        });
        let bytes = wide.to_xdr();
        let decoded = Preconditions::from_xdr(&bytes).unwrap();
        assert_eq!(decoded, wide);
        assert!(!decoded.is_minimal());
        assert_eq!(decoded.to_xdr(), bytes);
    }

    #[test]
    fn extra_signers_roundtrip() {
        let v2 = PreconditionsV2 {
            extra_signers: VecM::try_from(vec![
                SignerKey::HashX([1; 32]),
                SignerKey::PreAuthTx([2; 32]),
            ])
            .unwrap(),
            ..Default::default()
        };
        let cond = Preconditions::from_v2(v2);
        assert_eq!(Preconditions::from_xdr(&cond.to_xdr()).unwrap(), cond);
    }

    #[test]
    fn bounds_ordering() {
        assert!(TimeBounds::new(20, 10).is_err());
        assert!(TimeBounds::new(20, 0).is_ok());
        assert!(LedgerBounds::new(5, 4).is_err());
        assert!(LedgerBounds::new(5, 0).is_ok());
    }

    #[test]
    fn unknown_arm() {
        assert!(Preconditions::from_xdr(&[0, 0, 0, 3]).is_err());
    }
}
