//! Claimants and claim predicates for claimable balances.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::xdr::{invalid_discriminant, ReadXdr, VecM, WriteXdr, XdrError, XdrReader, XdrWriter};

use super::AccountId;

const CLAIM_PREDICATE_UNCONDITIONAL: i32 = 0;
const CLAIM_PREDICATE_AND: i32 = 1;
const CLAIM_PREDICATE_OR: i32 = 2;
const CLAIM_PREDICATE_NOT: i32 = 3;
const CLAIM_PREDICATE_BEFORE_ABSOLUTE_TIME: i32 = 4;
const CLAIM_PREDICATE_BEFORE_RELATIVE_TIME: i32 = 5;
const CLAIMANT_TYPE_V0: i32 = 0;

/// When a claimant may claim a balance.
///
/// `And`/`Or` hold exactly two children on the wire; the XDR type is a
/// variable array with maximum 2, so shorter lists still decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPredicate {
    Unconditional,
    And(VecM<ClaimPredicate, 2>),
    Or(VecM<ClaimPredicate, 2>),
    Not(Option<Box<ClaimPredicate>>),
    /// Unix seconds; claimable strictly before this close time.
    BeforeAbsoluteTime(i64),
    /// Seconds after the balance was created.
    BeforeRelativeTime(i64),
}

impl ClaimPredicate {
    pub fn unconditional() -> Self {
        Self::Unconditional
    }

    pub fn and(self, other: ClaimPredicate) -> Self {
        Self::And(VecM::from_array([self, other]))
    }

    pub fn or(self, other: ClaimPredicate) -> Self {
        Self::Or(VecM::from_array([self, other]))
    }

    pub fn not(self) -> Self {
        Self::Not(Some(Box::new(self)))
    }

    pub fn before_absolute_time(unix_seconds: i64) -> Result<Self> {
        if unix_seconds < 0 {
            return Err(Error::constraint("claim predicate", "absolute time must be non-negative"));
        }
        Ok(Self::BeforeAbsoluteTime(unix_seconds))
    }

    pub fn before_relative_time(seconds: i64) -> Result<Self> {
        if seconds < 0 {
            return Err(Error::constraint("claim predicate", "relative time must be non-negative"));
        }
        Ok(Self::BeforeRelativeTime(seconds))
    }
}

impl WriteXdr for ClaimPredicate {
    fn write_xdr(&self, w: &mut XdrWriter) {
        match self {
            Self::Unconditional => w.write_discriminant(CLAIM_PREDICATE_UNCONDITIONAL),
            Self::And(preds) => {
                w.write_discriminant(CLAIM_PREDICATE_AND);
                preds.write_xdr(w);
            }
            Self::Or(preds) => {
                w.write_discriminant(CLAIM_PREDICATE_OR);
                preds.write_xdr(w);
            }
            Self::Not(pred) => {
                w.write_discriminant(CLAIM_PREDICATE_NOT);
                w.write_option(pred);
            }
            Self::BeforeAbsoluteTime(t) => {
                w.write_discriminant(CLAIM_PREDICATE_BEFORE_ABSOLUTE_TIME);
                w.write_i64(*t);
            }
            Self::BeforeRelativeTime(t) => {
                w.write_discriminant(CLAIM_PREDICATE_BEFORE_RELATIVE_TIME);
                w.write_i64(*t);
            }
        }
    }
}

impl ReadXdr for ClaimPredicate {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        let disc = r.read_discriminant()?;
        r.nested(|r| {
            Ok(match disc {
                CLAIM_PREDICATE_UNCONDITIONAL => Self::Unconditional,
                CLAIM_PREDICATE_AND => Self::And(VecM::read_xdr(r)?),
                CLAIM_PREDICATE_OR => Self::Or(VecM::read_xdr(r)?),
                CLAIM_PREDICATE_NOT => Self::Not(r.read_option()?),
                CLAIM_PREDICATE_BEFORE_ABSOLUTE_TIME => Self::BeforeAbsoluteTime(r.read_i64()?),
                CLAIM_PREDICATE_BEFORE_RELATIVE_TIME => Self::BeforeRelativeTime(r.read_i64()?),
                other => return Err(invalid_discriminant("ClaimPredicate", other)),
            })
        })
    }
}

/// A destination and the predicate under which it may claim
/// (`Claimant`, single `v0` arm).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claimant {
    pub destination: AccountId,
    pub predicate: ClaimPredicate,
}

impl Claimant {
    pub fn new(destination: &str, predicate: ClaimPredicate) -> Result<Self> {
        Ok(Self {
            destination: destination.parse()?,
            predicate,
        })
    }
}

impl WriteXdr for Claimant {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_discriminant(CLAIMANT_TYPE_V0);
        self.destination.write_xdr(w);
        self.predicate.write_xdr(w);
    }
}

impl ReadXdr for Claimant {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        match r.read_discriminant()? {
            CLAIMANT_TYPE_V0 => Ok(Self {
                destination: AccountId::read_xdr(r)?,
                predicate: ClaimPredicate::read_xdr(r)?,
            }),
            other => Err(invalid_discriminant("Claimant", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEST: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";

    #[test]
    fn test_unconditional_is_one_word() {
        assert_eq!(ClaimPredicate::Unconditional.to_xdr(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_combinators_roundtrip() {
        let pred = ClaimPredicate::before_relative_time(3600)
            .unwrap()
            .and(ClaimPredicate::before_absolute_time(1_700_000_000).unwrap().not());
        let bytes = pred.to_xdr();
        assert_eq!(&bytes[..8], &[0, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(ClaimPredicate::from_xdr(&bytes), Ok(pred));
    }

    #[test]
    fn test_negative_times_rejected() {
        assert!(ClaimPredicate::before_absolute_time(-1).is_err());
        assert!(ClaimPredicate::before_relative_time(-1).is_err());
    }

    #[test]
    fn test_and_with_three_children_rejected() {
        let mut bytes = vec![0, 0, 0, 1, 0, 0, 0, 3];
        for _ in 0..3 {
            bytes.extend_from_slice(&[0, 0, 0, 0]);
        }
        assert!(ClaimPredicate::from_xdr(&bytes).is_err());
    }

    #[test]
    fn test_deep_nesting_hits_depth_limit() {
        let mut bytes = Vec::new();
        for _ in 0..1000 {
            bytes.extend_from_slice(&[0, 0, 0, 3, 0, 0, 0, 1]);
        }
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(
            ClaimPredicate::from_xdr(&bytes),
            Err(XdrError::DepthLimitExceeded)
        ));
    }

    #[test]
    fn test_claimant_roundtrip() {
        let claimant = Claimant::new(DEST, ClaimPredicate::Unconditional).unwrap();
        let bytes = claimant.to_xdr();
        assert_eq!(bytes.len(), 4 + 36 + 4);
        assert_eq!(Claimant::from_xdr(&bytes), Ok(claimant));
        assert!(Claimant::new("GBAD", ClaimPredicate::Unconditional).is_err());
    }
}
