//! Crate-level error type.
//!
//! Each layer has its own error enum; this one wraps them so callers can use
//! a single `Result` and still tell "your input was invalid" apart from "these
//! bytes are not a transaction" via [`Error::kind`].

use thiserror::Error;

use crate::crypto::keys::KeyError;
use crate::crypto::signatures::SignatureError;
use crate::strkey::StrKeyError;
use crate::xdr::XdrError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of every failure the crate can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed, truncated or over-long binary input.
    Structural,
    /// A StrKey whose checksum does not match. Usually a typo.
    Checksum,
    /// A value that violates a protocol rule at construction time.
    ValueConstraint,
    /// Fee or amount arithmetic that would not fit its integer type.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("xdr: {0}")]
    Xdr(#[from] XdrError),

    #[error("strkey: {0}")]
    StrKey(#[from] StrKeyError),

    #[error("key: {0}")]
    Key(#[from] KeyError),

    #[error("signature: {0}")]
    Signature(#[from] SignatureError),

    /// A field value the protocol does not allow.
    #[error("invalid {field}: {reason}")]
    Constraint {
        field: &'static str,
        reason: String,
    },

    /// Arithmetic on the named quantity overflowed.
    #[error("{0} overflows")]
    Overflow(&'static str),
}

impl Error {
    pub(crate) fn constraint(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Constraint {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Xdr(_) => ErrorKind::Structural,
            Error::StrKey(StrKeyError::Checksum { .. }) => ErrorKind::Checksum,
            Error::StrKey(_) => ErrorKind::Structural,
            Error::Key(_) | Error::Signature(_) => ErrorKind::ValueConstraint,
            Error::Constraint { .. } => ErrorKind::ValueConstraint,
            Error::Overflow(_) => ErrorKind::Overflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_classified() {
        assert_eq!(
            Error::from(XdrError::NonZeroPadding).kind(),
            ErrorKind::Structural
        );
        assert_eq!(
            Error::from(StrKeyError::Checksum {
                expected: 1,
                actual: 2
            })
            .kind(),
            ErrorKind::Checksum
        );
        assert_eq!(
            Error::constraint("amount", "negative").kind(),
            ErrorKind::ValueConstraint
        );
        assert_eq!(Error::Overflow("fee").kind(), ErrorKind::Overflow);
    }

    #[test]
    fn messages_name_the_field() {
        let err = Error::constraint("path", "at most 5 assets");
        assert_eq!(err.to_string(), "invalid path: at most 5 assets");
    }
}
