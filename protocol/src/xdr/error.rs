//! Structural errors raised by the XDR codec.
//!
//! Every variant here means "these bytes are not a valid encoding", never
//! "your value is semantically wrong". The codec does not attempt recovery:
//! guessing at malformed wire data is how clients end up signing something
//! other than what the user asked for.

use thiserror::Error;

/// Errors produced while reading or writing the canonical binary encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XdrError {
    /// Fewer bytes remain than the next field requires.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the field needed.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A union or enum discriminant outside the enumerated set.
    #[error("invalid discriminant {value} for {type_name}")]
    InvalidDiscriminant {
        /// The XDR type being decoded.
        type_name: &'static str,
        /// The discriminant that was read.
        value: i32,
    },

    /// A boolean encoded as something other than 0 or 1.
    #[error("invalid boolean value {0}")]
    InvalidBool(u32),

    /// A variable-length field is longer than its declared maximum.
    #[error("length {len} exceeds maximum {max}")]
    LengthExceedsMax {
        /// Actual length.
        len: usize,
        /// Declared maximum.
        max: u32,
    },

    /// A count prefix implies more data than the buffer holds.
    #[error("length {len} exceeds remaining input ({remaining} bytes)")]
    LengthExceedsRemaining {
        /// Length implied by the count prefix.
        len: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// Alignment padding contained non-zero bytes.
    #[error("non-zero padding bytes")]
    NonZeroPadding,

    /// Input continued past the end of the decoded value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// Recursive structures nested deeper than the configured limit.
    #[error("nesting depth limit exceeded")]
    DepthLimitExceeded,

    /// The base64 wrapper around the XDR could not be decoded.
    #[error("invalid base64: {0}")]
    InvalidBase64(String),
}
