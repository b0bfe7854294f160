//! # Canonical Binary Codec (XDR)
//!
//! Everything the network signs, hashes, or relays is XDR: big-endian
//! fixed-width integers, length-prefixed opaque data padded to a 4-byte
//! boundary, and discriminated unions tagged with a 32-bit discriminant.
//! Two clients that disagree on a single byte here produce different
//! transaction hashes, and every signature between them stops verifying.
//!
//! ## Layout
//!
//! ```text
//! mod.rs        — XdrWriter / XdrReader cursors, WriteXdr / ReadXdr traits
//! primitives.rs — impls for integers, bool, fixed opaque, Option, Box
//! bounded.rs    — BytesM / StringM / VecM, the length-bounded containers
//! error.rs      — XdrError, the structural decode error
//! ```
//!
//! ## Rules the codec enforces
//!
//! - Encoding is infallible and deterministic. Anything that could make an
//!   encoding invalid (an over-long array, an over-long string) is rejected
//!   when the value is constructed, not when it is written.
//! - Decoding never panics. Truncated input, unknown discriminants, counts
//!   that point past the end of the buffer, non-zero padding and trailing
//!   garbage are all [`XdrError`]s.
//! - Recursive types (contract values, claim predicates, authorization
//!   trees) go through [`XdrReader::nested`], which caps nesting depth.

mod bounded;
mod error;
mod primitives;

pub use bounded::{BytesM, StringM, VecM};
pub use error::XdrError;

use base64::prelude::{Engine as _, BASE64_STANDARD};

use crate::config::XDR_DEPTH_LIMIT;

/// Number of zero bytes needed after `len` bytes to reach a 4-byte boundary.
pub(crate) const fn padding_len(len: usize) -> usize {
    (4 - len % 4) % 4
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A type with a canonical XDR encoding.
pub trait WriteXdr {
    /// Appends the encoding of `self` to the writer.
    fn write_xdr(&self, w: &mut XdrWriter);

    /// Encodes `self` into a fresh byte vector.
    fn to_xdr(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();
        self.write_xdr(&mut w);
        w.into_bytes()
    }

    /// Encodes `self` and wraps the bytes in standard padded base64.
    fn to_xdr_base64(&self) -> String {
        BASE64_STANDARD.encode(self.to_xdr())
    }
}

/// A type that can be decoded from its canonical XDR encoding.
pub trait ReadXdr: Sized {
    /// Reads one value from the cursor, advancing it.
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError>;

    /// Decodes exactly one value from `bytes`. Trailing bytes are an error.
    fn from_xdr(bytes: &[u8]) -> Result<Self, XdrError> {
        let mut r = XdrReader::new(bytes);
        let value = Self::read_xdr(&mut r)?;
        r.finish()?;
        Ok(value)
    }

    /// Decodes a value from standard padded base64.
    fn from_xdr_base64(encoded: &str) -> Result<Self, XdrError> {
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|e| XdrError::InvalidBase64(e.to_string()))?;
        Self::from_xdr(&bytes)
    }
}

// ---------------------------------------------------------------------------
// XdrWriter
// ---------------------------------------------------------------------------

/// Append-only output buffer for XDR encoding.
#[derive(Debug, Default, Clone)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates an empty writer with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Booleans are a 32-bit 0 or 1.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u32(u32::from(value));
    }

    /// Writes a union discriminant.
    pub fn write_discriminant(&mut self, value: i32) {
        self.write_i32(value);
    }

    /// Writes fixed-length opaque data: the bytes, then zero padding.
    /// No length prefix; the length is part of the type.
    pub fn write_fixed_opaque(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.write_padding(bytes.len());
    }

    /// Writes variable-length opaque data: 32-bit length, bytes, padding.
    ///
    /// Callers guarantee `bytes.len() <= u32::MAX`; [`BytesM`] and
    /// [`StringM`] enforce this at construction.
    pub fn write_var_opaque(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.write_fixed_opaque(bytes);
    }

    /// Writes an optional value: a boolean presence flag, then the payload.
    pub fn write_option<T: WriteXdr>(&mut self, value: &Option<T>) {
        match value {
            Some(inner) => {
                self.write_bool(true);
                inner.write_xdr(self);
            }
            None => self.write_bool(false),
        }
    }

    /// Writes a variable-length array: 32-bit count, then each element.
    pub fn write_slice<T: WriteXdr>(&mut self, items: &[T]) {
        self.write_u32(items.len() as u32);
        for item in items {
            item.write_xdr(self);
        }
    }

    fn write_padding(&mut self, len: usize) {
        let pad = padding_len(len);
        self.buf.extend_from_slice(&[0u8; 3][..pad]);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// XdrReader
// ---------------------------------------------------------------------------

/// Forward-only cursor over an immutable byte slice.
#[derive(Debug, Clone)]
pub struct XdrReader<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: u32,
    depth_limit: u32,
}

impl<'a> XdrReader<'a> {
    /// Creates a reader with the default nesting limit.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_depth_limit(buf, XDR_DEPTH_LIMIT)
    }

    /// Creates a reader with an explicit nesting limit for recursive types.
    pub fn with_depth_limit(buf: &'a [u8], depth_limit: u32) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
            depth_limit,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Current offset from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], XdrError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(XdrError::UnexpectedEof {
                needed: n,
                remaining,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], XdrError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u32(&mut self) -> Result<u32, XdrError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, XdrError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, XdrError> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, XdrError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, XdrError> {
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(XdrError::InvalidBool(other)),
        }
    }

    /// Reads a union discriminant.
    pub fn read_discriminant(&mut self) -> Result<i32, XdrError> {
        self.read_i32()
    }

    /// Reads `N` bytes of fixed opaque data plus their padding.
    pub fn read_fixed_opaque<const N: usize>(&mut self) -> Result<[u8; N], XdrError> {
        let out = self.take_array::<N>()?;
        self.read_padding(N)?;
        Ok(out)
    }

    /// Reads length-prefixed opaque data no longer than `max`.
    pub fn read_var_opaque(&mut self, max: u32) -> Result<Vec<u8>, XdrError> {
        let len = self.read_u32()?;
        if len > max {
            return Err(XdrError::LengthExceedsMax {
                len: len as usize,
                max,
            });
        }
        let len = len as usize;
        let padded = len + padding_len(len);
        if padded > self.remaining() {
            return Err(XdrError::LengthExceedsRemaining {
                len: padded,
                remaining: self.remaining(),
            });
        }
        let bytes = self.take(len)?.to_vec();
        self.read_padding(len)?;
        Ok(bytes)
    }

    /// Reads an array count no larger than `max`.
    ///
    /// Every encoded element occupies at least four bytes, so a count that
    /// cannot fit in the remaining input is rejected before any allocation.
    pub fn read_count(&mut self, max: u32) -> Result<usize, XdrError> {
        let count = self.read_u32()?;
        if count > max {
            return Err(XdrError::LengthExceedsMax {
                len: count as usize,
                max,
            });
        }
        let count = count as usize;
        if count.saturating_mul(4) > self.remaining() {
            return Err(XdrError::LengthExceedsRemaining {
                len: count,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Reads an optional value.
    pub fn read_option<T: ReadXdr>(&mut self) -> Result<Option<T>, XdrError> {
        if self.read_bool()? {
            Ok(Some(T::read_xdr(self)?))
        } else {
            Ok(None)
        }
    }

    /// Reads a variable-length array of at most `max` elements.
    pub fn read_vec<T: ReadXdr>(&mut self, max: u32) -> Result<Vec<T>, XdrError> {
        let count = self.read_count(max)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::read_xdr(self)?);
        }
        Ok(items)
    }

    /// Runs `f` one nesting level deeper, failing once the limit is hit.
    pub fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, XdrError>,
    ) -> Result<T, XdrError> {
        if self.depth >= self.depth_limit {
            return Err(XdrError::DepthLimitExceeded);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn read_padding(&mut self, len: usize) -> Result<(), XdrError> {
        let pad = self.take(padding_len(len))?;
        if pad.iter().any(|b| *b != 0) {
            return Err(XdrError::NonZeroPadding);
        }
        Ok(())
    }

    /// Asserts the input has been fully consumed.
    pub fn finish(self) -> Result<(), XdrError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(XdrError::TrailingBytes(n)),
        }
    }
}

// ---------------------------------------------------------------------------
// C-style enums
// ---------------------------------------------------------------------------

/// Declares a C-style XDR enum together with its codec.
///
/// The enum is encoded as its 32-bit discriminant; decoding any value outside
/// the declared set is [`XdrError::InvalidDiscriminant`].
macro_rules! xdr_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[repr(i32)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Every declared variant, in declaration order.
            pub const VARIANTS: &'static [$name] = &[$($name::$variant),+];

            /// The wire discriminant.
            pub const fn discriminant(self) -> i32 {
                self as i32
            }
        }

        impl ::core::convert::TryFrom<i32> for $name {
            type Error = $crate::xdr::XdrError;

            fn try_from(value: i32) -> ::core::result::Result<Self, Self::Error> {
                $(
                    if value == $value {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::xdr::XdrError::InvalidDiscriminant {
                    type_name: stringify!($name),
                    value,
                })
            }
        }

        impl $crate::xdr::WriteXdr for $name {
            fn write_xdr(&self, w: &mut $crate::xdr::XdrWriter) {
                w.write_i32(*self as i32);
            }
        }

        impl $crate::xdr::ReadXdr for $name {
            fn read_xdr(
                r: &mut $crate::xdr::XdrReader<'_>,
            ) -> ::core::result::Result<Self, $crate::xdr::XdrError> {
                let value = r.read_i32()?;
                <$name as ::core::convert::TryFrom<i32>>::try_from(value)
            }
        }
    };
}

pub(crate) use xdr_enum;

/// Shorthand for the structural error on an unknown union arm.
pub(crate) fn invalid_discriminant(type_name: &'static str, value: i32) -> XdrError {
    XdrError::InvalidDiscriminant { type_name, value }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut w = XdrWriter::new();
        w.write_u32(1);
        w.write_i32(-2);
        w.write_u64(0x0102_0304_0506_0708);
        w.write_i64(-1);
        assert_eq!(
            w.into_bytes(),
            vec![
                0, 0, 0, 1, 0xff, 0xff, 0xff, 0xfe, 1, 2, 3, 4, 5, 6, 7, 8, 0xff, 0xff, 0xff,
                0xff, 0xff, 0xff, 0xff, 0xff,
            ]
        );
    }

    #[test]
    fn var_opaque_is_length_prefixed_and_padded() {
        let mut w = XdrWriter::new();
        w.write_var_opaque(b"abcde");
        assert_eq!(
            w.as_bytes(),
            &[0, 0, 0, 5, b'a', b'b', b'c', b'd', b'e', 0, 0, 0]
        );

        let mut r = XdrReader::new(w.as_bytes());
        assert_eq!(r.read_var_opaque(16).unwrap(), b"abcde".to_vec());
        r.finish().unwrap();
    }

    #[test]
    fn aligned_opaque_has_no_padding() {
        let mut w = XdrWriter::new();
        w.write_var_opaque(b"abcd");
        assert_eq!(w.len(), 8);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut r = XdrReader::new(&[0, 0, 1]);
        assert_eq!(
            r.read_u32(),
            Err(XdrError::UnexpectedEof {
                needed: 4,
                remaining: 3
            })
        );
    }

    #[test]
    fn non_zero_padding_rejected() {
        let bytes = [0, 0, 0, 1, b'x', 0, 1, 0];
        let mut r = XdrReader::new(&bytes);
        assert_eq!(r.read_var_opaque(8), Err(XdrError::NonZeroPadding));
    }

    #[test]
    fn opaque_longer_than_max_rejected() {
        let bytes = [0, 0, 0, 9, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 0, 0];
        let mut r = XdrReader::new(&bytes);
        assert!(matches!(
            r.read_var_opaque(8),
            Err(XdrError::LengthExceedsMax { len: 9, max: 8 })
        ));
    }

    #[test]
    fn opaque_length_past_end_rejected() {
        let bytes = [0, 0, 0, 200, 1, 2, 3, 4];
        let mut r = XdrReader::new(&bytes);
        assert!(matches!(
            r.read_var_opaque(u32::MAX),
            Err(XdrError::LengthExceedsRemaining { .. })
        ));
    }

    #[test]
    fn huge_array_count_rejected_before_allocation() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0];
        let mut r = XdrReader::new(&bytes);
        assert!(matches!(
            r.read_vec::<u32>(u32::MAX),
            Err(XdrError::LengthExceedsRemaining { .. })
        ));
    }

    #[test]
    fn invalid_bool_rejected() {
        let mut r = XdrReader::new(&[0, 0, 0, 2]);
        assert_eq!(r.read_bool(), Err(XdrError::InvalidBool(2)));
    }

    #[test]
    fn trailing_bytes_rejected() {
        assert_eq!(
            u32::from_xdr(&[0, 0, 0, 1, 0]),
            Err(XdrError::TrailingBytes(1))
        );
    }

    #[test]
    fn nesting_limit_enforced() {
        let mut r = XdrReader::with_depth_limit(&[], 2);
        let result = r.nested(|r| r.nested(|r| r.nested(|_| Ok(()))));
        assert_eq!(result, Err(XdrError::DepthLimitExceeded));

        let mut r = XdrReader::with_depth_limit(&[], 2);
        assert!(r.nested(|r| r.nested(|_| Ok(()))).is_ok());
    }

    #[test]
    fn option_encoding() {
        let some: Option<u32> = Some(7);
        assert_eq!(some.to_xdr(), vec![0, 0, 0, 1, 0, 0, 0, 7]);
        let none: Option<u32> = None;
        assert_eq!(none.to_xdr(), vec![0, 0, 0, 0]);
        assert_eq!(Option::<u32>::from_xdr(&[0, 0, 0, 1, 0, 0, 0, 7]), Ok(some));
    }

    #[test]
    fn base64_wrapping() {
        let encoded = 5u32.to_xdr_base64();
        assert_eq!(encoded, "AAAABQ==");
        assert_eq!(u32::from_xdr_base64(&encoded), Ok(5));
        assert!(matches!(
            u32::from_xdr_base64("not base64!"),
            Err(XdrError::InvalidBase64(_))
        ));
    }

    xdr_enum! {
        /// Test-only enum.
        pub enum Colour {
            Red = 0,
            Blue = 2,
            Wide = 0x100,
        }
    }

    #[test]
    fn xdr_enum_roundtrip_and_rejection() {
        assert_eq!(Colour::Wide.to_xdr(), vec![0, 0, 1, 0]);
        assert_eq!(Colour::from_xdr(&[0, 0, 0, 2]), Ok(Colour::Blue));
        assert_eq!(
            Colour::from_xdr(&[0, 0, 0, 1]),
            Err(XdrError::InvalidDiscriminant {
                type_name: "Colour",
                value: 1
            })
        );
        assert_eq!(Colour::VARIANTS.len(), 3);
    }
}
