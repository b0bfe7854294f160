//! Codec impls for the built-in XDR primitives.
//!
//! `Vec<T>` deliberately has no impl: a bare vector does not know whether it
//! is opaque data, a string, or an array, nor what its bound is. Use the
//! containers in `bounded.rs` instead.

use super::{ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

macro_rules! int_codec {
    ($ty:ty, $write:ident, $read:ident) => {
        impl WriteXdr for $ty {
            fn write_xdr(&self, w: &mut XdrWriter) {
                w.$write(*self);
            }
        }

        impl ReadXdr for $ty {
            fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
                r.$read()
            }
        }
    };
}

int_codec!(u32, write_u32, read_u32);
int_codec!(i32, write_i32, read_i32);
int_codec!(u64, write_u64, read_u64);
int_codec!(i64, write_i64, read_i64);
int_codec!(bool, write_bool, read_bool);

/// Fixed-length opaque data (`opaque foo[N]`).
impl<const N: usize> WriteXdr for [u8; N] {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_fixed_opaque(self);
    }
}

impl<const N: usize> ReadXdr for [u8; N] {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        r.read_fixed_opaque::<N>()
    }
}

/// Optional data (`T*`).
impl<T: WriteXdr> WriteXdr for Option<T> {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_option(self);
    }
}

impl<T: ReadXdr> ReadXdr for Option<T> {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        r.read_option()
    }
}

impl<T: WriteXdr> WriteXdr for Box<T> {
    fn write_xdr(&self, w: &mut XdrWriter) {
        self.as_ref().write_xdr(w);
    }
}

impl<T: ReadXdr> ReadXdr for Box<T> {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Box::new(T::read_xdr(r)?))
    }
}
