//! Length-bounded containers for variable-size XDR data.
//!
//! XDR declares a maximum for every variable-length field (`opaque<64>`,
//! `string<28>`, `Asset path<5>`). These wrappers carry the bound in the type
//! so an out-of-range value can never be constructed, and therefore never
//! encoded.

use std::fmt;
use std::ops::Deref;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::{ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

fn check_len(len: usize, max: u32) -> Result<(), XdrError> {
    if len > max as usize {
        Err(XdrError::LengthExceedsMax { len, max })
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BytesM
// ---------------------------------------------------------------------------

/// Variable-length opaque data of at most `MAX` bytes (`opaque<MAX>`).
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BytesM<const MAX: u32 = { u32::MAX }>(Vec<u8>);

/// Compile-time proof that an `N`-byte array fits under `MAX`.
struct Fits<const N: usize, const MAX: u32>;

impl<const N: usize, const MAX: u32> Fits<N, MAX> {
    const OK: () = assert!(N as u64 <= MAX as u64, "array longer than the XDR bound");
}

impl<const MAX: u32> BytesM<MAX> {
    /// The declared maximum length.
    pub const MAX_LEN: u32 = MAX;

    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Infallible construction from a fixed array known to fit.
    pub fn from_array<const N: usize>(bytes: [u8; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Fits::<N, MAX>::OK;
        Self(bytes.to_vec())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl<const MAX: u32> Deref for BytesM<MAX> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl<const MAX: u32> AsRef<[u8]> for BytesM<MAX> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const MAX: u32> TryFrom<Vec<u8>> for BytesM<MAX> {
    type Error = XdrError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, XdrError> {
        check_len(bytes.len(), MAX)?;
        Ok(Self(bytes))
    }
}

impl<const MAX: u32> TryFrom<&[u8]> for BytesM<MAX> {
    type Error = XdrError;

    fn try_from(bytes: &[u8]) -> Result<Self, XdrError> {
        Self::try_from(bytes.to_vec())
    }
}

impl<const MAX: u32> fmt::Debug for BytesM<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BytesM({})", self.to_hex())
    }
}

impl<const MAX: u32> WriteXdr for BytesM<MAX> {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_var_opaque(&self.0);
    }
}

impl<const MAX: u32> ReadXdr for BytesM<MAX> {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self(r.read_var_opaque(MAX)?))
    }
}

impl<const MAX: u32> Serialize for BytesM<MAX> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de, const MAX: u32> Deserialize<'de> for BytesM<MAX> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(de::Error::custom)?;
        Self::try_from(bytes).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// StringM
// ---------------------------------------------------------------------------

/// An XDR string of at most `MAX` bytes (`string<MAX>`).
///
/// XDR strings are byte strings. Nothing on the wire promises UTF-8, so the
/// raw bytes are kept and text views are lossy or fallible.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringM<const MAX: u32 = { u32::MAX }>(Vec<u8>);

impl<const MAX: u32> StringM<MAX> {
    /// The declared maximum length in bytes.
    pub const MAX_LEN: u32 = MAX;

    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The string as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// The string with invalid UTF-8 sequences replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl<const MAX: u32> TryFrom<Vec<u8>> for StringM<MAX> {
    type Error = XdrError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, XdrError> {
        check_len(bytes.len(), MAX)?;
        Ok(Self(bytes))
    }
}

impl<const MAX: u32> TryFrom<&str> for StringM<MAX> {
    type Error = XdrError;

    fn try_from(s: &str) -> Result<Self, XdrError> {
        Self::try_from(s.as_bytes().to_vec())
    }
}

impl<const MAX: u32> TryFrom<String> for StringM<MAX> {
    type Error = XdrError;

    fn try_from(s: String) -> Result<Self, XdrError> {
        Self::try_from(s.into_bytes())
    }
}

impl<const MAX: u32> fmt::Display for StringM<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl<const MAX: u32> fmt::Debug for StringM<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringM({:?})", self.to_string_lossy())
    }
}

impl<const MAX: u32> WriteXdr for StringM<MAX> {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_var_opaque(&self.0);
    }
}

impl<const MAX: u32> ReadXdr for StringM<MAX> {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self(r.read_var_opaque(MAX)?))
    }
}

impl<const MAX: u32> Serialize for StringM<MAX> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

impl<'de, const MAX: u32> Deserialize<'de> for StringM<MAX> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::try_from(s).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// VecM
// ---------------------------------------------------------------------------

/// A variable-length array of at most `MAX` elements (`T foo<MAX>`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VecM<T, const MAX: u32 = { u32::MAX }>(Vec<T>);

impl<T, const MAX: u32> VecM<T, MAX> {
    /// The declared maximum element count.
    pub const MAX_LEN: u32 = MAX;

    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    /// Infallible construction from a fixed array known to fit.
    pub fn from_array<const N: usize>(items: [T; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Fits::<N, MAX>::OK;
        Self(items.into())
    }

    /// Appends an element, failing if the array is already full.
    pub fn try_push(&mut self, item: T) -> Result<(), XdrError> {
        check_len(self.0.len() + 1, MAX)?;
        self.0.push(item);
        Ok(())
    }
}

impl<T, const MAX: u32> Default for VecM<T, MAX> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T, const MAX: u32> Deref for VecM<T, MAX> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<'a, T, const MAX: u32> IntoIterator for &'a VecM<T, MAX> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T, const MAX: u32> IntoIterator for VecM<T, MAX> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T, const MAX: u32> TryFrom<Vec<T>> for VecM<T, MAX> {
    type Error = XdrError;

    fn try_from(items: Vec<T>) -> Result<Self, XdrError> {
        check_len(items.len(), MAX)?;
        Ok(Self(items))
    }
}

impl<T: fmt::Debug, const MAX: u32> fmt::Debug for VecM<T, MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<T: WriteXdr, const MAX: u32> WriteXdr for VecM<T, MAX> {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_slice(&self.0);
    }
}

impl<T: ReadXdr, const MAX: u32> ReadXdr for VecM<T, MAX> {
    fn read_xdr(r: &mut XdrReader<'_>) -> Result<Self, XdrError> {
        Ok(Self(r.read_vec(MAX)?))
    }
}

impl<T: Serialize, const MAX: u32> Serialize for VecM<T, MAX> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>, const MAX: u32> Deserialize<'de> for VecM<T, MAX> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::try_from(items).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_bound_enforced_on_construction() {
        assert!(BytesM::<4>::try_from(vec![1u8, 2, 3, 4]).is_ok());
        assert_eq!(
            BytesM::<4>::try_from(vec![1u8, 2, 3, 4, 5]),
            Err(XdrError::LengthExceedsMax { len: 5, max: 4 })
        );
    }

    #[test]
    fn bytes_bound_enforced_on_decode() {
        let long = BytesM::<8>::try_from(vec![9u8; 8]).unwrap().to_xdr();
        assert!(matches!(
            BytesM::<4>::from_xdr(&long),
            Err(XdrError::LengthExceedsMax { len: 8, max: 4 })
        ));
    }

    #[test]
    fn string_keeps_raw_bytes() {
        let raw = vec![0xff, 0xfe, b'a'];
        let s = StringM::<28>::try_from(raw.clone()).unwrap();
        assert!(s.as_str().is_none());
        let decoded = StringM::<28>::from_xdr(&s.to_xdr()).unwrap();
        assert_eq!(decoded.as_bytes(), raw.as_slice());
    }

    #[test]
    fn string_from_str() {
        let s = StringM::<32>::try_from("example.com").unwrap();
        assert_eq!(s.as_str(), Some("example.com"));
        assert_eq!(s.to_string(), "example.com");
        assert!(StringM::<3>::try_from("four").is_err());
    }

    #[test]
    fn vec_try_push_respects_bound() {
        let mut v: VecM<u32, 2> = VecM::new();
        v.try_push(1).unwrap();
        v.try_push(2).unwrap();
        assert!(v.try_push(3).is_err());
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn vec_encoding_is_count_then_elements() {
        let v: VecM<u32, 5> = VecM::try_from(vec![7u32, 8]).unwrap();
        assert_eq!(v.to_xdr(), vec![0, 0, 0, 2, 0, 0, 0, 7, 0, 0, 0, 8]);
        assert!(VecM::<u32, 1>::from_xdr(&v.to_xdr()).is_err());
    }

    #[test]
    fn serde_views() {
        let bytes = BytesM::<8>::try_from(vec![0xdeu8, 0xad]).unwrap();
        assert_eq!(serde_json::to_string(&bytes).unwrap(), "\"dead\"");
        let back: BytesM<8> = serde_json::from_str("\"dead\"").unwrap();
        assert_eq!(back, bytes);
        assert!(serde_json::from_str::<BytesM<1>>("\"dead\"").is_err());
    }
}
