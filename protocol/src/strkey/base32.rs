//! RFC 4648 base32, upper-case alphabet, no padding.
//!
//! Only the canonical encoding is accepted on decode: no lower case, no `=`,
//! no lengths that can't come out of the encoder, no stray bits in the final
//! character. Two different strings must never decode to the same key.

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

fn decode_char(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'2'..=b'7' => Some(c - b'2' + 26),
        _ => None,
    }
}

/// Length of the unpadded encoding of `n` bytes.
pub(crate) const fn encoded_len(n: usize) -> usize {
    (n * 8 + 4) / 5
}

pub(crate) fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(data.len()));
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decodes canonical unpadded base32. Returns `None` on any deviation.
pub(crate) fn decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let out_len = bytes.len() * 5 / 8;
    if encoded_len(out_len) != bytes.len() {
        return None;
    }

    let mut out = Vec::with_capacity(out_len);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &c in bytes {
        buffer = (buffer << 5) | u32::from(decode_char(c)?);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
        buffer &= (1 << bits) - 1;
    }
    // Leftover bits in the last character must be zero.
    if buffer != 0 {
        return None;
    }
    Some(out)
}
