//! Offer prices as 32-bit rationals.
//!
//! The DEX stores a price as `n / d` with both terms `int32`. Decimal input
//! is converted to the closest fraction whose terms fit, via continued
//! fractions over exact integers (no floats).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::xdr::{ReadXdr, WriteXdr, XdrError, XdrReader, XdrWriter};

/// Longest fractional part accepted by [`Price::from_str`].
const MAX_PRICE_DECIMALS: usize = 20;

/// A price `n / d` (`Price` in XDR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    /// A price from explicit terms. Both must be positive.
    pub fn new(n: i32, d: i32) -> Result<Self> {
        if n <= 0 || d <= 0 {
            return Err(Error::constraint("price", "numerator and denominator must be positive"));
        }
        Ok(Self { n, d })
    }

    /// Closest rational to `num / den` with both terms at most `i32::MAX`.
    fn best_rational(num: u128, den: u128) -> Option<Self> {
        let limit = i32::MAX as u128;
        let (mut p, mut q) = (num, den);
        // Convergents h/k, seeded with 1/0 and 0/1.
        let (mut h_prev, mut h) = (0u128, 1u128);
        let (mut k_prev, mut k) = (1u128, 0u128);
        let mut best = None;

        while q != 0 {
            let a = p / q;
            let next_h = a.checked_mul(h).and_then(|v| v.checked_add(h_prev));
            let next_k = a.checked_mul(k).and_then(|v| v.checked_add(k_prev));
            let (Some(next_h), Some(next_k)) = (next_h, next_k) else {
                break;
            };
            if next_h > limit || next_k > limit {
                break;
            }
            (h_prev, h) = (h, next_h);
            (k_prev, k) = (k, next_k);
            best = Some((h, k));
            (p, q) = (q, p - a * q);
        }

        let (n, d) = best?;
        if n == 0 {
            return None;
        }
        Some(Self {
            n: n as i32,
            d: d as i32,
        })
    }
}

impl FromStr for Price {
    type Err = Error;

    /// Parses a positive decimal such as `"1.25"` into `5/4`.
    ///
    /// ```
    /// use stellar_wire::types::Price;
    ///
    /// let p: Price = "1.25".parse().unwrap();
    /// assert_eq!((p.n, p.d), (5, 4));
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::constraint("price", format!("{reason}: {s:?}"));

        let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
            || (s.contains('.') && frac_part.is_empty())
        {
            return Err(invalid("not a decimal number"));
        }
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.len() > MAX_PRICE_DECIMALS {
            return Err(invalid("too many fractional digits"));
        }
        let int_part = int_part.trim_start_matches('0');
        if int_part.len() > 10 {
            return Err(invalid("does not fit a 32-bit price"));
        }

        let digits = format!("{int_part}{frac_part}");
        let num: u128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| invalid("not a decimal number"))?
        };
        let den = 10u128.pow(frac_part.len() as u32);
        if num == 0 {
            return Err(invalid("must be positive"));
        }
        Self::best_rational(num, den).ok_or_else(|| invalid("not representable as int32/int32"))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

impl WriteXdr for Price {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_i32(self.n);
        w.write_i32(self.d);
    }
}

impl ReadXdr for Price {
    fn read_xdr(r: &mut XdrReader<'_>) -> std::result::Result<Self, XdrError> {
        Ok(Self {
            n: r.read_i32()?,
            d: r.read_i32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> (i32, i32) {
        let p: Price = s.parse().unwrap();
        (p.n, p.d)
    }

    #[test]
    fn test_exact_decimals() {
        assert_eq!(parse("1"), (1, 1));
        assert_eq!(parse("1.25"), (5, 4));
        assert_eq!(parse("0.5"), (1, 2));
        assert_eq!(parse("2.000"), (2, 1));
        assert_eq!(parse("0.1"), (1, 10));
    }

    #[test]
    fn test_approximation_stays_in_range() {
        // 1/3 to 20 places cannot be represented exactly
        let (n, d) = parse("0.33333333333333333333");
        assert!(n > 0 && d > 0);
        let approx = n as f64 / d as f64;
        assert!((approx - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_price() {
        assert_eq!(parse("2147483647"), (i32::MAX, 1));
        assert!("2147483648".parse::<Price>().is_err());
    }

    #[test]
    fn test_tiny_price_rejected() {
        assert!("0.0000000000000000001".parse::<Price>().is_err());
    }

    #[test]
    fn test_invalid_strings() {
        for bad in ["", "0", "-1", "1.", ".5", "1/2", "abc", "0.000"] {
            assert!(bad.parse::<Price>().is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_new_requires_positive_terms() {
        assert!(Price::new(1, 0).is_err());
        assert!(Price::new(0, 1).is_err());
        assert!(Price::new(-1, 2).is_err());
        assert_eq!(Price::new(3, 7).unwrap().to_string(), "3/7");
    }

    #[test]
    fn test_xdr_layout() {
        let p = Price::new(1, 2).unwrap();
        assert_eq!(p.to_xdr(), vec![0, 0, 0, 1, 0, 0, 0, 2]);
        assert_eq!(Price::from_xdr(&p.to_xdr()), Ok(p));
    }
}
