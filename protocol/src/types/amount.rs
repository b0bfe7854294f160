//! Decimal amount strings and their stroop representation.
//!
//! Amounts travel as base-10 strings with at most seven fractional digits
//! (`"100.5"`) and sit on the wire as integers scaled by 10^7. No floating
//! point anywhere near monetary values: parsing is digit-by-digit with
//! checked arithmetic.

use crate::config::{AMOUNT_DECIMALS, STROOPS_PER_UNIT};
use crate::error::{Error, Result};

/// Splits and validates a decimal string into (negative, integer digits,
/// fractional digits right-padded to seven places).
fn parse_parts(s: &str) -> Result<(bool, &str, String)> {
    let invalid = |reason: &str| Error::constraint("amount", format!("{reason}: {s:?}"));

    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }
    let frac = match frac_part {
        None => String::new(),
        Some(f) if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) => {
            return Err(invalid("not a decimal number"))
        }
        Some(f) if f.len() > AMOUNT_DECIMALS => {
            return Err(invalid("more than 7 fractional digits"))
        }
        Some(f) => f.to_string(),
    };
    Ok((negative, int_part, format!("{frac:0<width$}", width = AMOUNT_DECIMALS)))
}

/// Parses a decimal amount into stroops.
///
/// ```
/// use stellar_wire::types::to_stroops;
///
/// assert_eq!(to_stroops("100.5").unwrap(), 1_005_000_000);
/// assert!(to_stroops("0.00000001").is_err());
/// ```
pub fn to_stroops(s: &str) -> Result<i64> {
    let wide = to_stroops_i128(s)?;
    i64::try_from(wide).map_err(|_| Error::Overflow("amount"))
}

/// 128-bit variant of [`to_stroops`], for contract token amounts.
pub fn to_stroops_i128(s: &str) -> Result<i128> {
    let (negative, int_part, frac) = parse_parts(s)?;
    let overflow = || Error::Overflow("amount");

    // negatives accumulate downward so the minimum magnitude fits
    let mut value: i128 = 0;
    for digit in int_part.bytes().chain(frac.bytes()) {
        let digit = i128::from(digit - b'0');
        value = value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) })
            .ok_or_else(overflow)?;
    }
    Ok(value)
}

/// Formats stroops as a decimal string with trailing zeros stripped.
///
/// ```
/// use stellar_wire::types::from_stroops;
///
/// assert_eq!(from_stroops(1_005_000_000), "100.5");
/// assert_eq!(from_stroops(10_000_000), "1");
/// ```
pub fn from_stroops(stroops: i64) -> String {
    from_stroops_i128(i128::from(stroops))
}

/// 128-bit variant of [`from_stroops`].
pub fn from_stroops_i128(stroops: i128) -> String {
    let scale = STROOPS_PER_UNIT as u128;
    let magnitude = stroops.unsigned_abs();
    let whole = magnitude / scale;
    let frac = magnitude % scale;
    let sign = if stroops < 0 { "-" } else { "" };

    if frac == 0 {
        return format!("{sign}{whole}");
    }
    let frac = format!("{frac:0width$}", width = AMOUNT_DECIMALS);
    format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
}

/// Parses an amount that must be strictly positive.
pub(crate) fn positive_amount(field: &'static str, s: &str) -> Result<i64> {
    let value = to_stroops(s)?;
    if value <= 0 {
        return Err(Error::constraint(field, "must be positive"));
    }
    Ok(value)
}

/// Parses an amount that must not be negative.
pub(crate) fn non_negative_amount(field: &'static str, s: &str) -> Result<i64> {
    let value = to_stroops(s)?;
    if value < 0 {
        return Err(Error::constraint(field, "must not be negative"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_whole_and_fractional() {
        assert_eq!(to_stroops("1").unwrap(), 10_000_000);
        assert_eq!(to_stroops("0.0000001").unwrap(), 1);
        assert_eq!(to_stroops("922337203685.4775807").unwrap(), i64::MAX);
        assert_eq!(to_stroops("-2.5").unwrap(), -25_000_000);
    }

    #[test]
    fn test_canonical_roundtrip() {
        for (input, canonical) in [
            ("100.5", "100.5"),
            ("100.5000000", "100.5"),
            ("007.10", "7.1"),
            ("0", "0"),
            ("0.0000001", "0.0000001"),
            ("-3.25", "-3.25"),
        ] {
            assert_eq!(from_stroops(to_stroops(input).unwrap()), canonical);
        }
    }

    #[test]
    fn test_too_many_decimals_rejected() {
        let err = to_stroops("1.00000001").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueConstraint);
    }

    #[test]
    fn test_malformed_rejected() {
        for bad in ["", ".5", "5.", "1e7", "1,5", "--1", " 1", "+1", "abc"] {
            assert!(to_stroops(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_overflow_is_overflow() {
        let err = to_stroops("922337203685.4775808").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert!(to_stroops_i128("922337203685.4775808").is_ok());
    }

    #[test]
    fn test_i128_extremes() {
        let max = from_stroops_i128(i128::MAX);
        assert_eq!(to_stroops_i128(&max).unwrap(), i128::MAX);
        let min = from_stroops_i128(i128::MIN);
        assert_eq!(to_stroops_i128(&min).unwrap(), i128::MIN);
        assert_eq!(to_stroops(&from_stroops(i64::MIN)).unwrap(), i64::MIN);
        assert_eq!(
            to_stroops_i128("99999999999999999999999999999999999").unwrap_err().kind(),
            ErrorKind::Overflow
        );
    }

    #[test]
    fn test_sign_helpers() {
        assert!(positive_amount("amount", "0").is_err());
        assert!(non_negative_amount("amount", "0").is_ok());
        assert!(non_negative_amount("amount", "-1").is_err());
    }
}
