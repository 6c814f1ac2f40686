use crate::utils::error::{AppError, AtlasResult};
use num_bigint::BigUint;
use num_traits::{Num, Zero};

/// Largest power of ten an amount may be scaled by. No asset has anywhere
/// near this many decimals; larger exponents are treated as malformed.
const MAX_SCALE: i64 = 1_000;

/// Scales a decimal display amount (`"0.010000000"`, `"1.5"`, `"1e-7"`) into
/// an integer count of the smallest unit for an asset with `decimals` places.
///
/// The conversion is exact. Digits below the smallest unit are only accepted
/// when they are zeros; anything else is rejected rather than rounded.
/// Exponents that would scale past `MAX_SCALE` digits are rejected too.
pub fn to_smallest_unit(field: &'static str, value: &str, decimals: u32) -> AtlasResult<BigUint> {
    let malformed = || AppError::malformed(field, value);
    let trimmed = value.trim();

    let (mantissa, exponent) = match trimmed.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => {
            let exp = trimmed[pos + 1..]
                .parse::<i64>()
                .map_err(|_| malformed())?;
            (&trimmed[..pos], exp)
        }
        None => (trimmed, 0),
    };
    let mantissa = mantissa.strip_prefix('+').unwrap_or(mantissa);

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int_part.len() + frac_part.len() == 0 || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(malformed());
    }

    let digits = format!("{}{}", int_part, frac_part);
    let scale = i64::from(decimals)
        .checked_add(exponent)
        .and_then(|s| s.checked_sub(i64::try_from(frac_part.len()).ok()?))
        .ok_or_else(malformed)?;

    if scale >= 0 {
        if scale > MAX_SCALE {
            return Err(malformed());
        }
        let scale = u32::try_from(scale).map_err(|_| malformed())?;
        let base = parse_digits(&digits).ok_or_else(malformed)?;
        return Ok(base * BigUint::from(10u32).pow(scale));
    }

    let drop = usize::try_from(scale.unsigned_abs()).unwrap_or(usize::MAX);
    if drop >= digits.len() {
        return if digits.bytes().all(|b| b == b'0') {
            Ok(BigUint::zero())
        } else {
            Err(malformed())
        };
    }

    let (kept, dropped) = digits.split_at(digits.len() - drop);
    if dropped.bytes().any(|b| b != b'0') {
        return Err(malformed());
    }
    parse_digits(kept).ok_or_else(malformed)
}

/// Parses an integer quantity. Accepts plain decimal strings and `0x` prefixed
/// hex, the two encodings block explorers and JSON-RPC nodes use.
pub fn parse_quantity(field: &'static str, value: &str) -> AtlasResult<BigUint> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some("") => Some(BigUint::zero()),
        Some(hex) => BigUint::from_str_radix(hex, 16).ok(),
        None if trimmed.bytes().all(|b| b.is_ascii_digit()) => parse_digits(trimmed),
        None => None,
    };
    parsed.ok_or_else(|| AppError::malformed(field, value))
}

/// Like [`parse_quantity`] but for fields that must fit in a `u64`
/// (block heights, timestamps).
pub fn parse_u64(field: &'static str, value: &str) -> AtlasResult<u64> {
    let quantity = parse_quantity(field, value)?;
    u64::try_from(quantity).map_err(|_| AppError::malformed(field, value))
}

fn parse_digits(digits: &str) -> Option<BigUint> {
    if digits.is_empty() {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(value: &str, decimals: u32) -> String {
        to_smallest_unit("amount", value, decimals).unwrap().to_string()
    }

    #[test]
    fn test_fee_scaling_is_exact() {
        assert_eq!(scaled("0.010000000", 9), "10000000");
        assert_eq!(scaled("10.000000000", 9), "10000000000");
    }

    #[test]
    fn test_trailing_zero_precision_is_dropped() {
        assert_eq!(scaled("2.000000000", 0), "2");
        assert_eq!(scaled("0.000", 0), "0");
    }

    #[test]
    fn test_large_exponent_does_not_lose_digits() {
        assert_eq!(scaled("1.5", 18), "1500000000000000000");
        assert_eq!(scaled("123456789.123456789123456789", 18), "123456789123456789123456789");
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(scaled("1e-7", 18), "100000000000");
        assert_eq!(scaled("2.5E3", 0), "2500");
    }

    #[test]
    fn test_integer_without_point() {
        assert_eq!(scaled("42", 6), "42000000");
        assert_eq!(scaled(".5", 1), "5");
    }

    #[test]
    fn test_sub_unit_digits_are_rejected() {
        let err = to_smallest_unit("fee", "0.0000000001", 9).unwrap_err();
        assert!(matches!(err, AppError::MalformedAmountError { field: "fee", .. }));
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        for bad in ["", "abc", "1.2.3", "-1", "1,5", ".", "1e", "0x10"] {
            assert!(
                to_smallest_unit("amount", bad, 9).is_err(),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_exponent_overflow_is_rejected() {
        for bad in ["1e9223372036854775807", "1e-9223372036854775808", "1.5e9223372036854775807"] {
            let err = to_smallest_unit("amount", bad, 9).unwrap_err();
            assert!(
                matches!(err, AppError::MalformedAmountError { field: "amount", .. }),
                "expected {:?} to be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_exponent_past_u32_is_not_truncated() {
        let err = to_smallest_unit("amount", "1e4294967296", 0).unwrap_err();
        assert!(matches!(err, AppError::MalformedAmountError { .. }));
    }

    #[test]
    fn test_exponent_beyond_scale_cap_is_rejected() {
        assert!(to_smallest_unit("amount", "1e100000000", 0).is_err());
        assert!(to_smallest_unit("amount", "1e1001", 0).is_err());
        assert_eq!(scaled("1e1000", 0).len(), 1001);
    }

    #[test]
    fn test_parse_quantity_decimal_and_hex() {
        assert_eq!(parse_quantity("value", "21000").unwrap(), BigUint::from(21000u32));
        assert_eq!(parse_quantity("value", "0x5208").unwrap(), BigUint::from(21000u32));
        assert_eq!(parse_quantity("value", "0x").unwrap(), BigUint::zero());
        assert!(parse_quantity("value", "12a").is_err());
        assert!(parse_quantity("value", "").is_err());
    }

    #[test]
    fn test_parse_u64_overflow() {
        assert_eq!(parse_u64("blockNumber", "3411115").unwrap(), 3411115);
        assert!(parse_u64("blockNumber", "340282366920938463463374607431768211456").is_err());
    }
}
