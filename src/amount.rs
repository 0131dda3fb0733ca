//! Amount and currency normalization for signed requests.
//!
//! The gateway expects amounts with exactly two decimals. Rounding is done
//! on the decimal digits as written (half-up), never through `f64`, so the
//! signed value is exactly what the caller typed, rounded to cents.

use crate::error::{GatewayError, Result};

const MAX_INTEGER_DIGITS: usize = 15;

/// Format an amount string with two decimal places.
///
/// `"9"` -> `"9.00"`, `"9.999"` -> `"10.00"`, `"1.005"` -> `"1.01"`.
pub fn normalize_amount(input: &str) -> Result<String> {
    let invalid = || GatewayError::InvalidAmount(input.to_string());
    let trimmed = input.trim();

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let int_part = int_part.trim_start_matches('0');
    if int_part.len() > MAX_INTEGER_DIGITS {
        return Err(invalid());
    }

    let whole: u64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| invalid())?
    };

    let digits: Vec<u64> = frac_part.bytes().map(|b| u64::from(b - b'0')).collect();
    let digit = |i: usize| digits.get(i).copied().unwrap_or(0);
    let round_up = u64::from(digit(2) >= 5);

    let cents = whole * 100 + digit(0) * 10 + digit(1) + round_up;
    Ok(format!("{}.{:02}", cents / 100, cents % 100))
}

/// Upper-case a currency code such as `"usd"`.
pub fn normalize_currency(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(GatewayError::InvalidCurrency(input.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_number_gets_two_decimals() {
        assert_eq!(normalize_amount("9").unwrap(), "9.00");
        assert_eq!(normalize_amount("100").unwrap(), "100.00");
        assert_eq!(normalize_amount(" 25.5 ").unwrap(), "25.50");
        assert_eq!(normalize_amount("25.50").unwrap(), "25.50");
    }

    #[test]
    fn test_rounds_half_up_with_carry() {
        assert_eq!(normalize_amount("9.999").unwrap(), "10.00");
        assert_eq!(normalize_amount("1.005").unwrap(), "1.01");
        assert_eq!(normalize_amount("1.0049999").unwrap(), "1.00");
        assert_eq!(normalize_amount("0.004").unwrap(), "0.00");
        assert_eq!(normalize_amount("99.995").unwrap(), "100.00");
    }

    #[test]
    fn test_leading_zeros_and_bare_fraction() {
        assert_eq!(normalize_amount("007.1").unwrap(), "7.10");
        assert_eq!(normalize_amount(".5").unwrap(), "0.50");
        assert_eq!(normalize_amount("5.").unwrap(), "5.00");
        assert_eq!(normalize_amount("0").unwrap(), "0.00");
    }

    #[test]
    fn test_rejects_non_decimal_input() {
        for bad in ["", "  ", ".", "abc", "-5", "+5", "1e3", "1.2.3", "1,50", "12 34"] {
            assert!(
                matches!(normalize_amount(bad), Err(GatewayError::InvalidAmount(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_rejects_oversized_amount() {
        assert!(normalize_amount("999999999999999.99").is_ok());
        assert!(normalize_amount("1000000000000000").is_err());
    }

    #[test]
    fn test_currency_is_upper_cased() {
        assert_eq!(normalize_currency("usd").unwrap(), "USD");
        assert_eq!(normalize_currency(" eUr ").unwrap(), "EUR");
        assert!(matches!(
            normalize_currency("us1"),
            Err(GatewayError::InvalidCurrency(_))
        ));
        assert!(normalize_currency("").is_err());
    }
}
