//! Conversion between human-readable decimal amounts and integer base units.
//!
//! An asset with a unit count (decimals) of `n` represents the display amount `1` as `10^n` base
//! units. Conversion works on the digit string directly so no precision is ever lost.

use thiserror::Error;

use crate::U256;

const DECIMAL_POINT: char = '.';

/// Error returned when a decimal amount cannot be converted to base units.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AmountParseError {
    /// The amount is empty or only whitespace.
    #[error("amount is empty")]
    Empty,
    /// The amount contains something other than digits and a single decimal point.
    #[error("unexpected character '{0}' in amount")]
    InvalidCharacter(char),
    /// The amount contains more than one decimal point.
    #[error("amount has more than one decimal point")]
    MultipleDecimalPoints,
    /// The amount is a bare decimal point.
    #[error("amount has no digits")]
    NoDigits,
    /// The amount is more precise than the asset can represent.
    #[error("amount has {found} fractional digits but the asset only supports {max}")]
    TooManyFractionalDigits {
        /// Significant fractional digits in the input.
        found: usize,
        /// The asset's unit count.
        max: u8,
    },
    /// The amount does not fit in 256 bits once scaled.
    #[error("amount exceeds the 256-bit range")]
    Overflow,
}

/// Converts a decimal string like `"1.25"` to base units at the given unit count.
///
/// Surrounding whitespace is ignored. Trailing fractional zeros don't count towards precision, so
/// `"1.50"` is accepted at a unit count of 1.
pub fn to_base_units(amount: &str, unit_count: u8) -> Result<U256, AmountParseError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountParseError::Empty);
    }
    if let Some(invalid) = amount
        .chars()
        .find(|c| !c.is_ascii_digit() && *c != DECIMAL_POINT)
    {
        return Err(AmountParseError::InvalidCharacter(invalid));
    }

    let (integer, fraction) = match amount.split_once(DECIMAL_POINT) {
        Some((_, fraction)) if fraction.contains(DECIMAL_POINT) => {
            return Err(AmountParseError::MultipleDecimalPoints)
        }
        Some((integer, fraction)) => (integer, fraction),
        None => (amount, ""),
    };
    if integer.is_empty() && fraction.is_empty() {
        return Err(AmountParseError::NoDigits);
    }

    let fraction = fraction.trim_end_matches('0');
    let max = usize::from(unit_count);
    if fraction.len() > max {
        return Err(AmountParseError::TooManyFractionalDigits {
            found: fraction.len(),
            max: unit_count,
        });
    }

    let mut digits = String::with_capacity(integer.len() + max);
    digits.push_str(integer);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(max - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|_| AmountParseError::Overflow)
}

/// Formats base units as a canonical decimal string at the given unit count.
///
/// The result has no leading zeros beyond a single `0` integer part, and no trailing fractional
/// zeros or decimal point.
pub fn to_decimal_string(base_units: U256, unit_count: u8) -> String {
    let digits = base_units.to_string();
    let unit_count = usize::from(unit_count);
    if unit_count == 0 {
        return digits;
    }

    let padded = if digits.len() <= unit_count {
        format!("{:0>width$}", digits, width = unit_count + 1)
    } else {
        digits
    };
    let (integer, fraction) = padded.split_at(padded.len() - unit_count);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{}{}{}", integer, DECIMAL_POINT, fraction)
    }
}
