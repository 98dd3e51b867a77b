//! Conversions between decimal values, fixed-width binary strings and
//! hex digit strings.
//!
//! These are the textual forms used by the program image (binary) and by
//! assembly operands (hex). All functions are pure.

use crate::word::Bit;
use thiserror::Error;

/// Maximum number of hex digits accepted by [`hex_digits_to_decimal`].
pub const MAX_HEX_DIGITS: usize = 8;

/// Render `value` in base 2, left-padded with zeros to exactly `width` bits.
///
/// Bits above `width` are discarded, so the result is never longer than
/// `width` characters.
pub fn decimal_to_binary(value: u32, width: usize) -> String {
    let masked = if width >= 32 { value } else { value & ((1u32 << width) - 1) };

    (0..width)
        .rev()
        .map(|bit| if bit < 32 && (masked >> bit) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Evaluate a string of `0`/`1` characters, most significant bit first.
///
/// An empty string evaluates to zero.
pub fn binary_to_decimal(bits: &str) -> Result<u32, CodecError> {
    let mut value: u32 = 0;

    for c in bits.chars() {
        let bit = Bit::from_char(c).ok_or(CodecError::InvalidBinaryDigit(c))?;
        value = (value << 1) | bit.to_u8() as u32;
    }

    Ok(value)
}

/// Evaluate a sequence of lowercase hex digits as a base-16 number.
pub fn hex_digits_to_decimal(hex: &str) -> Result<u32, CodecError> {
    if hex.is_empty() {
        return Err(CodecError::Empty);
    }

    let digits = hex.chars().count();
    if digits > MAX_HEX_DIGITS {
        return Err(CodecError::TooManyDigits(digits));
    }

    let mut value: u32 = 0;
    for c in hex.chars() {
        let nibble = match c {
            '0'..='9' => c as u32 - '0' as u32,
            'a'..='f' => c as u32 - 'a' as u32 + 10,
            other => return Err(CodecError::InvalidHexDigit(other)),
        };
        value = (value << 4) | nibble;
    }

    Ok(value)
}

/// Render the low nibble of `value` as a single lowercase hex digit.
pub fn hex_digit(value: u8) -> char {
    match value & 0x0F {
        n @ 0..=9 => (b'0' + n) as char,
        n => (b'a' + n - 10) as char,
    }
}

/// Errors produced by the textual conversions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid hex digit: '{0}' (expected 0-9 or a-f)")]
    InvalidHexDigit(char),

    #[error("invalid binary digit: '{0}' (expected 0 or 1)")]
    InvalidBinaryDigit(char),

    #[error("empty literal")]
    Empty,

    #[error("too many hex digits: {0} (at most {})", MAX_HEX_DIGITS)]
    TooManyDigits(usize),
}
