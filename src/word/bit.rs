//! Single binary digit.
//!
//! The ALU works one bit at a time, so the adder logic lives here
//! rather than on the word types.

use std::fmt;
use serde::{Serialize, Deserialize};

/// A single binary digit.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit {
    /// Low (0)
    Zero = 0,
    /// High (1)
    One = 1,
}

impl Bit {
    /// Both bit values in order: Zero, One
    pub const ALL: [Bit; 2] = [Bit::Zero, Bit::One];

    /// Create a bit from a boolean (`true` = One).
    #[inline]
    pub const fn from_bool(value: bool) -> Self {
        if value { Bit::One } else { Bit::Zero }
    }

    /// Convert to a boolean.
    #[inline]
    pub const fn to_bool(self) -> bool {
        matches!(self, Bit::One)
    }

    /// Convert to 0 or 1.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Create a bit from a `'0'` or `'1'` character.
    #[inline]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            _ => None,
        }
    }

    /// Render as `'0'` or `'1'`.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
        }
    }

    /// Invert the bit.
    #[inline]
    pub const fn not(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }

    /// Full adder: adds three bits (a, b, c_in), returns (sum, carry_out).
    ///
    /// The sum is the parity of the ones among the inputs; the carry is
    /// set when two or more inputs are one.
    #[inline]
    pub const fn full_add(self, other: Self, carry_in: Self) -> (Self, Self) {
        let ones = self.to_u8() + other.to_u8() + carry_in.to_u8();
        (Bit::from_bool(ones % 2 == 1), Bit::from_bool(ones >= 2))
    }
}

impl Default for Bit {
    fn default() -> Self {
        Bit::Zero
    }
}

impl fmt::Debug for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl std::ops::Not for Bit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Bit::not(self)
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        Bit::from_bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_add_truth_table() {
        let cases = [
            // (a, b, c_in) -> (sum, c_out)
            ((0, 0, 0), (0, 0)),
            ((0, 0, 1), (1, 0)),
            ((0, 1, 0), (1, 0)),
            ((0, 1, 1), (0, 1)),
            ((1, 0, 0), (1, 0)),
            ((1, 0, 1), (0, 1)),
            ((1, 1, 0), (0, 1)),
            ((1, 1, 1), (1, 1)),
        ];

        for ((a, b, c), (s, co)) in cases {
            let bit = |v: u8| Bit::from_bool(v == 1);
            let (sum, carry) = bit(a).full_add(bit(b), bit(c));
            assert_eq!(sum.to_u8(), s, "sum of {}+{}+{}", a, b, c);
            assert_eq!(carry.to_u8(), co, "carry of {}+{}+{}", a, b, c);
        }
    }

    #[test]
    fn test_not_involution() {
        for b in Bit::ALL {
            assert_eq!(!!b, b);
            assert_ne!(!b, b);
        }
    }

    #[test]
    fn test_char_roundtrip() {
        assert_eq!(Bit::from_char('0'), Some(Bit::Zero));
        assert_eq!(Bit::from_char('1'), Some(Bit::One));
        assert_eq!(Bit::from_char('2'), None);
        assert_eq!(Bit::One.to_char(), '1');
    }
}
