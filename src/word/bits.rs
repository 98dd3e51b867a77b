//! Fixed-width binary words.
//!
//! This module provides the two widths used by the SAP-1:
//! - `Word8`: 8-bit word for memory cells, the instruction register,
//!   the accumulator and the B register
//! - `Addr4`: 4-bit address for the program counter and the memory
//!   address register

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::word::{Bit, codec};
use crate::word::codec::CodecError;

/// An 8-bit word.
///
/// Bits are indexed from least significant (0) to most significant (7).
/// Bit 7 doubles as the two's-complement sign when a word is displayed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word8(u8);

/// A 4-bit memory address (0-15).
///
/// Every constructor masks its input, so a value above 15 cannot exist.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Addr4(u8);

// ============================================================================
// Word8 Implementation
// ============================================================================

impl Word8 {
    /// Number of bits in a Word8.
    pub const WIDTH: usize = 8;

    /// The all-zero word.
    pub const ZERO: Word8 = Word8(0);

    /// The word with value one (used by the ALU for negation).
    pub const ONE: Word8 = Word8(1);

    /// Create a word from its raw byte.
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Create a word from an arbitrary value, keeping the low 8 bits.
    #[inline]
    pub const fn from_u32_masked(value: u32) -> Self {
        Self((value & 0xFF) as u8)
    }

    /// Create a word from two nibbles.
    #[inline]
    pub const fn from_nibbles(high: u8, low: Addr4) -> Self {
        Self(((high & 0x0F) << 4) | low.0)
    }

    /// Get the raw byte.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Get a single bit by index (0 = LSB).
    #[inline]
    pub const fn bit(self, index: usize) -> Bit {
        Bit::from_bool((self.0 >> index) & 1 == 1)
    }

    /// Return a copy with one bit replaced (0 = LSB).
    #[inline]
    pub const fn with_bit(self, index: usize, bit: Bit) -> Self {
        let mask = 1u8 << index;
        if bit.to_bool() {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    /// Get the bits, LSB first.
    pub fn bits(self) -> [Bit; 8] {
        let mut bits = [Bit::Zero; 8];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = self.bit(i);
        }
        bits
    }

    /// Build a word from bits, LSB first.
    pub fn from_bits(bits: [Bit; 8]) -> Self {
        bits.iter()
            .enumerate()
            .fold(Self::ZERO, |word, (i, bit)| word.with_bit(i, *bit))
    }

    /// The opcode half of an instruction word.
    #[inline]
    pub const fn high_nibble(self) -> u8 {
        self.0 >> 4
    }

    /// The operand half of an instruction word.
    #[inline]
    pub const fn low_nibble(self) -> Addr4 {
        Addr4::new(self.0)
    }

    /// Bitwise complement.
    #[inline]
    pub const fn not(self) -> Self {
        Self(!self.0)
    }

    /// True when the most significant bit is set.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 & 0x80 != 0
    }

    /// Check if this word is zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse exactly eight `0`/`1` characters, MSB first.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        let len = s.chars().count();
        if len != Self::WIDTH {
            return Err(ParseError::WrongLength { expected: Self::WIDTH, got: len });
        }

        let value = codec::binary_to_decimal(s)?;
        Ok(Self::from_u32_masked(value))
    }
}

impl fmt::Debug for Word8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word8({} = {})", self, self.0)
    }
}

impl fmt::Display for Word8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&codec::decimal_to_binary(self.0 as u32, Self::WIDTH))
    }
}

impl FromStr for Word8 {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::ops::Not for Word8 {
    type Output = Self;

    fn not(self) -> Self::Output {
        Word8::not(self)
    }
}

impl From<u8> for Word8 {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<Word8> for u8 {
    fn from(word: Word8) -> Self {
        word.0
    }
}

// ============================================================================
// Addr4 Implementation
// ============================================================================

impl Addr4 {
    /// Number of bits in an Addr4.
    pub const WIDTH: usize = 4;

    /// Number of addressable words.
    pub const COUNT: usize = 16;

    /// Address zero.
    pub const ZERO: Addr4 = Addr4(0);

    /// The highest address.
    pub const MAX: Addr4 = Addr4(15);

    /// Create an address, keeping the low 4 bits of `value`.
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(value & 0x0F)
    }

    /// Get the address as a number 0-15.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Get the address as a memory index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The next address, wrapping from 15 to 0.
    #[inline]
    pub const fn wrapping_next(self) -> Self {
        Self::new(self.0 + 1)
    }

    /// All sixteen addresses in order.
    pub fn all() -> impl Iterator<Item = Addr4> {
        (0..Self::COUNT as u8).map(Addr4::new)
    }
}

impl fmt::Debug for Addr4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr4({} = {})", self, self.0)
    }
}

impl fmt::Display for Addr4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&codec::decimal_to_binary(self.0 as u32, Self::WIDTH))
    }
}

impl TryFrom<u8> for Addr4 {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value as usize >= Self::COUNT {
            return Err(ParseError::OutOfRange(value as u32));
        }
        Ok(Self(value))
    }
}

impl From<Addr4> for u8 {
    fn from(addr: Addr4) -> Self {
        addr.0
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when parsing binary words.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input string was the wrong length.
    #[error("expected {expected} bits, got {got}")]
    WrongLength { expected: usize, got: usize },

    /// A character other than `0` or `1` was encountered.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A numeric value did not fit the width.
    #[error("value {0} out of range")]
    OutOfRange(u32),
}

// ============================================================================
// Tests
// ============================================================================
