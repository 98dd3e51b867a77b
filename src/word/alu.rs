//! The SAP-1 adder/subtractor.
//!
//! Addition is performed bit-serially with a ripple carry from the least
//! significant bit upward. Subtraction feeds the complement of `b` into the
//! same adder with a carry-in of one. The final carry-out is discarded by
//! [`add`]; there is no flag register in this machine.

use crate::word::{Bit, Word8};

/// Add (or subtract) two words, returning (result, carry_out).
pub fn add_with_carry(a: Word8, b: Word8, subtract: bool) -> (Word8, Bit) {
    let b = if subtract { b.not() } else { b };
    let (a_bits, b_bits) = (a.bits(), b.bits());
    let mut sums = [Bit::Zero; 8];
    let mut carry = Bit::from_bool(subtract);

    for (i, sum) in sums.iter_mut().enumerate() {
        let (bit, new_carry) = a_bits[i].full_add(b_bits[i], carry);
        *sum = bit;
        carry = new_carry;
    }

    (Word8::from_bits(sums), carry)
}

/// Compute `a + b`, or `a - b` in two's complement when `subtract` is set.
///
/// The result wraps modulo 256.
#[inline]
pub fn add(a: Word8, b: Word8, subtract: bool) -> Word8 {
    add_with_carry(a, b, subtract).0
}

/// Two's-complement negation through the adder (`0 - a`).
#[inline]
pub fn negate(a: Word8) -> Word8 {
    add(Word8::ZERO, a, true)
}

/// Magnitude of a word read as two's complement.
///
/// Negative words are reduced the way the output display does it:
/// subtract one, then complement. `10000000` has magnitude 128.
pub fn magnitude(a: Word8) -> u8 {
    if a.is_negative() {
        add(a, Word8::ONE, true).not().value()
    } else {
        a.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_basic() {
        let result = add(Word8::new(28), Word8::new(14), false);
        assert_eq!(result.value(), 42);
    }

    #[test]
    fn test_subtract_basic() {
        let result = add(Word8::new(42), Word8::new(12), true);
        assert_eq!(result.value(), 30);
    }

    #[test]
    fn test_subtract_below_zero_wraps() {
        let result = add(Word8::new(2), Word8::new(5), true);
        assert_eq!(result.value(), 0b1111_1101); // -3
    }

    #[test]
    fn test_add_overflow_carries_out() {
        let (result, carry) = add_with_carry(Word8::new(200), Word8::new(100), false);
        assert_eq!(result.value(), 44);
        assert_eq!(carry, Bit::One);

        let (_, carry) = add_with_carry(Word8::new(1), Word8::new(2), false);
        assert_eq!(carry, Bit::Zero);
    }

    #[test]
    fn test_subtract_carry_means_no_borrow() {
        let (_, carry) = add_with_carry(Word8::new(5), Word8::new(3), true);
        assert_eq!(carry, Bit::One);

        let (_, carry) = add_with_carry(Word8::new(3), Word8::new(5), true);
        assert_eq!(carry, Bit::Zero);
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(Word8::new(3)).value(), 0xFD);
        assert_eq!(negate(Word8::ZERO), Word8::ZERO);
        assert_eq!(negate(Word8::new(0x80)).value(), 0x80);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(magnitude(Word8::new(0xFD)), 3);
        assert_eq!(magnitude(Word8::new(0xFF)), 1);
        assert_eq!(magnitude(Word8::new(0x80)), 128);
        assert_eq!(magnitude(Word8::new(0x7F)), 127);
        assert_eq!(magnitude(Word8::ZERO), 0);
    }

    proptest! {
        #[test]
        fn add_is_mod_256(a: u8, b: u8) {
            let result = add(Word8::new(a), Word8::new(b), false);
            prop_assert_eq!(result.value(), a.wrapping_add(b));
        }

        #[test]
        fn subtract_is_twos_complement(a: u8, b: u8) {
            let result = add(Word8::new(a), Word8::new(b), true);
            prop_assert_eq!(result.value(), a.wrapping_sub(b));
        }

        #[test]
        fn add_carry_matches_overflow(a: u8, b: u8) {
            let (_, carry) = add_with_carry(Word8::new(a), Word8::new(b), false);
            prop_assert_eq!(carry.to_bool(), a.checked_add(b).is_none());
        }

        #[test]
        fn negative_magnitude_matches_signed_value(a in 0x80u8..=0xFF) {
            let signed = a as i8 as i16;
            prop_assert_eq!(magnitude(Word8::new(a)) as i16, -signed);
        }
    }
}
