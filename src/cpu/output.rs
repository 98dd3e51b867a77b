//! Output latch and its decimal display.
//!
//! OUT copies the accumulator to the output latch. The display reads the
//! latched word as two's complement: a set sign bit prints a leading `-`
//! followed by the magnitude recovered through the ALU.

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::word::{alu, Word8};

/// The output register driving the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputLatch {
    value: Option<Word8>,
}

impl OutputLatch {
    /// Create an empty latch (nothing displayed yet).
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Latch a word.
    pub fn load(&mut self, word: Word8) {
        self.value = Some(word);
    }

    /// The last latched word, if OUT has executed.
    pub fn value(&self) -> Option<Word8> {
        self.value
    }

    /// The display text for the latched word.
    pub fn display(&self) -> Option<SignedDisplay> {
        self.value.map(SignedDisplay)
    }

    /// Clear the latch.
    pub fn clear(&mut self) {
        self.value = None;
    }
}

/// A word rendered as a signed decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedDisplay(pub Word8);

impl SignedDisplay {
    /// The value as a signed integer.
    pub fn to_i16(self) -> i16 {
        if self.0.is_negative() {
            // 0x80 negates to itself, read unsigned as 128
            -(alu::negate(self.0).value() as i16)
        } else {
            self.0.value() as i16
        }
    }
}

impl fmt::Display for SignedDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_negative() {
            write!(f, "-")?;
        }
        write!(f, "{}", alu::magnitude(self.0))
    }
}
