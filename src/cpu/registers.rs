//! SAP-1 CPU registers.
//!
//! The SAP-1 has five registers on its bus:
//! - PC: 4-bit program counter
//! - MAR: 4-bit memory address register
//! - IR: 8-bit instruction register
//! - A: 8-bit accumulator
//! - B: 8-bit operand register feeding the adder
//!
//! The output latch is modelled separately in [`crate::cpu::output`].

use crate::word::{Addr4, Word8};
use serde::{Serialize, Deserialize};

/// The SAP-1 register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// PC: address of the next instruction
    pub pc: Addr4,

    /// MAR: address presented to memory
    pub mar: Addr4,

    /// IR: the instruction being executed
    pub ir: Word8,

    /// A: accumulator
    pub a: Word8,

    /// B: second adder input
    pub b: Word8,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Increment the program counter by 1, wrapping from 15 to 0.
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> Addr4 {
        let old = self.pc;
        self.pc = self.pc.wrapping_next();
        old
    }
}
