//! Instruction decoder for the SAP-1.
//!
//! An instruction word holds the opcode in its high nibble and the operand
//! address in its low nibble. Only five of the sixteen opcodes are defined;
//! the rest decode to [`Instruction::Undefined`] and execute as no-ops, so
//! decoding never fails.

use crate::word::{Addr4, Word8};
use serde::{Serialize, Deserialize};

/// Decoded SAP-1 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Load accumulator: A := [addr]
    Lda(Addr4),

    /// Add memory to accumulator: A := A + [addr]
    Add(Addr4),

    /// Subtract memory from accumulator: A := A - [addr]
    Sub(Addr4),

    /// Display the accumulator on the output latch
    Out,

    /// Halt execution
    Hlt,

    /// Any other opcode. Takes a full instruction cycle and does nothing.
    Undefined { opcode: u8, operand: Addr4 },
}

/// Opcode values (high nibble of the instruction word).
#[derive(Debug, Clone, Copy)]
struct Opcode;

impl Opcode {
    const LDA: u8 = 0b0000;
    const ADD: u8 = 0b0001;
    const SUB: u8 = 0b0010;
    const OUT: u8 = 0b1110;
    const HLT: u8 = 0b1111;
}

impl Instruction {
    /// The mnemonic as written in assembly source.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Lda(_) => "LDA",
            Instruction::Add(_) => "ADD",
            Instruction::Sub(_) => "SUB",
            Instruction::Out => "OUT",
            Instruction::Hlt => "HLT",
            Instruction::Undefined { .. } => "???",
        }
    }

    /// The memory operand, for instructions that read memory.
    pub const fn operand(&self) -> Option<Addr4> {
        match self {
            Instruction::Lda(addr) | Instruction::Add(addr) | Instruction::Sub(addr) => Some(*addr),
            _ => None,
        }
    }
}

/// Decode an instruction word.
///
/// OUT and HLT ignore their low nibble.
pub fn decode(word: Word8) -> Instruction {
    let operand = word.low_nibble();

    match word.high_nibble() {
        Opcode::LDA => Instruction::Lda(operand),
        Opcode::ADD => Instruction::Add(operand),
        Opcode::SUB => Instruction::Sub(operand),
        Opcode::OUT => Instruction::Out,
        Opcode::HLT => Instruction::Hlt,
        opcode => Instruction::Undefined { opcode, operand },
    }
}

/// Encode an instruction back to an 8-bit word.
pub fn encode(instr: &Instruction) -> Word8 {
    let (opcode, operand) = match *instr {
        Instruction::Lda(addr) => (Opcode::LDA, addr),
        Instruction::Add(addr) => (Opcode::ADD, addr),
        Instruction::Sub(addr) => (Opcode::SUB, addr),
        Instruction::Out => (Opcode::OUT, Addr4::ZERO),
        Instruction::Hlt => (Opcode::HLT, Addr4::ZERO),
        Instruction::Undefined { opcode, operand } => (opcode, operand),
    };

    Word8::from_nibbles(opcode, operand)
}
