//! CPU emulation for the SAP-1 computer.
//!
//! This module implements the SAP-1 architecture:
//! - 16 eight-bit memory cells
//! - 5 registers: PC, MAR, IR, A (accumulator), B
//! - A six-phase ring counter driving fetch and execute
//! - 5-instruction set: LDA, ADD, SUB, OUT, HLT

pub mod memory;
pub mod registers;
pub mod sequencer;
pub mod decode;
pub mod output;
pub mod execute;

pub use memory::Memory;
pub use registers::Registers;
pub use sequencer::{ControlSequencer, Phase};
pub use decode::Instruction;
pub use output::{OutputLatch, SignedDisplay};
pub use execute::{Cpu, CpuError, CpuState, MachineSnapshot, PhaseOutcome};
