//! # SAP-1 Emulator
//!
//! A cycle-accurate emulator and assembler for the SAP-1
//! ("Simple-As-Possible") 8-bit computer described by Malvino and Brown.
//!
//! The CPU is driven by a six-phase ring counter and reproduces every
//! fetch and execute micro-operation, including subtraction through the
//! adder in two's complement.

pub mod word;
pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use word::{Bit, Word8, Addr4};
pub use cpu::{Cpu, CpuState, CpuError, Memory, Registers, Instruction, Phase, ControlSequencer};
pub use asm::{assemble, disassemble, AssemblerError, ProgramImage, ImageError, load_image, save_image};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
