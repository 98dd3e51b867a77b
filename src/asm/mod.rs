//! Assembler and disassembler for SAP-1 programs.
//!
//! This module provides:
//! - A two-pass assembler (text → 16-word program image)
//! - The binary image text format
//! - A disassembler (image → readable text)

pub mod assembler;
pub mod disasm;
pub mod image;

pub use assembler::{assemble, AssemblerError, Statement};
pub use disasm::disassemble;
pub use image::{ProgramImage, ImageError, load_image, save_image};
