//! Binary word primitives.
//!
//! This module provides the value types and arithmetic of the SAP-1 data path:
//! - [`Bit`] - A single binary digit with a full adder
//! - [`Word8`] - An 8-bit word (memory cells, IR, A and B registers)
//! - [`Addr4`] - A 4-bit address (PC and MAR)
//! - [`codec`] - Decimal / binary text / hex text conversions
//! - [`alu`] - The ripple-carry adder/subtractor

mod bit;
mod bits;
pub mod codec;
pub mod alu;

pub use bit::Bit;
pub use bits::{Word8, Addr4, ParseError};
pub use codec::CodecError;
