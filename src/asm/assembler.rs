//! Two-pass assembler for SAP-1 programs.
//!
//! Syntax:
//! ```text
//! ; Comment
//! LDA 0x9         ; Load from address 9
//! ADD 0xa         ; Add the word at address 10
//! SUB 0xb         ; Subtract the word at address 11
//! OUT             ; Display the accumulator
//! HLT             ; Halt
//! SET 0x9 0x1c    ; Store the data word 0x1c at address 9
//! ```
//!
//! Only the first 16 significant lines are assembled. Instructions are
//! placed at consecutive addresses from 0 in source order; `SET` writes its
//! data straight to the given address and does not take a sequential slot.
//! Placement is last-write-wins: nothing stops a later instruction from
//! overwriting a `SET` word, or the reverse.

use crate::asm::image::ProgramImage;
use crate::cpu::decode::{Instruction, encode};
use crate::cpu::memory::MEMORY_SIZE;
use crate::word::{codec, Addr4, CodecError, Word8};
use thiserror::Error;
use tracing::debug;

/// Assemble source code to a program image.
pub fn assemble(source: &str) -> Result<ProgramImage, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// One parsed source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    /// An instruction occupying the next sequential slot.
    Instruction(Instruction),
    /// `SET addr data`: a raw data word at an explicit address.
    Set { addr: Addr4, data: Word8 },
}

/// The assembler state.
struct Assembler {
    /// Parsed statements with their source line numbers.
    statements: Vec<(usize, Statement)>,
    /// Next free sequential slot.
    next_slot: usize,
    /// Output image.
    output: ProgramImage,
}

impl Assembler {
    fn new() -> Self {
        Self {
            statements: Vec::new(),
            next_slot: 0,
            output: ProgramImage::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<ProgramImage, AssemblerError> {
        // Pass 1: Tokenize and resolve opcodes
        let significant = source
            .lines()
            .enumerate()
            .filter(|(_, line)| is_significant(line))
            .take(MEMORY_SIZE);

        for (line_num, line) in significant {
            let statement = parse_line(line, line_num + 1)?;
            self.statements.push((line_num + 1, statement));
        }

        // Pass 2: Emit the image
        for (line_num, statement) in std::mem::take(&mut self.statements) {
            self.emit(statement, line_num);
        }

        Ok(self.output)
    }

    fn emit(&mut self, statement: Statement, line_num: usize) {
        match statement {
            Statement::Instruction(instr) => {
                let addr = Addr4::new(self.next_slot as u8);
                debug!(line = line_num, addr = addr.value(), ?instr, "place instruction");
                self.output.set(addr, encode(&instr));
                self.next_slot += 1;
            }
            Statement::Set { addr, data } => {
                debug!(line = line_num, addr = addr.value(), data = data.value(), "set data");
                self.output.set(addr, data);
            }
        }
    }
}

/// Blank lines and lines starting with `;` are skipped entirely.
fn is_significant(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';')
}

/// Parse a single significant line.
pub fn parse_line(line: &str, line_num: usize) -> Result<Statement, AssemblerError> {
    // Remove inline comments
    let line = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };

    let mut tokens = line.split_whitespace();
    let mnemonic = tokens.next().unwrap_or_default();

    let mut operand = |what: &'static str| -> Result<u32, AssemblerError> {
        let token = tokens.next().ok_or_else(|| AssemblerError::MissingOperand {
            line: line_num,
            mnemonic: mnemonic.to_string(),
            operand: what,
        })?;
        parse_literal(token, line_num)
    };

    let statement = match mnemonic {
        "LDA" => Statement::Instruction(Instruction::Lda(address(operand("address")?))),
        "ADD" => Statement::Instruction(Instruction::Add(address(operand("address")?))),
        "SUB" => Statement::Instruction(Instruction::Sub(address(operand("address")?))),
        "OUT" => Statement::Instruction(Instruction::Out),
        "HLT" => Statement::Instruction(Instruction::Hlt),
        "SET" => {
            let addr = address(operand("address")?);
            let data = Word8::from_u32_masked(operand("data")?);
            Statement::Set { addr, data }
        }
        _ => return Err(AssemblerError::UnknownOpcode {
            line: line_num,
            mnemonic: mnemonic.to_string(),
        }),
    };

    Ok(statement)
}

fn address(value: u32) -> Addr4 {
    Addr4::new((value & 0x0F) as u8)
}

/// Decode a hex literal such as `0xa`: the two-character prefix is
/// dropped and the remaining digits are read as base 16.
fn parse_literal(token: &str, line_num: usize) -> Result<u32, AssemblerError> {
    // Characters, not bytes
    let digits = token.char_indices().nth(2).map_or("", |(i, _)| &token[i..]);

    codec::hex_digits_to_decimal(digits).map_err(|e| match e {
        CodecError::InvalidHexDigit(digit) => AssemblerError::InvalidHexDigit {
            line: line_num,
            digit,
            literal: token.to_string(),
        },
        other => AssemblerError::MalformedLiteral {
            line: line_num,
            literal: token.to_string(),
            reason: other.to_string(),
        },
    })
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("unknown opcode on line {line}: {mnemonic}")]
    UnknownOpcode { line: usize, mnemonic: String },

    #[error("invalid hex digit '{digit}' in {literal} on line {line}")]
    InvalidHexDigit { line: usize, digit: char, literal: String },

    #[error("{mnemonic} on line {line} is missing its {operand} operand")]
    MissingOperand { line: usize, mnemonic: String, operand: &'static str },

    #[error("malformed literal {literal} on line {line}: {reason}")]
    MalformedLiteral { line: usize, literal: String, reason: String },
}

impl AssemblerError {
    /// The 1-based source line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            AssemblerError::UnknownOpcode { line, .. }
            | AssemblerError::InvalidHexDigit { line, .. }
            | AssemblerError::MissingOperand { line, .. }
            | AssemblerError::MalformedLiteral { line, .. } => *line,
        }
    }
}
