//! Disassembler for SAP-1 program images.
//!
//! Code and data share memory, so every word is shown both as the
//! instruction it would decode to and as raw bits.

use crate::asm::image::ProgramImage;
use crate::cpu::decode::{decode, Instruction};
use crate::word::{codec, Addr4, Word8};

/// Disassemble a single word to text.
pub fn disassemble_word(word: Word8) -> String {
    format_instruction(&decode(word))
}

/// Disassemble a whole image, one line per address.
pub fn disassemble(image: &ProgramImage) -> String {
    let mut output = String::new();
    output.push_str("; SAP-1 Disassembly\n");
    output.push_str("; -----------------\n\n");

    for addr in Addr4::all() {
        let word = image.get(addr);
        let line = disassemble_word(word);
        output.push_str(&format!("0x{}: {:<12} ; {} = {}\n", codec::hex_digit(addr.value()), line, word, word.value()));
    }

    output
}

/// Format a decoded instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    match (instr, instr.operand()) {
        (Instruction::Undefined { opcode, operand }, _) => {
            format!("{} 0x{}{}", instr.mnemonic(), codec::hex_digit(*opcode), codec::hex_digit(operand.value()))
        }
        (_, Some(addr)) => format!("{} {}", instr.mnemonic(), format_address(addr)),
        (_, None) => instr.mnemonic().to_string(),
    }
}

/// Format an address operand the way the assembler reads it.
fn format_address(addr: Addr4) -> String {
    format!("0x{}", codec::hex_digit(addr.value()))
}
