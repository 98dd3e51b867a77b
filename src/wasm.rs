//! WebAssembly bindings for the SAP-1 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::{Addr4, Cpu, ProgramImage, Word8};
use crate::asm::assembler::assemble;
use crate::asm::disasm::{disassemble_word, format_instruction};
use crate::cpu::PhaseOutcome;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    image: ProgramImage,
    output: String,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance with zeroed memory.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            image: ProgramImage::new(),
            output: String::new(),
        }
    }

    /// Load a program from assembly source code.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<(), JsError> {
        let image = assemble(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load(image);
        Ok(())
    }

    /// Load a program from binary image text.
    #[wasm_bindgen]
    pub fn load_image(&mut self, text: &str) -> Result<(), JsError> {
        let image = ProgramImage::parse(text)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load(image);
        Ok(())
    }

    /// Execute one clock phase. Returns true while the CPU is running.
    #[wasm_bindgen]
    pub fn clock(&mut self) -> Result<bool, JsError> {
        let outcome = self.cpu.clock()
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.record(outcome);
        Ok(self.cpu.is_running())
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.cpu.is_running() {
            return Err(JsError::new("CPU is halted"));
        }

        let before = self.cpu.instructions;
        while self.cpu.is_running() && self.cpu.instructions == before {
            self.clock()?;
        }

        Ok(self.cpu.last_instruction().map(|i| format_instruction(&i)).unwrap_or_default())
    }

    /// Run until halt or `max_instructions`. Returns the total cycle count.
    ///
    /// Registers are left as they are on halt, for inspection.
    #[wasm_bindgen]
    pub fn run(&mut self, max_instructions: u32) -> Result<u64, JsError> {
        let limit = self.cpu.instructions.saturating_add(max_instructions as u64);
        while self.cpu.is_running() && self.cpu.instructions < limit {
            self.clock()?;
        }
        Ok(self.cpu.cycles)
    }

    /// Reload the current image and clear the output.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu = Cpu::with_program(self.image.words());
        self.output.clear();
    }

    /// Check if CPU is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Check if CPU is halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> u8 {
        self.cpu.regs.pc.value()
    }

    /// Get the A register.
    #[wasm_bindgen]
    pub fn accumulator(&self) -> u8 {
        self.cpu.regs.a.value()
    }

    /// Get the A register as a bit string.
    #[wasm_bindgen]
    pub fn accumulator_binary(&self) -> String {
        self.cpu.regs.a.to_string()
    }

    /// Get the active phase, e.g. `T4 Exec1 (001000)`.
    #[wasm_bindgen]
    pub fn phase(&self) -> String {
        self.cpu.phase().to_string()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    /// Get memory word at address (0-15).
    #[wasm_bindgen]
    pub fn memory_at(&self, addr: u8) -> u8 {
        match Addr4::try_from(addr) {
            Ok(addr) => self.cpu.mem.read(addr).value(),
            Err(_) => 0,
        }
    }

    /// Get all 16 memory words.
    #[wasm_bindgen]
    pub fn memory_all(&self) -> js_sys::Uint8Array {
        let bytes: Vec<u8> = self.cpu.mem.words().iter().map(|w| w.value()).collect();
        js_sys::Uint8Array::from(&bytes[..])
    }

    /// Everything OUT has displayed since the last reset.
    #[wasm_bindgen]
    pub fn output(&self) -> String {
        self.output.clone()
    }

    /// Get the full machine state as JSON.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu.snapshot())
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl WasmCpu {
    fn load(&mut self, image: ProgramImage) {
        self.image = image;
        self.reset();
    }

    fn record(&mut self, outcome: PhaseOutcome) {
        if let PhaseOutcome::Output(_) = outcome {
            if let Some(display) = self.cpu.out.display() {
                self.output.push_str(&display.to_string());
            }
        }
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code to binary image text.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<String, JsError> {
    let image = assemble(source)
        .map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(image.to_text())
}

/// Disassemble a single 8-bit word.
#[wasm_bindgen]
pub fn wasm_disassemble(value: u8) -> String {
    disassemble_word(Word8::new(value))
}
