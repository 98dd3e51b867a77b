//! CPU execution engine for the SAP-1.
//!
//! The CPU is clocked one timing phase at a time. Each phase performs the
//! micro-operation the control matrix selects for it: the three fetch phases
//! are the same for every instruction, the three execute phases depend on
//! the opcode in the instruction register.

use std::io::Write;
use crate::word::{alu, Word8};
use crate::cpu::{ControlSequencer, Memory, OutputLatch, Phase, Registers};
use crate::cpu::decode::{self, Instruction};
use crate::cpu::output::SignedDisplay;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info, trace};

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed HLT instruction).
    Halted,
}

/// What a single clock phase produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Nothing visible outside the CPU.
    Continue,
    /// OUT latched this word for display.
    Output(Word8),
    /// HLT was decoded; no further phases run.
    Halted,
}

/// The SAP-1 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Ring counter selecting the active phase.
    pub seq: ControlSequencer,
    /// Output register.
    pub out: OutputLatch,
    /// Current execution state.
    pub state: CpuState,
    /// Clock phases executed (T-states).
    pub cycles: u64,
    /// Instructions completed.
    pub instructions: u64,
    /// Last completed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            seq: ControlSequencer::new(),
            out: OutputLatch::new(),
            state: CpuState::Running,
            cycles: 0,
            instructions: 0,
            last_instr: None,
        }
    }

    /// Create a CPU with `program` loaded into memory.
    pub fn with_program(program: &[Word8]) -> Self {
        let mut cpu = Self::new();
        cpu.load_program(program);
        cpu
    }

    /// Load a program image into memory and make the CPU ready to run it.
    pub fn load_program(&mut self, program: &[Word8]) {
        self.mem.load(program);
        self.master_reset();
        self.out.clear();
        self.state = CpuState::Running;
    }

    /// Return every register and the sequencer to their power-on values.
    ///
    /// Memory, the output latch and the counters are left alone.
    pub fn master_reset(&mut self) {
        self.regs.reset();
        self.seq.reset();
        self.last_instr = None;
        debug!("master reset");
    }

    /// Execute the active phase, then advance the sequencer.
    pub fn clock(&mut self) -> Result<PhaseOutcome, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        let phase = self.seq.phase();
        let mut outcome = PhaseOutcome::Continue;

        match phase {
            Phase::Address => {
                self.regs.mar = self.regs.pc;
            }

            Phase::Increment => {
                self.regs.advance_pc();
            }

            Phase::Fetch => {
                self.regs.ir = self.mem.read(self.regs.mar);
            }

            Phase::Exec1 => match decode::decode(self.regs.ir) {
                Instruction::Lda(addr) | Instruction::Add(addr) | Instruction::Sub(addr) => {
                    self.regs.mar = addr;
                }
                Instruction::Out => {
                    self.out.load(self.regs.a);
                    outcome = PhaseOutcome::Output(self.regs.a);
                }
                Instruction::Hlt => {
                    self.cycles += 1;
                    self.complete(Instruction::Hlt);
                    self.state = CpuState::Halted;
                    info!(cycles = self.cycles, instructions = self.instructions, "halted");
                    return Ok(PhaseOutcome::Halted);
                }
                Instruction::Undefined { .. } => {}
            },

            Phase::Exec2 => match decode::decode(self.regs.ir) {
                Instruction::Lda(_) => {
                    self.regs.a = self.mem.read(self.regs.mar);
                }
                Instruction::Add(_) | Instruction::Sub(_) => {
                    self.regs.b = self.mem.read(self.regs.mar);
                }
                _ => {}
            },

            Phase::Exec3 => match decode::decode(self.regs.ir) {
                Instruction::Add(_) => {
                    self.regs.a = alu::add(self.regs.a, self.regs.b, false);
                }
                Instruction::Sub(_) => {
                    self.regs.a = alu::add(self.regs.a, self.regs.b, true);
                }
                _ => {}
            },
        }

        trace!(
            phase = %phase,
            pc = self.regs.pc.value(),
            mar = self.regs.mar.value(),
            ir = %self.regs.ir,
            a = %self.regs.a,
            b = %self.regs.b,
            "clock"
        );

        self.cycles += 1;
        if phase == Phase::Exec3 {
            self.complete(decode::decode(self.regs.ir));
        }
        self.seq.advance();

        Ok(outcome)
    }

    /// Execute the remaining phases of the current instruction.
    ///
    /// Returns the instruction that was completed. Unlike [`Cpu::run`], a
    /// halt reached here does not trigger a master reset, so the registers
    /// can still be inspected.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        loop {
            let phase = self.seq.phase();
            if self.clock()? == PhaseOutcome::Halted || phase == Phase::Exec3 {
                break;
            }
        }

        Ok(decode::decode(self.regs.ir))
    }

    /// Run until HLT, printing OUT values to standard output.
    ///
    /// Returns the number of instructions executed. A program without HLT
    /// never returns.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.run_to(&mut handle)
    }

    /// Run until HLT, writing OUT values to `out`, then master reset.
    pub fn run_to<W: Write>(&mut self, out: &mut W) -> Result<u64, CpuError> {
        self.rearm();
        let start = self.instructions;

        while self.state == CpuState::Running {
            self.clock_to(out)?;
        }

        self.master_reset();
        Ok(self.instructions - start)
    }

    /// Run for at most `max_instructions` whole instructions.
    ///
    /// Returns the number executed. When HLT is reached within the limit the
    /// CPU is halted and master reset, as after [`Cpu::run_to`]; otherwise it
    /// stops on an instruction boundary and can be resumed.
    pub fn run_limited<W: Write>(&mut self, max_instructions: u64, out: &mut W) -> Result<u64, CpuError> {
        self.rearm();
        let start = self.instructions;
        let limit = self.instructions.saturating_add(max_instructions);

        while self.state == CpuState::Running && self.instructions < limit {
            self.clock_to(out)?;
        }

        if self.is_halted() {
            self.master_reset();
        }
        Ok(self.instructions - start)
    }

    /// Clock once, forwarding any display output to `out`.
    fn clock_to<W: Write>(&mut self, out: &mut W) -> Result<(), CpuError> {
        if let PhaseOutcome::Output(word) = self.clock()? {
            write!(out, "{}", SignedDisplay(word))
                .and_then(|_| out.flush())
                .map_err(|e| CpuError::Output(e.to_string()))?;
        }
        Ok(())
    }

    /// A halted machine restarts from address zero.
    fn rearm(&mut self) {
        if self.state == CpuState::Halted {
            self.master_reset();
            self.state = CpuState::Running;
        }
    }

    fn complete(&mut self, instr: Instruction) {
        self.instructions += 1;
        self.last_instr = Some(instr);
        debug!(
            instr = ?instr,
            pc = self.regs.pc.value(),
            a = self.regs.a.value(),
            "instruction complete"
        );
    }

    /// The active clock phase.
    pub fn phase(&self) -> Phase {
        self.seq.phase()
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    /// Capture the visible machine state.
    pub fn snapshot(&self) -> MachineSnapshot {
        let phase = self.phase();
        MachineSnapshot {
            state: self.state,
            phase,
            ring_counter: format!("{:06b}", phase.one_hot()),
            pc: self.regs.pc.value(),
            mar: self.regs.mar.value(),
            ir: self.regs.ir.to_string(),
            a: self.regs.a.value(),
            b: self.regs.b.value(),
            output: self.out.display().map(|d| d.to_string()),
            output_value: self.out.display().map(SignedDisplay::to_i16),
            cycles: self.cycles,
            instructions: self.instructions,
            memory: self.mem.words().iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("phase", &self.seq.phase())
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// A serializable view of the machine, for tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub state: CpuState,
    pub phase: Phase,
    /// One-hot ring counter bits, Exec3 leftmost.
    pub ring_counter: String,
    pub pc: u8,
    pub mar: u8,
    pub ir: String,
    pub a: u8,
    pub b: u8,
    /// Signed decimal text of the output latch.
    pub output: Option<String>,
    /// The output latch as a signed number.
    pub output_value: Option<i16>,
    pub cycles: u64,
    pub instructions: u64,
    pub memory: Vec<String>,
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("output error: {0}")]
    Output(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::encode;
    use crate::word::Addr4;

    fn make_program(instructions: &[Instruction]) -> Vec<Word8> {
        instructions.iter().map(encode).collect()
    }

    fn lda(addr: u8) -> Instruction {
        Instruction::Lda(Addr4::new(addr))
    }

    fn add(addr: u8) -> Instruction {
        Instruction::Add(Addr4::new(addr))
    }

    fn sub(addr: u8) -> Instruction {
        Instruction::Sub(Addr4::new(addr))
    }

    fn run_capture(cpu: &mut Cpu) -> String {
        let mut out = Vec::new();
        cpu.run_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cpu_halt() {
        let mut cpu = Cpu::with_program(&make_program(&[Instruction::Hlt]));

        let executed = cpu.run_to(&mut Vec::<u8>::new()).unwrap();

        assert_eq!(executed, 1);
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_hlt_stops_after_exec1() {
        let mut cpu = Cpu::with_program(&make_program(&[Instruction::Hlt]));

        for _ in 0..3 {
            assert_eq!(cpu.clock().unwrap(), PhaseOutcome::Continue);
        }
        assert_eq!(cpu.phase(), Phase::Exec1);
        assert_eq!(cpu.clock().unwrap(), PhaseOutcome::Halted);
        assert_eq!(cpu.cycles, 4);
        assert!(matches!(cpu.clock(), Err(CpuError::NotRunning(CpuState::Halted))));
    }

    #[test]
    fn test_fetch_micro_operations() {
        let program = make_program(&[add(7)]);
        let mut cpu = Cpu::with_program(&program);

        cpu.clock().unwrap(); // Address
        assert_eq!(cpu.regs.mar, Addr4::ZERO);
        assert_eq!(cpu.regs.pc, Addr4::ZERO);

        cpu.clock().unwrap(); // Increment
        assert_eq!(cpu.regs.pc, Addr4::new(1));
        assert_eq!(cpu.regs.ir, Word8::ZERO);

        cpu.clock().unwrap(); // Fetch
        assert_eq!(cpu.regs.ir, program[0]);

        cpu.clock().unwrap(); // Exec1
        assert_eq!(cpu.regs.mar, Addr4::new(7));
    }

    #[test]
    fn test_cpu_load() {
        let mut program = make_program(&[lda(10), Instruction::Hlt]);
        program.resize(16, Word8::ZERO);
        program[10] = Word8::new(42);

        let mut cpu = Cpu::with_program(&program);
        cpu.step().unwrap();

        assert_eq!(cpu.regs.a.value(), 42);
        assert_eq!(cpu.cycles, 6);
    }

    #[test]
    fn test_cpu_arithmetic() {
        let mut program = make_program(&[lda(10), add(11), sub(12), Instruction::Hlt]);
        program.resize(16, Word8::ZERO);
        program[10] = Word8::new(10);
        program[11] = Word8::new(5);
        program[12] = Word8::new(3);

        let mut cpu = Cpu::with_program(&program);
        assert_eq!(cpu.step().unwrap(), lda(10));
        assert_eq!(cpu.step().unwrap(), add(11));
        assert_eq!(cpu.regs.a.value(), 15);
        assert_eq!(cpu.regs.b.value(), 5);
        assert_eq!(cpu.step().unwrap(), sub(12));
        assert_eq!(cpu.regs.a.value(), 12);
        assert_eq!(cpu.step().unwrap(), Instruction::Hlt);
        assert!(cpu.is_halted());
        // step() does not master reset
        assert_eq!(cpu.regs.a.value(), 12);
    }

    #[test]
    fn test_out_writes_decimal() {
        let mut program = make_program(&[lda(15), Instruction::Out, Instruction::Hlt]);
        program.resize(16, Word8::ZERO);
        program[15] = Word8::new(42);

        let mut cpu = Cpu::with_program(&program);
        assert_eq!(run_capture(&mut cpu), "42");
        assert_eq!(cpu.out.value(), Some(Word8::new(42)));
    }

    #[test]
    fn test_out_negative() {
        let mut program = make_program(&[lda(14), sub(15), Instruction::Out, Instruction::Hlt]);
        program.resize(16, Word8::ZERO);
        program[14] = Word8::new(2);
        program[15] = Word8::new(5);

        let mut cpu = Cpu::with_program(&program);
        assert_eq!(run_capture(&mut cpu), "-3");
    }

    #[test]
    fn test_multiple_outs_have_no_separator() {
        let mut program = make_program(&[
            lda(15), Instruction::Out, add(15), Instruction::Out, Instruction::Hlt,
        ]);
        program.resize(16, Word8::ZERO);
        program[15] = Word8::new(7);

        let mut cpu = Cpu::with_program(&program);
        assert_eq!(run_capture(&mut cpu), "714");
    }

    #[test]
    fn test_master_reset_after_run() {
        let mut program = make_program(&[lda(15), Instruction::Hlt]);
        program.resize(16, Word8::ZERO);
        program[15] = Word8::new(99);

        let mut cpu = Cpu::with_program(&program);
        run_capture(&mut cpu);

        assert_eq!(cpu.regs, Registers::new());
        assert_eq!(cpu.phase(), Phase::Address);
        // Memory is untouched
        assert_eq!(cpu.mem.read(Addr4::new(15)).value(), 99);
        assert_eq!(cpu.mem.read(Addr4::ZERO), encode(&lda(15)));
    }

    #[test]
    fn test_run_again_restarts_program() {
        let mut program = make_program(&[lda(15), Instruction::Out, Instruction::Hlt]);
        program.resize(16, Word8::ZERO);
        program[15] = Word8::new(8);

        let mut cpu = Cpu::with_program(&program);
        assert_eq!(run_capture(&mut cpu), "8");
        assert_eq!(run_capture(&mut cpu), "8");
    }

    #[test]
    fn test_undefined_opcode_is_noop_but_advances() {
        let undefined = Instruction::Undefined { opcode: 0b0101, operand: Addr4::new(3) };
        let mut cpu = Cpu::with_program(&make_program(&[undefined, Instruction::Hlt]));
        cpu.regs.a = Word8::new(9);

        assert_eq!(cpu.step().unwrap(), undefined);
        assert_eq!(cpu.cycles, 6);
        assert_eq!(cpu.regs.pc, Addr4::new(1));
        assert_eq!(cpu.regs.a.value(), 9);
        assert_eq!(cpu.regs.mar, Addr4::ZERO);

        assert_eq!(cpu.step().unwrap(), Instruction::Hlt);
    }

    #[test]
    fn test_zero_image_never_halts() {
        let mut cpu = Cpu::with_program(&[]);
        let mut out = Vec::new();

        let executed = cpu.run_limited(1_000, &mut out).unwrap();

        assert_eq!(executed, 1_000);
        assert!(cpu.is_running());
        assert!(out.is_empty());
        assert_eq!(cpu.cycles, 6_000);
        // 1000 instructions wrap the 16-word address space
        assert_eq!(cpu.regs.pc.value(), (1_000 % 16) as u8);
    }

    #[test]
    fn test_run_limited_accepts_unbounded_limit() {
        // Every word is OUT, so the program never halts
        let mut cpu = Cpu::with_program(&make_program(&[Instruction::Out; 16]));
        cpu.step().unwrap();

        // The failing writer is the only thing that stops the run
        let mut out = FailingWriter;

        let result = cpu.run_limited(u64::MAX, &mut out);

        assert!(matches!(result, Err(CpuError::Output(_))));
        assert!(cpu.is_running());
        assert_eq!(cpu.instructions, 1);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_limited_halts_within_limit() {
        let mut cpu = Cpu::with_program(&make_program(&[lda(0), Instruction::Hlt]));
        let mut out = Vec::new();

        let executed = cpu.run_limited(100, &mut out).unwrap();

        assert_eq!(executed, 2);
        assert!(cpu.is_halted());
        assert_eq!(cpu.regs, Registers::new());
    }

    #[test]
    fn test_snapshot() {
        let mut cpu = Cpu::with_program(&make_program(&[Instruction::Out, Instruction::Hlt]));
        cpu.regs.a = Word8::new(0xFF);
        cpu.step().unwrap();

        let snap = cpu.snapshot();
        assert_eq!(snap.phase, Phase::Address);
        assert_eq!(snap.ring_counter, "000001");
        assert_eq!(snap.pc, 1);
        assert_eq!(snap.output.as_deref(), Some("-1"));
        assert_eq!(snap.output_value, Some(-1));
        assert_eq!(snap.memory.len(), 16);
        assert_eq!(snap.memory[0], "11100000");
    }
}
