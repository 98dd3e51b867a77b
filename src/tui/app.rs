//! Debugger application state and logic.

use crate::{Cpu, ProgramImage};
use crate::asm::disasm::{disassemble_word, format_instruction};
use crate::cpu::{Phase, PhaseOutcome};
use crate::word::Addr4;
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Loaded image, for reset.
    pub image: ProgramImage,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<Addr4>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Everything OUT has displayed since the last reset.
    pub output: String,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded image.
    pub fn new(image: ProgramImage) -> Self {
        Self {
            cpu: Cpu::with_program(image.words()),
            image,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 'c' to clock, 's' to step, 'r' to run, 'q' to quit.".into(),
            output: String::new(),
        }
    }

    /// Execute a single clock phase.
    pub fn clock(&mut self) {
        let phase = self.cpu.phase();
        if let Some(outcome) = self.clock_once() {
            self.status = match outcome {
                PhaseOutcome::Halted => format!("{}: HLT, halted after {} cycles", phase, self.cpu.cycles),
                _ => format!("{} done", phase),
            };
        }
    }

    /// Finish the current instruction.
    pub fn step(&mut self) {
        let pc = self.cpu.regs.pc;
        let at_boundary = self.cpu.phase() == Phase::Address;
        let before = self.cpu.instructions;

        while self.cpu.is_running() && self.cpu.instructions == before {
            if self.clock_once().is_none() {
                return;
            }
        }

        if let Some(instr) = self.cpu.last_instruction() {
            let text = format_instruction(&instr);
            self.status = if at_boundary {
                format!("PC={:x}: {}", pc.value(), text)
            } else {
                format!("Completed {}", text)
            };
        }
    }

    fn clock_once(&mut self) -> Option<PhaseOutcome> {
        if !self.cpu.is_running() {
            self.status = format!("CPU halted: {:?}", self.cpu.state);
            self.running = false;
            return None;
        }

        match self.cpu.clock() {
            Ok(outcome) => {
                if let PhaseOutcome::Output(_) = outcome {
                    if let Some(display) = self.cpu.out.display() {
                        self.output.push_str(&display.to_string());
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
                None
            }
        }
    }

    /// Run until halt or breakpoint.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Halted after {} cycles", self.cpu.cycles);
            return;
        }

        self.step();

        let pc = self.cpu.regs.pc;
        if self.running && self.cpu.is_running() && self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={:x}", pc.value());
        }
    }

    /// Toggle breakpoint at the current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={:x}", pc.value());
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={:x}", pc.value());
        }
    }

    /// Reload the image and start over.
    pub fn reset(&mut self) {
        self.cpu = Cpu::with_program(self.image.words());
        self.output.clear();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Disassembly of every address, flagged with PC and MAR.
    pub fn get_disassembly(&self) -> Vec<(Addr4, String, bool, bool)> {
        Addr4::all()
            .map(|addr| {
                let word = self.cpu.mem.read(addr);
                (addr, disassemble_word(word), addr == self.cpu.regs.pc, addr == self.cpu.regs.mar)
            })
            .collect()
    }
}

/// Run the debugger with an image.
pub fn run_debugger(image: ProgramImage) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(image);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('c') => {
                            app.running = false;
                            app.clock();
                        }
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assemble;

    fn app(source: &str) -> DebuggerApp {
        DebuggerApp::new(assemble(source).unwrap())
    }

    #[test]
    fn test_clock_moves_one_phase() {
        let mut app = app("LDA 0xf\nHLT\n");
        app.clock();
        assert_eq!(app.cpu.phase(), Phase::Increment);
        assert_eq!(app.cpu.cycles, 1);
    }

    #[test]
    fn test_step_collects_output() {
        let mut app = app("SET 0xf 0xfd\nLDA 0xf\nOUT\nHLT\n");
        app.step();
        app.step();
        assert_eq!(app.output, "-3");
        app.step();
        assert!(app.cpu.is_halted());
        // A halted CPU keeps its registers for inspection
        assert_eq!(app.cpu.regs.a.value(), 0xFD);
    }

    #[test]
    fn test_breakpoint_stops_run() {
        let mut app = app("OUT\nOUT\nOUT\nHLT\n");
        app.cpu.regs.pc = Addr4::new(2);
        app.toggle_breakpoint();
        app.cpu.regs.pc = Addr4::ZERO;

        app.run();
        while app.running {
            app.tick();
        }

        assert_eq!(app.cpu.regs.pc, Addr4::new(2));
        assert!(app.cpu.is_running());
        assert_eq!(app.cpu.instructions, 2);
    }

    #[test]
    fn test_reset_reloads_image() {
        let mut app = app("SET 0xf 0x07\nLDA 0xf\nOUT\nHLT\n");
        app.run();
        while app.running {
            app.tick();
        }
        assert_eq!(app.output, "7");

        app.reset();
        assert!(app.cpu.is_running());
        assert!(app.output.is_empty());
        assert_eq!(app.get_disassembly()[0].1, "LDA 0xf");
    }
}
