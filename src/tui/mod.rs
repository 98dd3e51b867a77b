//! TUI debugger for the SAP-1 emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Phase-by-phase clocking and whole-instruction stepping
//! - Register and ring counter visualization
//! - Memory view with disassembly
//! - Run/breakpoint controls

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
