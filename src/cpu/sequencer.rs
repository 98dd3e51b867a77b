//! Control sequencer (ring counter).
//!
//! The SAP-1 control unit steps through six timing states, T1 to T6, for
//! every instruction. The first three fetch the instruction and are the same
//! for every opcode; the last three execute it. The counter itself never
//! branches: it rotates through the phases regardless of the opcode.

use std::fmt;
use serde::{Serialize, Deserialize};

/// One timing state of the instruction cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// T1: MAR ← PC
    #[default]
    Address,
    /// T2: PC ← PC + 1
    Increment,
    /// T3: IR ← RAM[MAR]
    Fetch,
    /// T4: first opcode-dependent step
    Exec1,
    /// T5: second opcode-dependent step
    Exec2,
    /// T6: third opcode-dependent step
    Exec3,
}

impl Phase {
    /// Number of phases per instruction.
    pub const COUNT: usize = 6;

    /// All phases in rotation order.
    pub const ALL: [Phase; 6] = [
        Phase::Address,
        Phase::Increment,
        Phase::Fetch,
        Phase::Exec1,
        Phase::Exec2,
        Phase::Exec3,
    ];

    /// The phase that follows this one, wrapping Exec3 back to Address.
    #[inline]
    pub const fn next(self) -> Self {
        match self {
            Phase::Address => Phase::Increment,
            Phase::Increment => Phase::Fetch,
            Phase::Fetch => Phase::Exec1,
            Phase::Exec1 => Phase::Exec2,
            Phase::Exec2 => Phase::Exec3,
            Phase::Exec3 => Phase::Address,
        }
    }

    /// Position in the rotation (Address = 0).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Ring counter output with exactly one bit set (Address = `000001`).
    #[inline]
    pub const fn one_hot(self) -> u8 {
        1 << self.index()
    }

    /// Conventional T-state label, `T1`..`T6`.
    pub const fn t_state(self) -> &'static str {
        match self {
            Phase::Address => "T1",
            Phase::Increment => "T2",
            Phase::Fetch => "T3",
            Phase::Exec1 => "T4",
            Phase::Exec2 => "T5",
            Phase::Exec3 => "T6",
        }
    }

    /// True for the three fetch phases shared by every instruction.
    #[inline]
    pub const fn is_fetch_cycle(self) -> bool {
        matches!(self, Phase::Address | Phase::Increment | Phase::Fetch)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} ({:06b})", self.t_state(), self, self.one_hot())
    }
}

/// The ring counter that drives the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlSequencer {
    phase: Phase,
}

impl ControlSequencer {
    /// Create a sequencer at the Address phase.
    pub const fn new() -> Self {
        Self { phase: Phase::Address }
    }

    /// The active phase.
    #[inline]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to the next phase and return it.
    #[inline]
    pub fn advance(&mut self) -> Phase {
        self.phase = self.phase.next();
        self.phase
    }

    /// Return to the Address phase.
    pub fn reset(&mut self) {
        self.phase = Phase::Address;
    }
}
