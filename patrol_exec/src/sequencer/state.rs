//! # Sequence states
//!
//! The patrol visits slot A, slot B, slot C and then home, and starts over.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use crate::waypoint::{SlotId, Waypoint, WaypointStore};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Position in the patrol cycle: the target which will be dispatched on the next goal completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    AwaitingA,
    AwaitingB,
    AwaitingC,
    AwaitingHome,
}

/// The waypoint a state targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Slot(SlotId),
    Home,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SequenceState {
    fn default() -> Self {
        SequenceState::AwaitingA
    }
}

impl SequenceState {
    /// Number of states in one patrol cycle.
    pub const CYCLE_LEN: usize = 4;

    /// The state following this one in the cycle.
    pub fn next(self) -> Self {
        match self {
            SequenceState::AwaitingA => SequenceState::AwaitingB,
            SequenceState::AwaitingB => SequenceState::AwaitingC,
            SequenceState::AwaitingC => SequenceState::AwaitingHome,
            SequenceState::AwaitingHome => SequenceState::AwaitingA,
        }
    }

    pub fn target(self) -> Target {
        match self {
            SequenceState::AwaitingA => Target::Slot(SlotId::A),
            SequenceState::AwaitingB => Target::Slot(SlotId::B),
            SequenceState::AwaitingC => Target::Slot(SlotId::C),
            SequenceState::AwaitingHome => Target::Home,
        }
    }

    /// Look up the waypoint targeted by this state, `None` if it has no data.
    pub fn waypoint(self, store: &WaypointStore) -> Option<&Waypoint> {
        match self.target() {
            Target::Slot(slot) => store.get(slot),
            Target::Home => store.home().get(),
        }
    }
}

impl Display for SequenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceState::AwaitingA => write!(f, "SequenceState::AwaitingA"),
            SequenceState::AwaitingB => write!(f, "SequenceState::AwaitingB"),
            SequenceState::AwaitingC => write!(f, "SequenceState::AwaitingC"),
            SequenceState::AwaitingHome => write!(f, "SequenceState::AwaitingHome"),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Slot(slot) => write!(f, "{}", slot),
            Target::Home => write!(f, "home"),
        }
    }
}
