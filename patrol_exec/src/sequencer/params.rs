//! # GoalSequencer Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SequencerParams {
    /// What to do when the next target in the cycle has no waypoint.
    pub empty_slot_policy: EmptySlotPolicy,

    /// Number of consecutive unsuccessful goals after which failures are reported as errors
    /// rather than warnings.
    pub nav_failure_warn_limit: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Behaviour of the sequencer when a goal completes and the next target has no waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EmptySlotPolicy {
    /// Go to the next target in the cycle which has a waypoint.
    Skip,

    /// Stay where the robot is until the operator captures a new waypoint.
    Hold,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SequencerParams {
    fn default() -> Self {
        Self {
            empty_slot_policy: EmptySlotPolicy::Skip,
            nav_failure_warn_limit: 3,
        }
    }
}
