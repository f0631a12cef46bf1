//! # Navigation Service Communications Module
//!
//! The navigation service accepts one goal at a time. Sending a new goal while one is active
//! preempts the active goal. Every goal the service accepts finishes with exactly one
//! [`NavResult`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Identity `[x, y, z, w]` quaternion, the orientation of every goal.
pub const IDENTITY_Q: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A goal sent to the navigation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavGoal {
    /// Identifier of the goal, echoed back in the [`NavResult`]
    pub goal_id: u64,

    /// Frame the target is expressed in
    pub frame_id: String,

    /// Target position in the frame
    pub position_m: [f64; 3],

    /// Target orientation as an `[x, y, z, w]` quaternion
    pub orientation_q: [f64; 4],
}

/// The terminal result of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavResult {
    /// Identifier of the goal this result is for
    pub goal_id: u64,

    /// Terminal status of the goal
    pub status: NavGoalStatus,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Terminal status of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavGoalStatus {
    /// The target was reached
    Succeeded,

    /// The service gave up on the goal while executing it
    Aborted,

    /// The goal was replaced by a newer goal
    Preempted,

    /// The service refused the goal without executing it
    Rejected,

    /// The service lost track of the goal
    Lost,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavGoalStatus {
    /// True if the goal reached its target.
    pub fn is_success(&self) -> bool {
        matches!(self, NavGoalStatus::Succeeded)
    }
}
