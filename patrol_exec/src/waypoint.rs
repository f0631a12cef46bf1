//! # Waypoints and the waypoint store
//!
//! The store holds three named slots populated by operator clicks, and the home pose latched from
//! the pose stream. Clicks are written round-robin into the slots, so the slots always hold the
//! three most recently clicked points, the oldest being overwritten first.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use comms_if::eqpt::{
    loc::PoseSample,
    nav::{NavGoal, IDENTITY_Q},
    viz::ClickedPoint,
};
use nalgebra::Vector3;

use crate::home::HomeCapture;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of operator slots in the store.
pub const NUM_SLOTS: usize = 3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A target position the robot should reach.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Frame the position is expressed in
    pub frame_id: String,

    /// Position in the frame
    pub position_m: Vector3<f64>,
}

/// Holder of the operator waypoints and the home pose.
#[derive(Debug, Default)]
pub struct WaypointStore {
    slots: [Option<Waypoint>; NUM_SLOTS],

    /// Number of captures made so far. Only `filled_count % 3` matters for slot selection.
    filled_count: u64,

    home: HomeCapture,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identity of an operator slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    A,
    B,
    C,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Waypoint {
    pub fn new(frame_id: &str, x: f64, y: f64, z: f64) -> Self {
        Self {
            frame_id: frame_id.to_string(),
            position_m: Vector3::new(x, y, z),
        }
    }

    /// Build the navigation goal driving the robot to this waypoint.
    pub fn to_nav_goal(&self, goal_id: u64) -> NavGoal {
        NavGoal {
            goal_id,
            frame_id: self.frame_id.clone(),
            position_m: [self.position_m.x, self.position_m.y, self.position_m.z],
            orientation_q: IDENTITY_Q,
        }
    }
}

impl From<ClickedPoint> for Waypoint {
    fn from(point: ClickedPoint) -> Self {
        Self {
            frame_id: point.frame_id,
            position_m: Vector3::new(point.position_m[0], point.position_m[1], point.position_m[2]),
        }
    }
}

impl From<PoseSample> for Waypoint {
    /// The attitude of the sample is discarded.
    fn from(pose: PoseSample) -> Self {
        Self {
            frame_id: pose.frame_id,
            position_m: Vector3::new(pose.position_m[0], pose.position_m[1], pose.position_m[2]),
        }
    }
}

impl Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}) in \"{}\"",
            self.position_m.x, self.position_m.y, self.position_m.z, self.frame_id
        )
    }
}

impl SlotId {
    /// All slots in order.
    pub const ALL: [SlotId; NUM_SLOTS] = [SlotId::A, SlotId::B, SlotId::C];

    /// Stable marker identity of the slot.
    pub fn marker_id(&self) -> u32 {
        self.index() as u32
    }

    fn index(&self) -> usize {
        match self {
            SlotId::A => 0,
            SlotId::B => 1,
            SlotId::C => 2,
        }
    }
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a new waypoint, overwriting the slot selected by the number of previous captures.
    ///
    /// Returns the slot that was written. No validation is performed on the waypoint.
    pub fn capture(&mut self, point: Waypoint) -> SlotId {
        let slot = match self.filled_count % NUM_SLOTS as u64 {
            0 => SlotId::A,
            1 => SlotId::B,
            _ => SlotId::C,
        };

        self.slots[slot.index()] = Some(point);
        self.filled_count += 1;

        slot
    }

    /// Get the contents of a slot, or `None` if it has never been written.
    pub fn get(&self, slot: SlotId) -> Option<&Waypoint> {
        self.slots[slot.index()].as_ref()
    }

    /// Total number of captures made.
    pub fn filled_count(&self) -> u64 {
        self.filled_count
    }

    /// Iterate over the slots holding data, in A, B, C order.
    pub fn filled_slots(&self) -> impl Iterator<Item = (SlotId, &Waypoint)> {
        SlotId::ALL
            .iter()
            .filter_map(move |&s| self.get(s).map(|wp| (s, wp)))
    }

    pub fn home(&self) -> &HomeCapture {
        &self.home
    }

    pub fn home_mut(&mut self) -> &mut HomeCapture {
        &mut self.home
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotId::A => write!(f, "slot A"),
            SlotId::B => write!(f, "slot B"),
            SlotId::C => write!(f, "slot C"),
        }
    }
}
