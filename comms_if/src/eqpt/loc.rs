//! # Localisation Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single sample of the robot pose stream (odometry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Frame the pose is expressed in
    pub frame_id: String,

    /// Position of the robot in the frame
    pub position_m: [f64; 3],

    /// Attitude of the robot in the frame, as an `[x, y, z, w]` quaternion
    pub attitude_q: [f64; 4],
}
