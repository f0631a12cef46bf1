//! # Visualisation Communications Module
//!
//! Clicked points come from the operator's visualisation tool, markers are drawn by it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point clicked by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickedPoint {
    /// Frame the point is expressed in
    pub frame_id: String,

    /// Position of the point in the frame
    pub position_m: [f64; 3],
}

/// A single pose marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Identity of the marker within its namespace. Drawing a marker with an existing `(ns, id)`
    /// replaces the old one.
    pub id: u32,

    /// Namespace of the marker
    pub ns: String,

    /// Frame the marker is expressed in
    pub frame_id: String,

    /// Shape of the marker
    pub kind: MarkerKind,

    /// Position of the marker
    pub position_m: [f64; 3],

    /// Orientation of the marker as an `[x, y, z, w]` quaternion
    pub orientation_q: [f64; 4],

    /// Size of the marker along each of its axes
    pub scale: [f64; 3],

    /// Colour of the marker, `[r, g, b, a]` in the range 0 to 1
    pub colour_rgba: [f32; 4],
}

/// The complete set of markers to display, replacing any previously published set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    Arrow,
}
