//! # Waypoint markers
//!
//! Projects the contents of the [`WaypointStore`] into a set of markers for the operator's
//! visualisation tool. One marker is drawn per filled slot, raised above the waypoint so it does
//! not hide it. The full set is published each time, replacing the previous one.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::viz::{Marker, MarkerArray, MarkerKind};
use log::{trace, warn};
use serde::Deserialize;

use crate::{marker_server::MarkerServerError, waypoint::WaypointStore};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Destination of published markers.
pub trait MarkerSink {
    fn publish(&mut self, markers: &MarkerArray) -> Result<(), MarkerServerError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Styling of the waypoint markers.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerParams {
    /// Namespace all markers are published in
    pub ns: String,

    /// Height above the waypoint at which the marker is drawn
    pub vertical_offset_m: f64,

    /// Marker scale, for an arrow this is `[length, width, height]`
    pub scale: [f64; 3],

    /// Marker colour, `[r, g, b, a]`
    pub colour_rgba: [f32; 4],

    /// Marker orientation as an `[x, y, z, w]` quaternion
    pub orientation_q: [f64; 4],
}

/// Keeps the visualisation in step with the waypoint store.
pub struct MarkerAdapter<S> {
    params: MarkerParams,
    sink: S,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MarkerParams {
    /// Green arrows pointing down onto the waypoint from one metre above it.
    fn default() -> Self {
        Self {
            ns: String::from("bus_stops"),
            vertical_offset_m: 1.0,
            scale: [1.0, 0.2, 0.2],
            colour_rgba: [0.0, 1.0, 0.0, 1.0],
            orientation_q: [0.0, 0.7071, 0.0, 0.7071],
        }
    }
}

impl<S: MarkerSink> MarkerAdapter<S> {
    pub fn new(params: MarkerParams, sink: S) -> Self {
        Self { params, sink }
    }

    /// Build the marker set for the current contents of the store.
    pub fn project(&self, store: &WaypointStore) -> MarkerArray {
        let markers = store
            .filled_slots()
            .map(|(slot, wp)| Marker {
                id: slot.marker_id(),
                ns: self.params.ns.clone(),
                frame_id: wp.frame_id.clone(),
                kind: MarkerKind::Arrow,
                position_m: [
                    wp.position_m.x,
                    wp.position_m.y,
                    wp.position_m.z + self.params.vertical_offset_m,
                ],
                orientation_q: self.params.orientation_q,
                scale: self.params.scale,
                colour_rgba: self.params.colour_rgba,
            })
            .collect();

        MarkerArray { markers }
    }

    /// Publish the markers for the current contents of the store.
    ///
    /// Failing to publish is not fatal, the next refresh publishes the full set again.
    pub fn refresh(&mut self, store: &WaypointStore) {
        let markers = self.project(store);

        match self.sink.publish(&markers) {
            Ok(()) => trace!("Published {} markers", markers.markers.len()),
            Err(e) => warn!("Could not publish waypoint markers: {}", e),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
