//! # Marker Server
//!
//! Publishes the waypoint markers to the visualisation tool.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::viz::MarkerArray,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

use crate::marker::MarkerSink;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Marker server
pub struct MarkerServer {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MarkerServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send markers: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the markers: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MarkerServer {
    /// Create a new instance of the marker server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, MarkerServerError> {
        let socket_options = SocketOptions {
            bind: true,
            ..SocketOptions::client()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.marker_endpoint)
            .map_err(MarkerServerError::SocketError)?;

        Ok(Self { socket })
    }
}

impl MarkerSink for MarkerServer {
    fn publish(&mut self, markers: &MarkerArray) -> Result<(), MarkerServerError> {
        let markers_str =
            serde_json::to_string(markers).map_err(MarkerServerError::SerializationError)?;

        self.socket
            .send(&markers_str, 0)
            .map_err(MarkerServerError::SendError)
    }
}
