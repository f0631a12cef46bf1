//! # Navigation Client
//!
//! The navigation client sends goals to the external navigation service and receives the terminal
//! result of each goal. Only one goal is outstanding at a time: sending a new goal supersedes the
//! previous one, whose result (if the service still sends it) is discarded by the socket.
//!
//! The client never retries a goal, it is a direct pass-through to the service.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::nav::{NavGoal, NavResult},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};
use log::trace;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The asynchronous "send goal / notify on completion" contract of a navigation service.
pub trait NavAdapter {
    /// Send a goal, preempting any goal already in progress.
    fn send_goal(&mut self, goal: &NavGoal) -> Result<(), NavClientError>;

    /// Get the result of the outstanding goal, or `Ok(None)` if it hasn't finished yet or no goal
    /// is outstanding.
    fn poll_result(&mut self) -> Result<Option<NavResult>, NavClientError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The navigation client
pub struct NavClient {
    /// Request-response socket, one request per goal and one response per result
    reqrep: MonitoredSocket,

    /// True if waiting for a result on reqrep.
    awaiting_result: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NavClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the navigation service")]
    NotConnected,

    #[error("Could not send the goal to the navigation service: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message from the navigation service: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the goal: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the result from the navigation service: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The navigation service responded with a message which was not valid UTF-8")]
    NonUtf8Response,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavClient {
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, NavClientError> {
        // Relaxed so a new goal can be sent before the last one's result arrives, correlated so
        // that the superseded result is dropped
        let reqrep_opts = SocketOptions {
            req_correlate: true,
            req_relaxed: true,
            ..SocketOptions::client()
        };

        let reqrep = MonitoredSocket::new(ctx, zmq::REQ, reqrep_opts, &params.nav_endpoint)
            .map_err(NavClientError::SocketError)?;

        Ok(Self {
            reqrep,
            awaiting_result: false,
        })
    }

    /// Check if the client is connected to the navigation service
    pub fn is_connected(&self) -> bool {
        self.reqrep.connected()
    }
}

impl NavAdapter for NavClient {
    fn send_goal(&mut self, goal: &NavGoal) -> Result<(), NavClientError> {
        if !self.reqrep.connected() {
            return Err(NavClientError::NotConnected);
        }

        let goal_str = serde_json::to_string(goal).map_err(NavClientError::SerializationError)?;

        self.reqrep
            .send(&goal_str, 0)
            .map_err(NavClientError::SendError)?;

        trace!("Goal {} sent to navigation service", goal.goal_id);

        self.awaiting_result = true;

        Ok(())
    }

    fn poll_result(&mut self) -> Result<Option<NavResult>, NavClientError> {
        if !self.awaiting_result {
            return Ok(None);
        }

        let result_str = match self.reqrep.recv_string(0) {
            // Valid response
            Ok(Ok(s)) => s,
            // Invalid response, the request is still consumed
            Ok(Err(_)) => {
                self.awaiting_result = false;
                return Err(NavClientError::NonUtf8Response);
            }
            // No response yet
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(NavClientError::RecvError(e)),
        };

        self.awaiting_result = false;

        serde_json::from_str(&result_str)
            .map(Some)
            .map_err(NavClientError::DeserializeError)
    }
}

#[cfg(test)]
mod test {
    use comms_if::eqpt::nav::IDENTITY_Q;

    use super::*;

    /// Params pointing the client at a port nothing listens on.
    fn unreachable_params() -> NetParams {
        NetParams {
            pose_endpoint: String::from("tcp://localhost:45001"),
            click_endpoint: String::from("tcp://localhost:45002"),
            nav_endpoint: String::from("tcp://localhost:45003"),
            marker_endpoint: String::from("tcp://*:45004"),
        }
    }

    #[test]
    fn test_send_without_service() {
        let ctx = zmq::Context::new();
        let mut client = NavClient::new(&ctx, &unreachable_params()).unwrap();

        assert!(!client.is_connected());

        let goal = NavGoal {
            goal_id: 0,
            frame_id: String::from("map"),
            position_m: [1.0, 0.0, 0.0],
            orientation_q: IDENTITY_Q,
        };

        assert!(matches!(
            client.send_goal(&goal),
            Err(NavClientError::NotConnected)
        ));

        // The failed send leaves nothing outstanding
        assert!(!client.awaiting_result);
        assert!(matches!(client.poll_result(), Ok(None)));
    }

    #[test]
    fn test_poll_without_goal() {
        let ctx = zmq::Context::new();
        let mut client = NavClient::new(&ctx, &unreachable_params()).unwrap();

        for _ in 0..3 {
            assert!(matches!(client.poll_result(), Ok(None)));
        }
    }
}
