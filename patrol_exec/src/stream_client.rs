//! # Stream Client
//!
//! A stream client subscribes to one of the publisher-subscriber streams feeding the patrol (the
//! robot pose or the operator's clicked points) and forwards every sample to the main loop as a
//! [`PatrolEvent`].
//!
//! Samples are received on a background thread and pushed into a channel, so that the main loop
//! remains the only place the patrol state is modified and events are handled in arrival order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread::{self, JoinHandle},
};

use comms_if::net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;

use crate::patrol::PatrolEvent;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct StreamClient {
    name: &'static str,
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StreamClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not start the background thread: {0}")]
    ThreadError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StreamClient {
    /// Subscribe to the stream published on `endpoint`.
    ///
    /// Each message is deserialised as a `T` and converted into an event with `to_event` before
    /// being sent on `events`. The client stops when dropped or when the receiving end of `events`
    /// is closed.
    pub fn new<T, F>(
        ctx: &zmq::Context,
        name: &'static str,
        endpoint: &str,
        events: Sender<PatrolEvent>,
        to_event: F,
    ) -> Result<Self, StreamClientError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> PatrolEvent + Send + 'static,
    {
        let socket_options = SocketOptions {
            subscribe: vec![Vec::new()],
            ..SocketOptions::client()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, endpoint)
            .map_err(StreamClientError::SocketError)?;

        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();

        let bg_jh = thread::Builder::new()
            .name(format!("{}_client", name))
            .spawn(move || bg_thread(name, socket, bg_run_clone, events, to_event))
            .map_err(StreamClientError::ThreadError)?;

        Ok(Self {
            name,
            bg_jh: Some(bg_jh),
            bg_run,
        })
    }

    /// True while the background thread is receiving samples.
    pub fn is_running(&self) -> bool {
        self.bg_run.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        self.name
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                error!("The {} client background thread panicked", self.name);
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, forwards every sample published on the socket to the event channel.
fn bg_thread<T, F>(
    name: &str,
    socket: MonitoredSocket,
    run: Arc<AtomicBool>,
    events: Sender<PatrolEvent>,
    to_event: F,
) where
    T: DeserializeOwned,
    F: Fn(T) -> PatrolEvent,
{
    while run.load(Ordering::Relaxed) {
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message on the {} stream", name);
                continue;
            }
            Err(e) if is_transient(e) => continue,
            Err(e) => {
                error!("Error receiving message on the {} stream: {}", name, e);
                break;
            }
        };

        let sample: T = match serde_json::from_str(&msg) {
            Ok(s) => s,
            Err(e) => {
                warn!("Error deserialising message on the {} stream: {}", name, e);
                continue;
            }
        };

        if events.send(to_event(sample)).is_err() {
            debug!("Event channel closed, stopping the {} client", name);
            break;
        }
    }

    run.store(false, Ordering::Relaxed);
}

/// Receive errors after which the stream keeps going: timeouts and interrupted calls.
fn is_transient(e: zmq::Error) -> bool {
    matches!(e, zmq::Error::EAGAIN | zmq::Error::EINTR)
}
