//! Main patrol executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise the network clients
//!     - Main loop:
//!         - Collect the clicked points and poses received since the last cycle
//!         - Poll the navigation service for the result of the goal in flight
//!         - Handle every event in the order it arrived
//!
//! All patrol state is owned by the main loop. The stream clients receive on their own threads
//! and hand their samples over through a channel.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::net::{zmq, NetParams};
use patrol_lib::{
    marker::MarkerAdapter,
    marker_server::MarkerServer,
    nav_client::NavClient,
    params::PatrolParams,
    patrol::{Patrol, PatrolEvent},
    stream_client::StreamClient,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let session = Session::new("patrol_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Patrol Executable\n");
    info!(
        "Running on: {}",
        host::get_hostname().unwrap_or_else(|| String::from("unknown host"))
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let patrol_params: PatrolParams =
        util::params::load("patrol.toml").wrap_err("Could not load patrol params")?;

    info!("Exec parameters loaded");
    info!(
        "Empty slot policy: {:?}",
        patrol_params.sequencer.empty_slot_policy
    );

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = zmq::Context::new();

    let nav_client = {
        let c = NavClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise the NavClient")?;
        info!(
            "NavClient initialised, navigation service {}",
            connection_state(c.is_connected())
        );
        c
    };

    let marker_server = {
        let s = MarkerServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise the MarkerServer")?;
        info!("MarkerServer initialised");
        s
    };

    let (event_tx, event_rx) = mpsc::channel();

    let pose_client = {
        let c = StreamClient::new(
            &zmq_ctx,
            "pose",
            &net_params.pose_endpoint,
            event_tx.clone(),
            PatrolEvent::Pose,
        )
        .wrap_err("Failed to initialise the pose client")?;
        info!("Pose client initialised");
        c
    };

    let click_client = {
        let c = StreamClient::new(
            &zmq_ctx,
            "click",
            &net_params.click_endpoint,
            event_tx,
            PatrolEvent::Click,
        )
        .wrap_err("Failed to initialise the click client")?;
        info!("Click client initialised");
        c
    };

    let stream_clients = [pose_client, click_client];

    info!("Network initialisation complete");

    // ---- INITIALISE PATROL ----

    let cycle_period = Duration::from_secs_f64(patrol_params.cycle_period_s);

    let mut patrol = Patrol::new(
        patrol_params.sequencer,
        nav_client,
        MarkerAdapter::new(patrol_params.marker, marker_server),
    );

    // ---- MAIN LOOP ----

    info!("Begining main loop, waiting for waypoints\n");

    let mut nav_connected = patrol.sequencer().nav().is_connected();

    loop {
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        let mut events = Vec::new();

        loop {
            match event_rx.try_recv() {
                Ok(e) => events.push(e),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(eyre!("All stream clients have stopped"));
                }
            }
        }

        if let Some(c) = stream_clients.iter().find(|c| !c.is_running()) {
            return Err(eyre!("The {} stream client has stopped", c.name()));
        }

        let connected = patrol.sequencer().nav().is_connected();
        if connected != nav_connected {
            match connected {
                true => info!("Navigation service {}", connection_state(connected)),
                false => warn!("Navigation service {}", connection_state(connected)),
            }
            nav_connected = connected;
        }

        match patrol.poll_nav() {
            Ok(Some(e)) => events.push(e),
            Ok(None) => (),
            Err(e) => warn!("{}", e),
        }

        // ---- PATROL PROCESSING ----

        for event in events {
            if let Err(e) = patrol.handle_event(event) {
                warn!("{}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }
}

fn connection_state(connected: bool) -> &'static str {
    match connected {
        true => "connected",
        false => "not connected",
    }
}
