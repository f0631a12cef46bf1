//! # Patrol library.
//!
//! Sequences navigation goals for a robot patrolling between three operator-chosen waypoints and
//! its home pose. The library holds everything the `patrol_exec` executable is built from, so the
//! patrol can be tested without the network.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Home pose - the first pose of the robot, latched once
pub mod home;

/// Marker adapter - draws the waypoints in the operator's visualisation tool
pub mod marker;

/// Marker server - publishes the waypoint markers
pub mod marker_server;

/// Navigation client - sends goals to the navigation service and receives their results
pub mod nav_client;

/// Parameters of the patrol executable
pub mod params;

/// Patrol - routes incoming events to the waypoint store and the sequencer
pub mod patrol;

/// Goal sequencer - chooses the next target each time a goal completes
pub mod sequencer;

/// Stream clients - receive the pose and clicked point streams
pub mod stream_client;

/// Waypoints and the waypoint store
pub mod waypoint;
