//! # Communications interface crate.
//!
//! Provides the wire types exchanged with every collaborator of the patrol exec, and the network
//! layer used to carry them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for external equipment (pose source, navigation service, visualisation)
pub mod eqpt;

/// Network module
pub mod net;
