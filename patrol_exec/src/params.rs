//! # Patrol Executable Parameters
//!
//! This module provides parameters for the patrol executable, loaded from `patrol.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{marker::MarkerParams, sequencer::SequencerParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PatrolParams {
    /// Target period of one cycle of the main loop
    pub cycle_period_s: f64,

    pub sequencer: SequencerParams,

    pub marker: MarkerParams,
}
