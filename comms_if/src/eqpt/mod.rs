//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with external equipment: the pose
//! source, the navigation service and the visualisation tool.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod loc;
pub mod nav;
pub mod viz;
