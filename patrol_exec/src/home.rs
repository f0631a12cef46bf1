//! # Home pose capture
//!
//! The home pose is the first pose reported by the pose stream. It is latched exactly once and
//! never changes afterwards.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use crate::waypoint::Waypoint;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// One-shot latch of the home pose.
#[derive(Debug, Clone, PartialEq)]
pub enum HomeCapture {
    /// No pose has been observed yet
    Unlatched,

    /// The home pose, fixed for the lifetime of the instance
    Latched(Waypoint),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for HomeCapture {
    fn default() -> Self {
        HomeCapture::Unlatched
    }
}

impl HomeCapture {
    /// Latch `pose` as home if no pose has been latched yet, otherwise do nothing.
    ///
    /// Returns `true` only for the call which latched the pose.
    pub fn maybe_latch(&mut self, pose: Waypoint) -> bool {
        match self {
            HomeCapture::Latched(_) => false,
            HomeCapture::Unlatched => {
                info!("Home pose latched at {}", pose);
                *self = HomeCapture::Latched(pose);
                true
            }
        }
    }

    /// Get the home pose, if latched.
    pub fn get(&self) -> Option<&Waypoint> {
        match self {
            HomeCapture::Latched(wp) => Some(wp),
            HomeCapture::Unlatched => None,
        }
    }

    pub fn is_latched(&self) -> bool {
        matches!(self, HomeCapture::Latched(_))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_latch_once() {
        let mut home = HomeCapture::default();
        assert!(!home.is_latched());
        assert!(home.get().is_none());

        assert!(home.maybe_latch(Waypoint::new("odom", 0.5, -0.25, 0.0)));

        for i in 0..100 {
            assert!(!home.maybe_latch(Waypoint::new("map", i as f64, 1.0, 2.0)));
        }

        assert!(home.is_latched());
        assert_eq!(home.get(), Some(&Waypoint::new("odom", 0.5, -0.25, 0.0)));
    }

    #[test]
    fn test_instances_independent() {
        let mut first = HomeCapture::default();
        let second = HomeCapture::default();

        first.maybe_latch(Waypoint::new("map", 1.0, 1.0, 0.0));

        assert!(first.is_latched());
        assert!(!second.is_latched());
    }
}
