//! # GoalSequencer module
//!
//! This module implements the [`GoalSequencer`] state machine, which decides the next target of
//! the patrol each time the navigation service finishes a goal. The cycle is:
//!
//! - `AwaitingA` - the next completion sends the robot to slot A
//! - `AwaitingB` - the next completion sends the robot to slot B
//! - `AwaitingC` - the next completion sends the robot to slot C
//! - `AwaitingHome` - the next completion sends the robot home
//!
//! after which the cycle repeats indefinitely. The sequencer does not start the patrol itself,
//! the first goal is dispatched when the operator captures a waypoint.
//!
//! The outcome of a goal does not change the sequence: aborted, preempted or otherwise failed
//! goals advance the cycle exactly as succeeded ones do. Failures are reported in the log.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use comms_if::eqpt::nav::NavResult;
use log::{debug, error, info, warn};

use crate::{
    marker::{MarkerAdapter, MarkerSink},
    nav_client::{NavAdapter, NavClientError},
    waypoint::{Waypoint, WaypointStore},
};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::{EmptySlotPolicy, SequencerParams};
pub use state::{SequenceState, Target};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifier of a dispatched goal, unique within a sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoalId(pub u64);

/// Goal sequencer
///
/// Owns the navigation adapter and the marker adapter, so that every dispatch both sends the goal
/// and refreshes the operator's view of the waypoints.
pub struct GoalSequencer<N, M> {
    params: SequencerParams,

    /// Current position in the patrol cycle
    state: SequenceState,

    /// The goal the navigation service is working on. At most one goal is ever in flight.
    in_flight: Option<GoalId>,

    next_goal_id: u64,

    /// Number of consecutive goals which did not succeed
    consec_nav_failures: u64,

    nav: N,

    markers: MarkerAdapter<M>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// What the sequencer did in response to a goal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The result was for a goal which is no longer in flight and was ignored
    Stale,

    /// A new goal was dispatched
    Dispatched { goal_id: GoalId, target: Target },

    /// No target had a waypoint, so nothing was dispatched
    Held,
}

#[derive(Debug, thiserror::Error)]
pub enum SequencerError {
    #[error("Could not send the goal to the navigation service: {0}")]
    NavError(NavClientError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<N, M> GoalSequencer<N, M>
where
    N: NavAdapter,
    M: MarkerSink,
{
    pub fn new(params: SequencerParams, nav: N, markers: MarkerAdapter<M>) -> Self {
        Self {
            params,
            state: SequenceState::default(),
            in_flight: None,
            next_goal_id: 0,
            consec_nav_failures: 0,
            nav,
            markers,
        }
    }

    /// Send the robot to `target`, preempting any goal in flight, and refresh the markers.
    ///
    /// A goal which could not be sent is not retried, and leaves no goal in flight.
    pub fn dispatch(
        &mut self,
        target: &Waypoint,
        store: &WaypointStore,
    ) -> Result<GoalId, SequencerError> {
        let goal_id = GoalId(self.next_goal_id);
        self.next_goal_id += 1;

        if let Some(prev) = self.in_flight.take() {
            debug!("Goal {} preempted by goal {}", prev, goal_id);
        }

        let sent = self.nav.send_goal(&target.to_nav_goal(goal_id.0));

        self.markers.refresh(store);

        sent.map_err(SequencerError::NavError)?;

        info!("Goal {} dispatched to {}", goal_id, target);
        self.in_flight = Some(goal_id);

        Ok(goal_id)
    }

    /// Handle the result of a goal, dispatching the next target in the cycle.
    pub fn on_goal_complete(
        &mut self,
        result: NavResult,
        store: &WaypointStore,
    ) -> Result<CompletionOutcome, SequencerError> {
        match self.in_flight {
            Some(id) if id.0 == result.goal_id => self.in_flight = None,
            _ => {
                debug!(
                    "Ignoring {:?} result of goal {}, it is not the goal in flight",
                    result.status, result.goal_id
                );
                return Ok(CompletionOutcome::Stale);
            }
        }

        self.record_status(&result);

        let next = match self.params.empty_slot_policy {
            EmptySlotPolicy::Skip => self.first_filled_state(store),
            EmptySlotPolicy::Hold => Some(self.state).filter(|s| s.waypoint(store).is_some()),
        };

        match next.and_then(|s| s.waypoint(store).map(|wp| (s, wp))) {
            Some((state, waypoint)) => {
                if state != self.state {
                    warn!(
                        "No waypoint in {}, skipping to {}",
                        self.state.target(),
                        state.target()
                    );
                }

                self.state = state.next();
                let goal_id = self.dispatch(waypoint, store)?;

                Ok(CompletionOutcome::Dispatched {
                    goal_id,
                    target: state.target(),
                })
            }
            None => {
                warn!(
                    "No waypoint in {}, holding position until a new waypoint is captured",
                    self.state.target()
                );
                self.state = self.state.next();

                Ok(CompletionOutcome::Held)
            }
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn in_flight(&self) -> Option<GoalId> {
        self.in_flight
    }

    pub fn consec_nav_failures(&self) -> u64 {
        self.consec_nav_failures
    }

    pub fn nav(&self) -> &N {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut N {
        &mut self.nav
    }

    pub fn markers(&self) -> &MarkerAdapter<M> {
        &self.markers
    }

    /// Search the cycle, starting at the current state, for a state whose target has data.
    fn first_filled_state(&self, store: &WaypointStore) -> Option<SequenceState> {
        let mut state = self.state;

        for _ in 0..SequenceState::CYCLE_LEN {
            if state.waypoint(store).is_some() {
                return Some(state);
            }
            state = state.next();
        }

        None
    }

    fn record_status(&mut self, result: &NavResult) {
        if result.status.is_success() {
            info!("Goal {} succeeded", result.goal_id);
            self.consec_nav_failures = 0;
            return;
        }

        self.consec_nav_failures += 1;

        if self.consec_nav_failures >= self.params.nav_failure_warn_limit {
            error!(
                "Goal {} finished with status {:?}, {} consecutive goals have failed",
                result.goal_id, result.status, self.consec_nav_failures
            );
        } else {
            warn!(
                "Goal {} finished with status {:?}, continuing the patrol",
                result.goal_id, result.status
            );
        }
    }
}

impl Display for GoalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::VecDeque;

    use comms_if::eqpt::nav::{NavGoal, NavGoalStatus};

    use super::*;
    use crate::{
        marker::{test::RecordingSink, MarkerParams},
        waypoint::SlotId,
    };

    /// Navigation adapter recording sent goals and returning queued results.
    #[derive(Default)]
    pub(crate) struct RecordingNav {
        pub sent: Vec<NavGoal>,
        pub results: VecDeque<NavResult>,
        pub fail_sends: bool,
    }

    impl NavAdapter for RecordingNav {
        fn send_goal(&mut self, goal: &NavGoal) -> Result<(), NavClientError> {
            if self.fail_sends {
                return Err(NavClientError::NotConnected);
            }
            self.sent.push(goal.clone());
            Ok(())
        }

        fn poll_result(&mut self) -> Result<Option<NavResult>, NavClientError> {
            Ok(self.results.pop_front())
        }
    }

    fn sequencer(policy: EmptySlotPolicy) -> GoalSequencer<RecordingNav, RecordingSink> {
        GoalSequencer::new(
            SequencerParams {
                empty_slot_policy: policy,
                nav_failure_warn_limit: 3,
            },
            RecordingNav::default(),
            MarkerAdapter::new(MarkerParams::default(), RecordingSink::default()),
        )
    }

    /// Store with slots holding x = 1, 2, 3 and home at the origin.
    fn full_store() -> WaypointStore {
        let mut store = WaypointStore::new();
        for x in 1..=3 {
            store.capture(Waypoint::new("map", x as f64, 0.0, 0.0));
        }
        store.home_mut().maybe_latch(Waypoint::new("map", 0.0, 0.0, 0.0));
        store
    }

    /// Complete the goal in flight with the given status.
    fn complete(
        seq: &mut GoalSequencer<RecordingNav, RecordingSink>,
        store: &WaypointStore,
        status: NavGoalStatus,
    ) -> CompletionOutcome {
        let goal_id = seq.in_flight().expect("no goal in flight").0;
        seq.on_goal_complete(NavResult { goal_id, status }, store)
            .unwrap()
    }

    fn sent_x(seq: &GoalSequencer<RecordingNav, RecordingSink>) -> Vec<f64> {
        seq.nav().sent.iter().map(|g| g.position_m[0]).collect()
    }

    #[test]
    fn test_patrol_cycle() {
        let store = full_store();
        let mut seq = sequencer(EmptySlotPolicy::Skip);

        seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();

        for _ in 0..9 {
            complete(&mut seq, &store, NavGoalStatus::Succeeded);
        }

        assert_eq!(
            sent_x(&seq),
            vec![1.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0]
        );
        assert_eq!(seq.state(), SequenceState::AwaitingB);
    }

    #[test]
    fn test_goal_ids_increase() {
        let store = full_store();
        let mut seq = sequencer(EmptySlotPolicy::Skip);

        let first = seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();
        let outcome = complete(&mut seq, &store, NavGoalStatus::Succeeded);

        match outcome {
            CompletionOutcome::Dispatched { goal_id, target } => {
                assert!(goal_id > first);
                assert_eq!(target, Target::Slot(SlotId::A));
                assert_eq!(seq.in_flight(), Some(goal_id));
            }
            o => panic!("Expected a dispatch, got {:?}", o),
        }

        let ids: Vec<u64> = seq.nav().sent.iter().map(|g| g.goal_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_failures_do_not_change_sequence() {
        let store = full_store();
        let mut seq = sequencer(EmptySlotPolicy::Skip);

        seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();

        complete(&mut seq, &store, NavGoalStatus::Aborted);
        complete(&mut seq, &store, NavGoalStatus::Preempted);
        complete(&mut seq, &store, NavGoalStatus::Rejected);
        assert_eq!(seq.consec_nav_failures(), 3);

        complete(&mut seq, &store, NavGoalStatus::Succeeded);
        assert_eq!(seq.consec_nav_failures(), 0);

        complete(&mut seq, &store, NavGoalStatus::Lost);
        assert_eq!(seq.consec_nav_failures(), 1);

        assert_eq!(sent_x(&seq), vec![1.0, 1.0, 2.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn test_stale_result_ignored() {
        let store = full_store();
        let mut seq = sequencer(EmptySlotPolicy::Skip);

        let first = seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();
        let second = seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();
        assert_eq!(seq.in_flight(), Some(second));

        let outcome = seq
            .on_goal_complete(
                NavResult {
                    goal_id: first.0,
                    status: NavGoalStatus::Preempted,
                },
                &store,
            )
            .unwrap();

        assert_eq!(outcome, CompletionOutcome::Stale);
        assert_eq!(seq.state(), SequenceState::AwaitingA);
        assert_eq!(seq.in_flight(), Some(second));
        assert_eq!(seq.nav().sent.len(), 2);
    }

    #[test]
    fn test_result_without_goal_in_flight_ignored() {
        let store = full_store();
        let mut seq = sequencer(EmptySlotPolicy::Skip);

        let outcome = seq
            .on_goal_complete(
                NavResult {
                    goal_id: 0,
                    status: NavGoalStatus::Succeeded,
                },
                &store,
            )
            .unwrap();

        assert_eq!(outcome, CompletionOutcome::Stale);
        assert!(seq.nav().sent.is_empty());
    }

    #[test]
    fn test_skip_empty_slots() {
        // Only slot A and home have data
        let mut store = WaypointStore::new();
        store.capture(Waypoint::new("map", 1.0, 0.0, 0.0));
        store.home_mut().maybe_latch(Waypoint::new("map", 0.0, 0.0, 0.0));

        let mut seq = sequencer(EmptySlotPolicy::Skip);
        seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();

        assert!(matches!(
            complete(&mut seq, &store, NavGoalStatus::Succeeded),
            CompletionOutcome::Dispatched { target: Target::Slot(SlotId::A), .. }
        ));
        assert!(matches!(
            complete(&mut seq, &store, NavGoalStatus::Succeeded),
            CompletionOutcome::Dispatched { target: Target::Home, .. }
        ));
        assert_eq!(seq.state(), SequenceState::AwaitingA);

        complete(&mut seq, &store, NavGoalStatus::Succeeded);
        complete(&mut seq, &store, NavGoalStatus::Succeeded);

        assert_eq!(sent_x(&seq), vec![1.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_skip_without_home() {
        // No pose was ever received, only slot A has data
        let mut store = WaypointStore::new();
        store.capture(Waypoint::new("map", 1.0, 0.0, 0.0));

        let mut seq = sequencer(EmptySlotPolicy::Skip);
        seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();

        for _ in 0..3 {
            complete(&mut seq, &store, NavGoalStatus::Succeeded);
        }

        assert_eq!(sent_x(&seq), vec![1.0; 4]);
        assert_eq!(seq.state(), SequenceState::AwaitingB);
    }

    #[test]
    fn test_hold_on_empty_slot() {
        let mut store = WaypointStore::new();
        store.capture(Waypoint::new("map", 1.0, 0.0, 0.0));

        let mut seq = sequencer(EmptySlotPolicy::Hold);
        seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();

        // Slot A has data
        complete(&mut seq, &store, NavGoalStatus::Succeeded);
        assert_eq!(seq.state(), SequenceState::AwaitingB);

        // Slot B doesn't, so the robot holds and the cycle still advances
        let outcome = complete(&mut seq, &store, NavGoalStatus::Succeeded);
        assert_eq!(outcome, CompletionOutcome::Held);
        assert_eq!(seq.state(), SequenceState::AwaitingC);
        assert_eq!(seq.in_flight(), None);
        assert_eq!(seq.nav().sent.len(), 2);
    }

    #[test]
    fn test_send_failure_not_retried() {
        let store = full_store();
        let mut seq = sequencer(EmptySlotPolicy::Skip);
        seq.nav_mut().fail_sends = true;

        let res = seq.dispatch(store.get(SlotId::A).unwrap(), &store);

        assert!(matches!(
            res,
            Err(SequencerError::NavError(NavClientError::NotConnected))
        ));
        assert_eq!(seq.in_flight(), None);
        assert!(seq.nav().sent.is_empty());

        // Markers are refreshed even though the goal could not be sent
        assert_eq!(seq.markers().sink().published.len(), 1);
    }

    #[test]
    fn test_dispatch_refreshes_markers() {
        let store = full_store();
        let mut seq = sequencer(EmptySlotPolicy::Skip);

        seq.dispatch(store.get(SlotId::A).unwrap(), &store).unwrap();
        complete(&mut seq, &store, NavGoalStatus::Succeeded);

        let published = &seq.markers().sink().published;
        assert_eq!(published.len(), 2);
        assert!(published.iter().all(|p| p.markers.len() == 3));
    }
}
