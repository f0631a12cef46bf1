//! # Patrol
//!
//! Ties the waypoint store to the goal sequencer. Every input to the patrol (clicked points, pose
//! samples and navigation results) is a [`PatrolEvent`], handled one at a time by
//! [`Patrol::handle_event`] in the order the events arrived.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{loc::PoseSample, nav::NavResult, viz::ClickedPoint};
use log::info;

use crate::{
    marker::{MarkerAdapter, MarkerSink},
    nav_client::{NavAdapter, NavClientError},
    sequencer::{CompletionOutcome, GoalId, GoalSequencer, SequencerError, SequencerParams},
    waypoint::{SlotId, Waypoint, WaypointStore},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct Patrol<N, M> {
    store: WaypointStore,
    sequencer: GoalSequencer<N, M>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An input to the patrol.
#[derive(Debug, Clone)]
pub enum PatrolEvent {
    /// The operator clicked a point
    Click(ClickedPoint),

    /// A new pose of the robot
    Pose(PoseSample),

    /// The navigation service finished a goal
    GoalComplete(NavResult),
}

#[derive(Debug, thiserror::Error)]
pub enum PatrolError {
    #[error("Sequencer error: {0}")]
    SequencerError(#[from] SequencerError),

    #[error("Could not get the result from the navigation service: {0}")]
    NavPollError(NavClientError),

    #[error("Expected {0} to hold a waypoint but it was empty")]
    EmptySlot(SlotId),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<N, M> Patrol<N, M>
where
    N: NavAdapter,
    M: MarkerSink,
{
    pub fn new(params: SequencerParams, nav: N, markers: MarkerAdapter<M>) -> Self {
        Self {
            store: WaypointStore::new(),
            sequencer: GoalSequencer::new(params, nav, markers),
        }
    }

    /// Handle a single event.
    pub fn handle_event(&mut self, event: PatrolEvent) -> Result<(), PatrolError> {
        match event {
            PatrolEvent::Click(point) => self.capture(point.into()).map(|_| ()),
            PatrolEvent::Pose(pose) => {
                self.observe_pose(pose);
                Ok(())
            }
            PatrolEvent::GoalComplete(result) => self.on_goal_complete(result).map(|_| ()),
        }
    }

    /// Capture a new waypoint and send the robot to slot A.
    ///
    /// Slot A is targeted whichever slot the waypoint was written to.
    pub fn capture(&mut self, point: Waypoint) -> Result<GoalId, PatrolError> {
        info!(
            "Clicked: {}, {}, {}",
            point.position_m.x, point.position_m.y, point.position_m.z
        );

        let slot = self.store.capture(point);
        info!("Waypoint stored in {}", slot);

        let target = self
            .store
            .get(SlotId::A)
            .ok_or(PatrolError::EmptySlot(SlotId::A))?;

        Ok(self.sequencer.dispatch(target, &self.store)?)
    }

    /// Observe a pose of the robot, the first one observed becomes home.
    pub fn observe_pose(&mut self, pose: PoseSample) {
        self.store.home_mut().maybe_latch(pose.into());
    }

    /// Handle the result of a goal.
    pub fn on_goal_complete(&mut self, result: NavResult) -> Result<CompletionOutcome, PatrolError> {
        Ok(self.sequencer.on_goal_complete(result, &self.store)?)
    }

    /// Check the navigation service for the result of the goal in flight.
    pub fn poll_nav(&mut self) -> Result<Option<PatrolEvent>, PatrolError> {
        self.sequencer
            .nav_mut()
            .poll_result()
            .map(|r| r.map(PatrolEvent::GoalComplete))
            .map_err(PatrolError::NavPollError)
    }

    pub fn store(&self) -> &WaypointStore {
        &self.store
    }

    pub fn sequencer(&self) -> &GoalSequencer<N, M> {
        &self.sequencer
    }
}

#[cfg(test)]
mod test {
    use comms_if::eqpt::nav::NavGoalStatus;

    use super::*;
    use crate::{
        marker::{test::RecordingSink, MarkerParams},
        sequencer::{test::RecordingNav, EmptySlotPolicy, SequenceState, Target},
    };

    fn patrol() -> Patrol<RecordingNav, RecordingSink> {
        patrol_with_policy(EmptySlotPolicy::Skip)
    }

    fn patrol_with_policy(policy: EmptySlotPolicy) -> Patrol<RecordingNav, RecordingSink> {
        Patrol::new(
            SequencerParams {
                empty_slot_policy: policy,
                ..SequencerParams::default()
            },
            RecordingNav::default(),
            MarkerAdapter::new(MarkerParams::default(), RecordingSink::default()),
        )
    }

    fn click(x: f64) -> PatrolEvent {
        PatrolEvent::Click(ClickedPoint {
            frame_id: "map".into(),
            position_m: [x, 0.0, 0.0],
        })
    }

    fn pose(x: f64) -> PatrolEvent {
        PatrolEvent::Pose(PoseSample {
            frame_id: "map".into(),
            position_m: [x, 0.0, 0.0],
            attitude_q: [0.0, 0.0, 0.0, 1.0],
        })
    }

    /// Queue a succeeded result for the goal in flight and run it through the patrol.
    fn complete_in_flight(patrol: &mut Patrol<RecordingNav, RecordingSink>) {
        let goal_id = patrol.sequencer().in_flight().expect("no goal in flight").0;
        patrol.sequencer.nav_mut().results.push_back(NavResult {
            goal_id,
            status: NavGoalStatus::Succeeded,
        });

        let event = patrol.poll_nav().unwrap().expect("no result polled");
        patrol.handle_event(event).unwrap();
    }

    fn sent_x(patrol: &Patrol<RecordingNav, RecordingSink>) -> Vec<f64> {
        patrol
            .sequencer()
            .nav()
            .sent
            .iter()
            .map(|g| g.position_m[0])
            .collect()
    }

    #[test]
    fn test_capture_always_targets_slot_a() {
        let mut patrol = patrol();

        for i in 1..=7 {
            patrol.handle_event(click(i as f64)).unwrap();

            // Exactly one dispatch per capture
            assert_eq!(patrol.sequencer().nav().sent.len(), i);

            let slot_a = patrol.store().get(SlotId::A).unwrap().position_m.x;
            assert_eq!(*sent_x(&patrol).last().unwrap(), slot_a);
        }

        // Slot A was overwritten by captures 4 and 7
        assert_eq!(sent_x(&patrol), vec![1.0, 1.0, 1.0, 4.0, 4.0, 4.0, 7.0]);
    }

    #[test]
    fn test_capture_does_not_reset_cycle() {
        let mut patrol = patrol();
        patrol.handle_event(click(1.0)).unwrap();
        patrol.handle_event(click(2.0)).unwrap();

        complete_in_flight(&mut patrol);
        assert_eq!(patrol.sequencer().state(), SequenceState::AwaitingB);

        patrol.handle_event(click(3.0)).unwrap();
        assert_eq!(patrol.sequencer().state(), SequenceState::AwaitingB);
    }

    #[test]
    fn test_first_pose_is_home() {
        let mut patrol = patrol();

        patrol.handle_event(pose(0.0)).unwrap();
        patrol.handle_event(pose(5.0)).unwrap();

        assert_eq!(
            patrol.store().home().get(),
            Some(&Waypoint::new("map", 0.0, 0.0, 0.0))
        );
        assert!(patrol.sequencer().nav().sent.is_empty());
    }

    #[test]
    fn test_poll_without_result() {
        let mut patrol = patrol();
        assert!(patrol.poll_nav().unwrap().is_none());
    }

    #[test]
    fn test_patrol_scenario() {
        let mut patrol = patrol();

        for x in 1..=3 {
            patrol.handle_event(click(x as f64)).unwrap();
        }
        patrol.handle_event(pose(0.0)).unwrap();

        assert_eq!(sent_x(&patrol), vec![1.0, 1.0, 1.0]);
        assert_eq!(patrol.store().get(SlotId::B).unwrap().position_m.x, 2.0);
        assert_eq!(patrol.store().get(SlotId::C).unwrap().position_m.x, 3.0);
        assert!(patrol.store().home().is_latched());

        for _ in 0..8 {
            complete_in_flight(&mut patrol);
        }

        assert_eq!(
            sent_x(&patrol)[3..],
            [1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0, 0.0]
        );

        // Three markers for the three slots, the home pose isn't drawn
        let published = &patrol.sequencer().markers().sink().published;
        assert_eq!(published.len(), 11);
        assert_eq!(published[0].markers.len(), 1);
        assert_eq!(published[10].markers.len(), 3);
    }

    #[test]
    fn test_result_of_preempted_goal_ignored() {
        let mut patrol = patrol();

        patrol.handle_event(click(1.0)).unwrap();
        let first = patrol.sequencer().in_flight().unwrap();
        patrol.handle_event(click(2.0)).unwrap();

        patrol
            .handle_event(PatrolEvent::GoalComplete(NavResult {
                goal_id: first.0,
                status: NavGoalStatus::Preempted,
            }))
            .unwrap();

        assert_eq!(patrol.sequencer().state(), SequenceState::AwaitingA);
        assert_eq!(patrol.sequencer().nav().sent.len(), 2);
    }

    #[test]
    fn test_capture_restarts_held_patrol() {
        let mut patrol = patrol_with_policy(EmptySlotPolicy::Hold);

        patrol.handle_event(click(1.0)).unwrap();

        // Slot A has data, slot B doesn't so the robot holds
        complete_in_flight(&mut patrol);
        complete_in_flight(&mut patrol);

        assert_eq!(patrol.sequencer().in_flight(), None);
        assert_eq!(patrol.sequencer().state(), SequenceState::AwaitingC);
        assert!(patrol.poll_nav().unwrap().is_none());
        assert_eq!(sent_x(&patrol), vec![1.0, 1.0]);

        // The next click is written to slot B and sends the robot to slot A
        patrol.handle_event(click(2.0)).unwrap();

        assert_eq!(sent_x(&patrol), vec![1.0, 1.0, 1.0]);
        assert!(patrol.sequencer().in_flight().is_some());
        assert_eq!(patrol.sequencer().state(), SequenceState::AwaitingC);

        // Fill slot C, the patrol carries on from where it held
        patrol.handle_event(click(3.0)).unwrap();
        let goal_id = patrol.sequencer().in_flight().unwrap().0;

        let outcome = patrol
            .on_goal_complete(NavResult {
                goal_id,
                status: NavGoalStatus::Succeeded,
            })
            .unwrap();

        assert!(matches!(
            outcome,
            CompletionOutcome::Dispatched {
                target: Target::Slot(SlotId::C),
                ..
            }
        ));
        assert_eq!(*sent_x(&patrol).last().unwrap(), 3.0);
        assert_eq!(patrol.sequencer().state(), SequenceState::AwaitingHome);
    }
}
