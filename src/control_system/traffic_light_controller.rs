use crate::communication::messages::{Arrival, IntersectionEvent, SnapshotKind};
use crate::config::TimingConfig;
use crate::control_system::transition::{Step, TransitionPlan};
use crate::error::ArrivalError;
use crate::models::intersection::{Axis, IntersectionState, Lane, Phase};
use crate::shared_data::current_timestamp;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

/// What the controller decided to do with an arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Right of way is unaffected; completion fires immediately.
    Unchanged,
    /// Hand right of way to the arrival's axis.
    Switch(TransitionPlan),
}

/// Chooses between a no-op and an axis switch for `arrival` given the current phase.
///
/// Only an arrival on the held axis during the other axis's straight phase switches.
/// Right turns never do. Arrivals during either protected left are deferred to it.
pub fn decide(phase: Phase, arrival: &Arrival, timing: &TimingConfig) -> Decision {
    let axis = arrival.direction.axis();
    if phase != axis.opposite().straight_phase() || arrival.lane == Lane::Right {
        return Decision::Unchanged;
    }
    Decision::Switch(TransitionPlan::new(axis, !arrival.lane.is_straight(), timing))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalOutcome {
    Unchanged,
    Switching { target: Axis, protected_left: bool },
}

#[derive(Debug)]
enum Pending {
    Ready(IntersectionState),
    Waiting(oneshot::Receiver<IntersectionState>),
}

/// Completion signal for one accepted arrival. Dropping it does not stop the sequence.
#[derive(Debug)]
pub struct Completion {
    outcome: ArrivalOutcome,
    pending: Pending,
}

impl Completion {
    pub fn outcome(&self) -> ArrivalOutcome {
        self.outcome
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self.pending, Pending::Ready(_))
    }

    /// Resolves with the terminal snapshot once the sequence has finished.
    pub async fn wait(self) -> Result<IntersectionState, ArrivalError> {
        match self.pending {
            Pending::Ready(state) => Ok(state),
            Pending::Waiting(rx) => rx.await.map_err(|_| ArrivalError::SequenceAborted),
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: IntersectionState,
    in_flight: bool,
}

/// Owns the intersection and is its only writer. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct IntersectionController {
    shared: Arc<Mutex<Shared>>,
    timing: TimingConfig,
    events: Option<mpsc::UnboundedSender<IntersectionEvent>>,
}

impl IntersectionController {
    pub fn new(timing: TimingConfig) -> Self {
        Self::from_state(IntersectionState::default(), timing)
    }

    /// Starts from a settled state instead of the North-South default.
    ///
    /// `state` must satisfy [`IntersectionState::is_consistent`]; states built with
    /// [`IntersectionState::serving`] always do. Debug builds assert it.
    pub fn from_state(state: IntersectionState, timing: TimingConfig) -> Self {
        debug_assert!(
            state.is_consistent(),
            "controller started from an inconsistent state:\n{}",
            state
        );
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state,
                in_flight: false,
            })),
            timing,
            events: None,
        }
    }

    /// Attaches a snapshot consumer and immediately sends it the current state.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<IntersectionEvent>) -> Self {
        self.events = Some(events);
        let snapshot = self.snapshot();
        self.publish(SnapshotKind::Initial, &snapshot);
        self
    }

    pub fn timing(&self) -> TimingConfig {
        self.timing
    }

    pub fn snapshot(&self) -> IntersectionState {
        self.lock().state.clone()
    }

    /// True while a transition sequence is running.
    pub fn is_busy(&self) -> bool {
        self.lock().in_flight
    }

    /// Validates raw tokens and then behaves like [`arrive`](Self::arrive).
    pub fn arrive_tokens(&self, direction: &str, lane: &str) -> Result<Completion, ArrivalError> {
        let arrival = Arrival::from_tokens(direction, lane)?;
        self.arrive(arrival)
    }

    /// Handles one car arrival.
    ///
    /// The first stage of a switch is applied before this returns. The remaining stages run
    /// on a task spawned onto the current Tokio runtime; without one a switch is refused
    /// with [`ArrivalError::NoRuntime`]. An arrival made while a sequence is still running
    /// is rejected with [`ArrivalError::SequenceInProgress`]. Neither error touches state.
    pub fn arrive(&self, arrival: Arrival) -> Result<Completion, ArrivalError> {
        let mut shared = self.lock();
        if shared.in_flight {
            log::warn!(
                "Rejected arrival {},{}: transition already in progress",
                arrival.direction,
                arrival.lane
            );
            return Err(ArrivalError::SequenceInProgress);
        }

        match decide(shared.state.phase(), &arrival, &self.timing) {
            Decision::Unchanged => {
                let snapshot = shared.state.clone();
                drop(shared);
                log::info!(
                    "Car arrived from {} in lane {}: no change during {}",
                    arrival.direction,
                    arrival.lane,
                    snapshot.phase()
                );
                self.publish(SnapshotKind::Completed, &snapshot);
                Ok(Completion {
                    outcome: ArrivalOutcome::Unchanged,
                    pending: Pending::Ready(snapshot),
                })
            }
            Decision::Switch(plan) => {
                let Ok(runtime) = Handle::try_current() else {
                    log::error!(
                        "Refused arrival {},{}: no Tokio runtime to run the sequence on",
                        arrival.direction,
                        arrival.lane
                    );
                    return Err(ArrivalError::NoRuntime);
                };
                let target = plan.target();
                let (immediate, timed) = plan.split_immediate();
                for step in immediate {
                    step.stage.apply(&mut shared.state, target);
                }
                shared.in_flight = true;
                let started = Instant::now();
                let snapshot = shared.state.clone();
                drop(shared);

                log::info!(
                    "Car arrived from {} in lane {}: switching to {:?} over {:?}",
                    arrival.direction,
                    arrival.lane,
                    target,
                    plan.total_duration()
                );
                self.publish(SnapshotKind::Intermediate, &snapshot);

                let (tx, rx) = oneshot::channel();
                runtime.spawn(
                    self.clone()
                        .run_sequence(target, started, timed.to_vec(), tx),
                );
                Ok(Completion {
                    outcome: ArrivalOutcome::Switching {
                        target,
                        protected_left: !arrival.lane.is_straight(),
                    },
                    pending: Pending::Waiting(rx),
                })
            }
        }
    }

    // Runs the timed stages in order; the last one releases the controller.
    // Deadlines are cumulative from `started` so per-stage overhead does not drift.
    async fn run_sequence(
        self,
        target: Axis,
        started: Instant,
        steps: Vec<Step>,
        done: oneshot::Sender<IntersectionState>,
    ) {
        let mut deadline = started;
        let mut steps = steps.into_iter().peekable();
        while let Some(step) = steps.next() {
            deadline += step.delay;
            sleep_until(deadline).await;
            let is_last = steps.peek().is_none();
            let snapshot = {
                let mut shared = self.lock();
                step.stage.apply(&mut shared.state, target);
                if is_last {
                    shared.in_flight = false;
                }
                shared.state.clone()
            };
            log::info!("Stage {:?} applied, phase is {}", step.stage, snapshot.phase());
            if is_last {
                self.finish(snapshot, done);
                return;
            }
            self.publish(SnapshotKind::Intermediate, &snapshot);
        }

        let snapshot = {
            let mut shared = self.lock();
            shared.in_flight = false;
            shared.state.clone()
        };
        self.finish(snapshot, done);
    }

    fn finish(&self, snapshot: IntersectionState, done: oneshot::Sender<IntersectionState>) {
        self.publish(SnapshotKind::Completed, &snapshot);
        if done.send(snapshot).is_err() {
            log::debug!("Completion receiver dropped before the sequence finished");
        }
    }

    fn publish(&self, kind: SnapshotKind, state: &IntersectionState) {
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(json) = serde_json::to_string(state) {
                log::debug!("{:?} snapshot: {}", kind, json);
            }
        }
        if let Some(events) = &self.events {
            let event = IntersectionEvent {
                kind,
                timestamp: current_timestamp(),
                state: state.clone(),
            };
            if events.send(event).is_err() {
                log::debug!("Snapshot consumer has gone away");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Stages never panic mid-update, so a poisoned lock still holds a whole snapshot.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
