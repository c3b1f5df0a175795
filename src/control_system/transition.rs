//! Stage engine for axis switches.
//!
//! A switch is a short list of `Step`s. Each step waits `delay` after the previous one
//! and then applies its `Stage` to the intersection. The controller runs the list on a
//! single timer task.

use crate::config::TimingConfig;
use crate::models::intersection::{Axis, IntersectionState, Light};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// One mutation inside an axis switch. `target` is always the axis gaining right of way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Serving axis goes yellow on both heads.
    YellowOut,
    /// Serving axis red; target gets green with permissive left.
    StraightIn,
    /// Serving axis red; target gets a protected left, mains stay red.
    LeftOn,
    /// Target's protected left clears through yellow (East-West only).
    LeftYellow,
    /// Target drops the protected left and goes green with permissive left.
    LeftOff,
}

impl Stage {
    pub fn apply(&self, state: &mut IntersectionState, target: Axis) {
        let serving = target.opposite();
        match self {
            Stage::YellowOut => {
                state.set_axis(serving, Light::Yellow, Light::Yellow);
            }
            Stage::StraightIn => {
                state.set_axis(serving, Light::Red, Light::Red);
                state.set_axis(target, Light::Green, Light::Orange);
                state.set_phase(target.straight_phase());
            }
            Stage::LeftOn => {
                state.set_axis(serving, Light::Red, Light::Red);
                state.set_axis_left(target, Light::Green);
                state.set_phase(target.left_phase());
            }
            Stage::LeftYellow => {
                state.set_axis_left(target, Light::Yellow);
            }
            Stage::LeftOff => {
                state.set_axis(target, Light::Green, Light::Orange);
                state.set_phase(target.straight_phase());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub delay: Duration,
    pub stage: Stage,
}

impl Step {
    fn after(delay: Duration, stage: Stage) -> Self {
        Self { delay, stage }
    }
}

/// Fixed chain of timed stages handing right of way to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    target: Axis,
    steps: Vec<Step>,
}

impl TransitionPlan {
    pub fn new(target: Axis, protected_left: bool, timing: &TimingConfig) -> Self {
        let mut steps = vec![Step::after(Duration::ZERO, Stage::YellowOut)];
        if !protected_left {
            steps.push(Step::after(timing.yellow, Stage::StraightIn));
        } else {
            steps.push(Step::after(timing.yellow, Stage::LeftOn));
            match target {
                // North-South ends its protected left straight into green.
                Axis::NorthSouth => {
                    steps.push(Step::after(timing.left_turn, Stage::LeftOff));
                }
                Axis::EastWest => {
                    steps.push(Step::after(timing.left_turn, Stage::LeftYellow));
                    steps.push(Step::after(timing.yellow, Stage::LeftOff));
                }
            }
        }
        Self { target, steps }
    }

    pub fn target(&self) -> Axis {
        self.target
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Time from the first stage to completion.
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.delay).sum()
    }

    /// Splits off the leading steps that must be applied before `arrive` returns.
    pub(crate) fn split_immediate(&self) -> (&[Step], &[Step]) {
        let idx = self
            .steps
            .iter()
            .position(|s| !s.delay.is_zero())
            .unwrap_or(self.steps.len());
        self.steps.split_at(idx)
    }

    /// Applies every stage back to back, ignoring the delays.
    pub fn apply_all(&self, state: &mut IntersectionState) {
        for step in &self.steps {
            step.stage.apply(state, self.target);
        }
    }
}
