//! Step engine.
//!
//! One step applies a single sampled input to all four lights in a fixed
//! order: A, then C, then B := C, then D := A. The mirrors copy the
//! post-transition values of the same step, so there is no one-step lag.

use serde::{Deserialize, Serialize};

use crate::rules::{next_phase_a, next_phase_c};
use crate::state::{IntersectionState, Phases};

/// Observable result of a step, handed to the output collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step counter after the step (zero for the initial state).
    pub step_number: u64,
    /// Phases after the step.
    pub phases: Phases,
    /// Input that drove the step.
    pub powered: bool,
    /// Direction flag after the step.
    pub direction: bool,
}

/// A single intersection automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Intersection {
    state: IntersectionState,
}

impl Intersection {
    /// Automaton in the power-up state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: IntersectionState::new(),
        }
    }

    /// Automaton seeded with an arbitrary state.
    #[must_use]
    pub const fn from_state(state: IntersectionState) -> Self {
        Self { state }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &IntersectionState {
        &self.state
    }

    /// Snapshot of the current state as an output record.
    #[must_use]
    pub const fn record(&self) -> StepRecord {
        StepRecord {
            step_number: self.state.step_count,
            phases: self.state.phases,
            powered: self.state.powered,
            direction: self.state.direction,
        }
    }

    /// Advance every light by one tick under `powered`.
    pub fn step(&mut self, powered: bool) -> StepRecord {
        let state = &mut self.state;
        state.powered = powered;

        state.phases.a = next_phase_a(state.phases.a, powered, &mut state.direction);
        state.phases.c = next_phase_c(state.phases.c, powered, state.direction);
        state.phases.b = state.phases.c;
        state.phases.d = state.phases.a;

        state.step_count = state.step_count.saturating_add(1);
        self.record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;

    fn expect(record: &StepRecord, a: Phase, c: Phase) {
        assert_eq!(record.phases.a, a, "A at step {}", record.step_number);
        assert_eq!(record.phases.c, c, "C at step {}", record.step_number);
        assert_eq!(record.phases.d, a, "D mirrors A at step {}", record.step_number);
        assert_eq!(record.phases.b, c, "B mirrors C at step {}", record.step_number);
    }

    #[test]
    fn powered_cycle_from_dark() {
        let mut junction = Intersection::new();

        let r = junction.step(true);
        expect(&r, Phase::Green, Phase::Red);
        assert!(!r.direction);

        let r = junction.step(true);
        expect(&r, Phase::Yellow, Phase::Yellow);
        assert!(!r.direction);

        let r = junction.step(true);
        expect(&r, Phase::Red, Phase::Green);
        assert!(r.direction);

        let r = junction.step(true);
        expect(&r, Phase::Yellow, Phase::Yellow);
        assert!(r.direction);

        let r = junction.step(true);
        expect(&r, Phase::Green, Phase::Red);
        assert!(!r.direction);
        assert_eq!(r.step_number, 5);
    }

    #[test]
    fn power_loss_darkens_everything_in_one_step() {
        let mut junction = Intersection::new();
        for _ in 0..3 {
            junction.step(true);
        }
        let r = junction.step(false);
        assert_eq!(r.phases, Phases::ALL_OFF);
        assert!(!r.powered);
        // Direction survives the outage; A's restart clears it.
        assert!(r.direction);
        let r = junction.step(true);
        expect(&r, Phase::Green, Phase::Red);
        assert!(!r.direction);
    }

    #[test]
    fn unpowered_dark_state_is_a_fixed_point() {
        let mut junction = Intersection::new();
        for expected in 1..=4 {
            let r = junction.step(false);
            assert_eq!(r.phases, Phases::ALL_OFF);
            assert_eq!(r.step_number, expected);
        }
    }

    #[test]
    fn mirrors_copy_post_transition_values() {
        let mut junction = Intersection::from_state(IntersectionState {
            phases: Phases {
                a: Phase::Yellow,
                b: Phase::Red,
                c: Phase::Yellow,
                d: Phase::Green,
            },
            direction: false,
            powered: true,
            step_count: 9,
        });
        let r = junction.step(true);
        expect(&r, Phase::Red, Phase::Green);
        assert_eq!(r.step_number, 10);
    }

    #[test]
    fn record_reflects_initial_state() {
        let junction = Intersection::new();
        let r = junction.record();
        assert_eq!(r.step_number, 0);
        assert_eq!(r.phases, Phases::ALL_OFF);
        assert!(!r.powered);
    }
}
