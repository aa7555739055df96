//! Automaton state records.

use serde::{Deserialize, Serialize};

use crate::phase::Phase;

// Junction layout:
//     |  |
//  ___|A |___
//         C
//  __B    ___
//     | D|
//     |  |

/// Position of a light at the junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Light {
    /// Driven; owns the direction flag.
    A,
    /// Mirrors C.
    B,
    /// Driven; reads the direction flag.
    C,
    /// Mirrors A.
    D,
}

impl Light {
    /// All four positions in display order.
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Single-letter label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Phases of all four lights at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phases {
    pub a: Phase,
    pub b: Phase,
    pub c: Phase,
    pub d: Phase,
}

impl Phases {
    /// Every light dark.
    pub const ALL_OFF: Self = Self::uniform(Phase::Off);

    /// Same phase on every light.
    #[must_use]
    pub const fn uniform(phase: Phase) -> Self {
        Self {
            a: phase,
            b: phase,
            c: phase,
            d: phase,
        }
    }

    /// Phase of one light.
    #[must_use]
    pub const fn get(self, light: Light) -> Phase {
        match light {
            Light::A => self.a,
            Light::B => self.b,
            Light::C => self.c,
            Light::D => self.d,
        }
    }
}

impl Default for Phases {
    fn default() -> Self {
        Self::ALL_OFF
    }
}

/// Full mutable state of one intersection.
///
/// Only the step engine writes these fields during normal operation; they are
/// public so tests and the explorer can seed arbitrary states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IntersectionState {
    /// Current phase of each light.
    pub phases: Phases,
    /// Shared direction flag. Written only by light A's rule.
    pub direction: bool,
    /// Latest sampled input.
    pub powered: bool,
    /// Completed steps. Diagnostic only.
    pub step_count: u64,
}

impl IntersectionState {
    /// Power-up state: all Off, direction cleared, unpowered, step zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phases: Phases::ALL_OFF,
            direction: false,
            powered: false,
            step_count: 0,
        }
    }
}

/// Phases seen at the end of the previous invariant check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    previous: Phases,
}

impl HistorySnapshot {
    /// Snapshot before any check: all Off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: Phases::ALL_OFF,
        }
    }

    /// Snapshot seeded with explicit phases.
    #[must_use]
    pub const fn with_phases(previous: Phases) -> Self {
        Self { previous }
    }

    /// Previously observed phases.
    #[must_use]
    pub const fn phases(&self) -> Phases {
        self.previous
    }

    /// Replace the snapshot with freshly observed phases.
    pub fn record(&mut self, observed: Phases) {
        self.previous = observed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_dark_and_unpowered() {
        let state = IntersectionState::new();
        assert_eq!(state.phases, Phases::ALL_OFF);
        assert!(!state.direction);
        assert!(!state.powered);
        assert_eq!(state.step_count, 0);
        assert_eq!(state, IntersectionState::default());
    }

    #[test]
    fn phases_get_by_light() {
        let phases = Phases {
            a: Phase::Green,
            b: Phase::Red,
            c: Phase::Red,
            d: Phase::Green,
        };
        assert_eq!(phases.get(Light::A), Phase::Green);
        assert_eq!(phases.get(Light::B), Phase::Red);
        assert_eq!(phases.get(Light::C), Phase::Red);
        assert_eq!(phases.get(Light::D), Phase::Green);
    }

    #[test]
    fn history_starts_off_and_records() {
        let mut history = HistorySnapshot::new();
        assert_eq!(history.phases(), Phases::ALL_OFF);
        history.record(Phases::uniform(Phase::Yellow));
        for light in Light::ALL {
            assert_eq!(history.phases().get(light), Phase::Yellow);
        }
    }
}
