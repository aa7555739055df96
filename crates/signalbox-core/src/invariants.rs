//! Safety invariant checker.
//!
//! Seven predicates are evaluated after every step and once against the
//! initial state. All of them are always evaluated so each failure is
//! individually visible, and the history snapshot is overwritten afterwards
//! whether or not anything failed. The first check therefore compares the
//! initial phases against an all-Off history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::phase::Phase;
use crate::rules::valid_successor;
use crate::state::{HistorySnapshot, IntersectionState, Light, Phases};

/// One safety predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Light A green implies the direction flag is clear.
    GreenClearsDirection,
    /// Light D shows the same phase as light A.
    MirrorAd,
    /// Light B shows the same phase as light C.
    MirrorBc,
    /// The light moved along the legal-successor relation.
    Sequence(Light),
}

impl Predicate {
    /// All predicates in evaluation order.
    pub const ALL: [Self; 7] = [
        Self::GreenClearsDirection,
        Self::MirrorAd,
        Self::MirrorBc,
        Self::Sequence(Light::A),
        Self::Sequence(Light::B),
        Self::Sequence(Light::C),
        Self::Sequence(Light::D),
    ];

    /// Stable identifier used in logs and reports.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::GreenClearsDirection => "green_clears_direction",
            Self::MirrorAd => "mirror_a_d",
            Self::MirrorBc => "mirror_b_c",
            Self::Sequence(Light::A) => "sequence_a",
            Self::Sequence(Light::B) => "sequence_b",
            Self::Sequence(Light::C) => "sequence_c",
            Self::Sequence(Light::D) => "sequence_d",
        }
    }

    /// Diagnostic message for a failure of this predicate.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::GreenClearsDirection => {
                "When light A is green, the direction has to be false!"
            }
            Self::MirrorAd => "Violation of opposing equality property for A<->D!",
            Self::MirrorBc => "Violation of opposing equality property for B<->C!",
            Self::Sequence(Light::A) => "Violation of sequence for A!",
            Self::Sequence(Light::B) => "Violation of sequence for B!",
            Self::Sequence(Light::C) => "Violation of sequence for C!",
            Self::Sequence(Light::D) => "Violation of sequence for D!",
        }
    }

    /// Evaluate against the current state and previously observed phases.
    #[must_use]
    pub fn holds(self, state: &IntersectionState, previous: Phases) -> bool {
        let phases = state.phases;
        match self {
            Self::GreenClearsDirection => !(phases.a == Phase::Green && state.direction),
            Self::MirrorAd => phases.a == phases.d,
            Self::MirrorBc => phases.b == phases.c,
            Self::Sequence(light) => valid_successor(previous.get(light), phases.get(light)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A failed predicate at a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Step counter when the check ran.
    pub step: u64,
    /// The predicate that failed.
    pub predicate: Predicate,
    /// Phases observed by the previous check.
    pub previous: Phases,
    /// Phases observed by this check.
    pub observed: Phases,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:05}] {}", self.step, self.predicate.message())
    }
}

/// Outcome of one invariant check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Step counter when the check ran.
    pub step: u64,
    /// Failed predicates, in evaluation order.
    pub violations: Vec<Violation>,
}

impl CheckReport {
    /// Returns true if every predicate held.
    #[must_use]
    pub fn holds(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns true if the given predicate failed.
    #[must_use]
    pub fn failed(&self, predicate: Predicate) -> bool {
        self.violations.iter().any(|v| v.predicate == predicate)
    }
}

/// Stateful checker holding the history snapshot between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InvariantChecker {
    history: HistorySnapshot,
}

impl InvariantChecker {
    /// Checker whose history is all Off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            history: HistorySnapshot::new(),
        }
    }

    /// Checker seeded with explicit history.
    #[must_use]
    pub const fn with_history(history: HistorySnapshot) -> Self {
        Self { history }
    }

    /// Current history snapshot.
    #[must_use]
    pub const fn history(&self) -> &HistorySnapshot {
        &self.history
    }

    /// Evaluate every predicate, then record the observed phases.
    pub fn check(&mut self, state: &IntersectionState) -> CheckReport {
        let previous = self.history.phases();
        let observed = state.phases;

        let outcomes = Predicate::ALL.map(|predicate| (predicate, predicate.holds(state, previous)));
        let violations = outcomes
            .iter()
            .filter(|(_, held)| !held)
            .map(|&(predicate, _)| Violation {
                step: state.step_count,
                predicate,
                previous,
                observed,
            })
            .collect();

        self.history.record(observed);

        CheckReport {
            step: state.step_count,
            violations,
        }
    }

    /// Boolean form of [`check`](Self::check): true iff all predicates held.
    pub fn check_invariants(&mut self, state: &IntersectionState) -> bool {
        self.check(state).holds()
    }
}
