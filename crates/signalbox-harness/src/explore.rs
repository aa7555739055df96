//! Exhaustive reachability exploration.
//!
//! The exploratory input realization: instead of reading a sample, every step
//! branches on both `0` and `1`. Exploration is breadth-first over
//! (phases, direction, checker history), so the first violation found comes
//! with a shortest input sequence reaching it. The step counter and the
//! last sampled input are excluded from the key because neither influences
//! future phases or checks.

use std::collections::{HashSet, VecDeque};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use signalbox_core::{Intersection, IntersectionState, InvariantChecker, Light, Phases, Violation};

use crate::input::render_bits;

/// Exploration failures.
#[derive(Debug, Error)]
pub enum ExploreError {
    #[error("depth bound must be at least 1, got {0}")]
    InvalidDepth(usize),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StateKey {
    phases: Phases,
    direction: bool,
    history: Phases,
}

impl StateKey {
    fn of(automaton: &Intersection, checker: &InvariantChecker) -> Self {
        let state = automaton.state();
        Self {
            phases: state.phases,
            direction: state.direction,
            history: checker.history().phases(),
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for light in Light::ALL {
            let _ = write!(
                out,
                "{}={}/{} ",
                light.label(),
                self.phases.get(light),
                self.history.get(light)
            );
        }
        let _ = write!(out, "dir={}", self.direction);
        out
    }
}

struct Node {
    automaton: Intersection,
    checker: InvariantChecker,
    inputs: Vec<bool>,
}

/// Shortest input sequence that reaches a failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterexample {
    /// Samples fed after the initial check. Empty if the initial check failed.
    pub inputs: Vec<bool>,
    /// Step at which the check failed.
    pub step: u64,
    /// Every predicate that failed at that step.
    pub violations: Vec<Violation>,
}

impl Counterexample {
    /// Inputs as a `0`/`1` script.
    #[must_use]
    pub fn script(&self) -> String {
        render_bits(&self.inputs)
    }
}

/// Result of an exploration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationReport {
    /// Distinct states discovered, including the start state.
    pub states: usize,
    /// Steps taken across all branches.
    pub transitions: usize,
    /// Greatest depth at which a new state was discovered.
    pub max_depth: usize,
    /// Depth bound in force, if any.
    pub depth_bound: Option<usize>,
    /// True if the frontier emptied, so every reachable state was visited.
    pub complete: bool,
    /// SHA-256 over the sorted rendered state set.
    pub state_digest: String,
    /// Shortest path to a violation, if one is reachable.
    pub counterexample: Option<Counterexample>,
}

impl ExplorationReport {
    /// Returns true if no reachable state violates an invariant.
    ///
    /// Only a proof when `complete` is also true.
    #[must_use]
    pub fn safe(&self) -> bool {
        self.counterexample.is_none()
    }

    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# signalbox Reachability Report\n\n");
        let _ = writeln!(out, "- States: {}", self.states);
        let _ = writeln!(out, "- Transitions: {}", self.transitions);
        let _ = writeln!(out, "- Max depth: {}", self.max_depth);
        match self.depth_bound {
            Some(bound) => {
                let _ = writeln!(out, "- Depth bound: {bound}");
            }
            None => out.push_str("- Depth bound: none\n"),
        }
        let _ = writeln!(out, "- Complete: {}", self.complete);
        let _ = writeln!(out, "- State digest: `{}`\n", self.state_digest);

        match &self.counterexample {
            None if self.complete => out.push_str("**Result:** no bad state is reachable.\n"),
            None => out.push_str("**Result:** no bad state found within the depth bound.\n"),
            Some(cex) => {
                let _ = writeln!(
                    out,
                    "**Result:** bad state reachable at step {} with inputs `{}`.\n",
                    cex.step,
                    cex.script()
                );
                out.push_str("| Step | Predicate | Message |\n");
                out.push_str("|------|-----------|---------|\n");
                for v in &cex.violations {
                    let _ = writeln!(
                        out,
                        "| {} | {} | {} |",
                        v.step,
                        v.predicate.id(),
                        v.predicate.message()
                    );
                }
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Breadth-first explorer over both input choices at every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Explorer {
    start: Intersection,
    checker: InvariantChecker,
    depth_bound: Option<usize>,
}

impl Explorer {
    /// Explorer from the power-up state with an all-Off history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explorer from a seeded state and checker.
    #[must_use]
    pub fn from_parts(start: IntersectionState, checker: InvariantChecker) -> Self {
        Self {
            start: Intersection::from_state(start),
            checker,
            depth_bound: None,
        }
    }

    /// Limit exploration to paths of at most `bound` steps.
    pub fn with_depth_bound(mut self, bound: Option<usize>) -> Result<Self, ExploreError> {
        if let Some(0) = bound {
            return Err(ExploreError::InvalidDepth(0));
        }
        self.depth_bound = bound;
        Ok(self)
    }

    /// Explore until the frontier empties, the bound is hit, or a violation
    /// is found.
    #[must_use]
    pub fn run(&self) -> ExplorationReport {
        let mut checker = self.checker;
        let initial = checker.check(self.start.state());

        let start_key = StateKey::of(&self.start, &checker);
        let mut seen: HashSet<StateKey> = HashSet::from([start_key]);
        let mut transitions = 0;
        let mut max_depth = 0;
        let mut truncated = false;

        let mut counterexample = (!initial.holds()).then(|| Counterexample {
            inputs: Vec::new(),
            step: initial.step,
            violations: initial.violations,
        });

        let mut queue = VecDeque::from([Node {
            automaton: self.start,
            checker,
            inputs: Vec::new(),
        }]);

        'search: while counterexample.is_none() {
            let Some(node) = queue.pop_front() else {
                break;
            };
            if self.depth_bound.is_some_and(|bound| node.inputs.len() >= bound) {
                truncated = true;
                continue;
            }
            for powered in [false, true] {
                let mut automaton = node.automaton;
                let mut checker = node.checker;
                automaton.step(powered);
                let report = checker.check(automaton.state());
                transitions += 1;

                let mut inputs = node.inputs.clone();
                inputs.push(powered);

                if !report.holds() {
                    counterexample = Some(Counterexample {
                        inputs,
                        step: report.step,
                        violations: report.violations,
                    });
                    break 'search;
                }

                if seen.insert(StateKey::of(&automaton, &checker)) {
                    max_depth = max_depth.max(inputs.len());
                    queue.push_back(Node {
                        automaton,
                        checker,
                        inputs,
                    });
                }
            }
        }

        let complete = counterexample.is_none() && !truncated && queue.is_empty();
        ExplorationReport {
            states: seen.len(),
            transitions,
            max_depth,
            depth_bound: self.depth_bound,
            complete,
            state_digest: digest(&seen),
            counterexample,
        }
    }
}

fn digest(states: &HashSet<StateKey>) -> String {
    let mut lines: Vec<String> = states.iter().map(StateKey::render).collect();
    lines.sort_unstable();
    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}
