//! Counterexample replay through the real driver loop.

use serde::{Deserialize, Serialize};

use signalbox_core::{
    Driver, DriverConfig, Intersection, InvariantChecker, SignalError, StepRecord, Violation,
    ViolationPolicy,
};

use crate::input::ScriptedInput;

/// What happened when a script was replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    /// Every record the driver emitted, starting with the initial state.
    pub records: Vec<StepRecord>,
    /// Step of the halting violation, if one fired.
    pub halted_at: Option<u64>,
    /// Violations that halted the run.
    pub violations: Vec<Violation>,
}

impl ReplayOutcome {
    /// Returns true if the script ran to the end without a violation.
    #[must_use]
    pub fn clean(&self) -> bool {
        self.halted_at.is_none()
    }
}

/// Replay `inputs` from the power-up state with the halting policy.
pub fn replay(inputs: &[bool]) -> Result<ReplayOutcome, SignalError> {
    replay_from(Intersection::new(), InvariantChecker::new(), inputs)
}

/// Replay `inputs` from a seeded automaton and checker.
///
/// A halting violation is part of the outcome, not an error; only
/// collaborator failures are returned as `Err`.
pub fn replay_from(
    automaton: Intersection,
    checker: InvariantChecker,
    inputs: &[bool],
) -> Result<ReplayOutcome, SignalError> {
    let mut records: Vec<StepRecord> = Vec::new();
    let config = DriverConfig::default().with_policy(ViolationPolicy::Halt);
    let mut driver = Driver::from_parts(
        automaton,
        checker,
        ScriptedInput::new(inputs.iter().copied()),
        &mut records,
        signalbox_core::NoopObserver,
        config,
    );

    let result = driver.run();
    drop(driver);
    match result {
        Ok(_) => Ok(ReplayOutcome {
            records,
            halted_at: None,
            violations: Vec::new(),
        }),
        Err(SignalError::InvariantViolation { step, violations }) => Ok(ReplayOutcome {
            records,
            halted_at: Some(step),
            violations,
        }),
        Err(err) => Err(err),
    }
}
