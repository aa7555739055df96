//! Driver loop.
//!
//! The driver owns one automaton and one checker and runs them against three
//! injected collaborators: an input source, a step observer and a violation
//! reporter. It has two phases. `Init` runs once: show the initial state and
//! check it. `Running` repeats sample, step, check until the input source
//! ends, the step limit is reached, or a violation halts the loop.

use serde::{Deserialize, Serialize};

use crate::config::{DriverConfig, ReportMode};
use crate::engine::{Intersection, StepRecord};
use crate::error::SignalError;
use crate::invariants::{CheckReport, InvariantChecker, Violation};
use crate::metrics::{DriverMetrics, MetricsSnapshot};

/// Supplies one power sample per call.
///
/// `Ok(None)` means the source is exhausted and the loop should stop.
/// Implementations normalize malformed input themselves; the automaton only
/// ever sees `true` or `false`.
pub trait InputSource {
    fn sample(&mut self) -> Result<Option<bool>, SignalError>;
}

/// Receives the phases after the initial state and after every step.
pub trait StepObserver {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError>;
}

/// Receives every failed check.
pub trait ViolationReporter {
    fn report(&mut self, report: &CheckReport, mode: ReportMode) -> Result<(), SignalError>;
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn observe(&mut self, _record: &StepRecord) -> Result<(), SignalError> {
        Ok(())
    }
}

impl ViolationReporter for NoopObserver {
    fn report(&mut self, _report: &CheckReport, _mode: ReportMode) -> Result<(), SignalError> {
        Ok(())
    }
}

impl StepObserver for Vec<StepRecord> {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError> {
        self.push(*record);
        Ok(())
    }
}

impl ViolationReporter for Vec<Violation> {
    fn report(&mut self, report: &CheckReport, _mode: ReportMode) -> Result<(), SignalError> {
        self.extend_from_slice(&report.violations);
        Ok(())
    }
}

impl<T: StepObserver + ?Sized> StepObserver for &mut T {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError> {
        (**self).observe(record)
    }
}

impl<T: ViolationReporter + ?Sized> ViolationReporter for &mut T {
    fn report(&mut self, report: &CheckReport, mode: ReportMode) -> Result<(), SignalError> {
        (**self).report(report, mode)
    }
}

impl<T: InputSource + ?Sized> InputSource for &mut T {
    fn sample(&mut self) -> Result<Option<bool>, SignalError> {
        (**self).sample()
    }
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn sample(&mut self) -> Result<Option<bool>, SignalError> {
        (**self).sample()
    }
}

impl<T: StepObserver + ?Sized> StepObserver for Box<T> {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError> {
        (**self).observe(record)
    }
}

impl<T: ViolationReporter + ?Sized> ViolationReporter for Box<T> {
    fn report(&mut self, report: &CheckReport, mode: ReportMode) -> Result<(), SignalError> {
        (**self).report(report, mode)
    }
}

impl<T: StepObserver> StepObserver for Option<T> {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError> {
        match self {
            Some(inner) => inner.observe(record),
            None => Ok(()),
        }
    }
}

impl<T: ViolationReporter> ViolationReporter for Option<T> {
    fn report(&mut self, report: &CheckReport, mode: ReportMode) -> Result<(), SignalError> {
        match self {
            Some(inner) => inner.report(report, mode),
            None => Ok(()),
        }
    }
}

/// Lifecycle phase of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverPhase {
    /// Initial state not yet shown or checked.
    Init,
    /// Sampling, stepping and checking.
    Running,
}

/// Why a run ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The input source returned end of input.
    InputExhausted,
    /// The configured step limit was reached.
    StepLimit,
}

/// Summary of a run that ended without a halting violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Why the loop stopped.
    pub stop_reason: StopReason,
    /// Final step record.
    pub last: StepRecord,
    /// Violations reported under the continue policy.
    pub violations: Vec<Violation>,
    /// Counters at the end of the run.
    pub metrics: MetricsSnapshot,
}

/// Sample, step, check loop over injected collaborators.
pub struct Driver<I, O, R> {
    automaton: Intersection,
    checker: InvariantChecker,
    input: I,
    observer: O,
    reporter: R,
    config: DriverConfig,
    metrics: DriverMetrics,
    phase: DriverPhase,
    reported: Vec<Violation>,
}

impl<I, O, R> Driver<I, O, R>
where
    I: InputSource,
    O: StepObserver,
    R: ViolationReporter,
{
    /// Driver over a fresh automaton and checker.
    pub fn new(input: I, observer: O, reporter: R, config: DriverConfig) -> Self {
        Self::from_parts(
            Intersection::new(),
            InvariantChecker::new(),
            input,
            observer,
            reporter,
            config,
        )
    }

    /// Driver over a seeded automaton and checker.
    pub fn from_parts(
        automaton: Intersection,
        checker: InvariantChecker,
        input: I,
        observer: O,
        reporter: R,
        config: DriverConfig,
    ) -> Self {
        Self {
            automaton,
            checker,
            input,
            observer,
            reporter,
            config,
            metrics: DriverMetrics::new(),
            phase: DriverPhase::Init,
            reported: Vec::new(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// The automaton being driven.
    #[must_use]
    pub fn automaton(&self) -> &Intersection {
        &self.automaton
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Live counters.
    #[must_use]
    pub fn metrics(&self) -> &DriverMetrics {
        &self.metrics
    }

    /// Violations reported so far under the continue policy.
    #[must_use]
    pub fn reported(&self) -> &[Violation] {
        &self.reported
    }

    /// Release the collaborators.
    pub fn into_parts(self) -> (I, O, R) {
        (self.input, self.observer, self.reporter)
    }

    /// Show and check the initial state. Moves the driver to `Running`.
    ///
    /// Calling it again after the first time is a no-op returning a passing
    /// report, so `run` can be resumed.
    pub fn init(&mut self) -> Result<CheckReport, SignalError> {
        if self.phase == DriverPhase::Running {
            return Ok(CheckReport {
                step: self.automaton.state().step_count,
                violations: Vec::new(),
            });
        }
        self.phase = DriverPhase::Running;
        self.observer.observe(&self.automaton.record())?;
        self.check()
    }

    /// One sample, step, check cycle. `Ok(None)` when input is exhausted.
    pub fn tick(&mut self) -> Result<Option<CheckReport>, SignalError> {
        if self.phase == DriverPhase::Init {
            self.init()?;
        }
        let Some(powered) = self.input.sample()? else {
            return Ok(None);
        };
        self.metrics.record_sample(powered);

        let record = self.automaton.step(powered);
        DriverMetrics::inc(&self.metrics.steps);
        self.observer.observe(&record)?;

        self.check().map(Some)
    }

    /// Run until input ends, the step limit is hit, or a violation halts.
    pub fn run(&mut self) -> Result<RunSummary, SignalError> {
        self.init()?;
        let stop_reason = loop {
            if let Some(limit) = self.config.max_steps
                && DriverMetrics::get(&self.metrics.steps) >= limit
            {
                break StopReason::StepLimit;
            }
            if self.tick()?.is_none() {
                break StopReason::InputExhausted;
            }
        };
        Ok(RunSummary {
            stop_reason,
            last: self.automaton.record(),
            violations: self.reported.clone(),
            metrics: self.metrics.snapshot(),
        })
    }

    fn check(&mut self) -> Result<CheckReport, SignalError> {
        let report = self.checker.check(self.automaton.state());
        DriverMetrics::inc(&self.metrics.checks);
        if report.holds() {
            return Ok(report);
        }

        DriverMetrics::inc(&self.metrics.failed_checks);
        DriverMetrics::add(&self.metrics.violations, report.violations.len() as u64);
        self.reporter.report(&report, self.config.report_mode)?;

        if self.config.policy.halts() {
            return Err(SignalError::InvariantViolation {
                step: report.step,
                violations: report.violations,
            });
        }
        self.reported.extend_from_slice(&report.violations);
        Ok(report)
    }
}
