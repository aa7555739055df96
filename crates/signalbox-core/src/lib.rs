//! Four-light intersection automaton with continuous safety checking.
//!
//! Two driven lights (A and C) face opposing lanes and cycle through their
//! phases under a shared direction flag; B and D mirror C and A. Every logical
//! step is followed by an invariant check over the current and previously
//! observed phases.
//!
//! # Architecture
//!
//! - **Phases** (`phase`): light colors and their display labels
//! - **Transition rules** (`rules`): per-light successor functions and the
//!   legal-successor relation
//! - **State** (`state`): intersection record, light positions, history snapshot
//! - **Step engine** (`engine`): one synchronized tick of all four lights
//! - **Invariant checker** (`invariants`): the seven safety predicates
//! - **Driver** (`driver`): sample, step, check loop over injected collaborators
//! - **Configuration** (`config`): report mode and violation policy
//! - **Metrics** (`metrics`): atomic counters for run observability
//! - **Errors** (`error`): the halt signal and collaborator failures

#![forbid(unsafe_code)]

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod invariants;
pub mod metrics;
pub mod phase;
pub mod rules;
pub mod state;

pub use config::{DriverConfig, ReportMode, ViolationPolicy};
pub use driver::{
    Driver, DriverPhase, InputSource, NoopObserver, RunSummary, StepObserver, StopReason,
    ViolationReporter,
};
pub use engine::{Intersection, StepRecord};
pub use error::SignalError;
pub use invariants::{CheckReport, InvariantChecker, Predicate, Violation};
pub use metrics::{DriverMetrics, MetricsSnapshot};
pub use phase::Phase;
pub use rules::{next_phase_a, next_phase_c, valid_successor};
pub use state::{HistorySnapshot, IntersectionState, Light, Phases};
