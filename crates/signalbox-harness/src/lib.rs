//! Console driver, reachability explorer and reporting for signalbox.
//!
//! This crate provides:
//! - Input sources: interactive console and scripted samples
//! - Display: one status line per step
//! - Reporters: console diagnostics and a structured JSONL audit log
//! - Explorer: breadth-first enumeration of every execution over {0, 1}
//! - Replay: run a counterexample through the real driver loop
//! - Report generation: human-readable + machine-readable run and
//!   reachability reports

#![forbid(unsafe_code)]

pub mod display;
pub mod explore;
pub mod input;
pub mod replay;
pub mod report;
pub mod reporter;
pub mod structured_log;

pub use display::{ConsoleDisplay, format_record};
pub use explore::{Counterexample, ExplorationReport, ExploreError, Explorer};
pub use input::{ConsoleInput, ParseScriptError, ScriptedInput, parse_bits, render_bits};
pub use replay::{ReplayOutcome, replay};
pub use report::{RunReport, RunStatus};
pub use reporter::ConsoleReporter;
pub use structured_log::{LogEmitter, LogEntry, LogLevel, LogReporter, Outcome, SharedLog, Tee};
