//! Structured JSONL audit log for driver runs.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines with sequential trace ids.
//! - [`LogReporter`]: observer + reporter that logs every step and violation.
//! - [`SharedLog`]: one `LogReporter` handed to the driver in both roles.
//! - [`validate_log_line`] / [`validate_log_file`]: schema checks.

use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use signalbox_core::{
    CheckReport, Phases, ReportMode, SignalError, StepObserver, StepRecord, ViolationReporter,
};

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Check outcome carried by `check` and `violation` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phases: Option<Phases>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub powered: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<bool>,
    /// Stable predicate id for violation events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            step: None,
            phases: None,
            powered: None,
            direction: None,
            predicate: None,
            message: None,
            outcome: None,
            details: None,
        }
    }

    /// Attach the step number, phases and flags of a record.
    #[must_use]
    pub fn with_record(mut self, record: &StepRecord) -> Self {
        self.step = Some(record.step_number);
        self.phases = Some(record.phases);
        self.powered = Some(record.powered);
        self.direction = Some(record.direction);
        self
    }

    /// Set the step number.
    #[must_use]
    pub fn with_step(mut self, step: u64) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the failed predicate id and its message.
    #[must_use]
    pub fn with_predicate(mut self, id: impl Into<String>, message: impl Into<String>) -> Self {
        self.predicate = Some(id.into());
        self.message = Some(message.into());
        self
    }

    /// Set the outcome.
    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Set free-form details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

/// Writes structured JSONL log entries.
pub struct LogEmitter<W> {
    writer: W,
    seq: u64,
    run_id: String,
}

impl LogEmitter<std::io::BufWriter<std::fs::File>> {
    /// Create an emitter that writes to a file.
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(std::io::BufWriter::new(file), run_id))
    }
}

impl LogEmitter<Vec<u8>> {
    /// Create an emitter that writes to an in-memory buffer (for testing).
    #[must_use]
    pub fn to_buffer(run_id: &str) -> Self {
        Self::new(Vec::new(), run_id)
    }
}

impl<W: Write> LogEmitter<W> {
    /// Create an emitter over any writer.
    pub fn new(writer: W, run_id: &str) -> Self {
        Self {
            writer,
            seq: 0,
            run_id: run_id.to_string(),
        }
    }

    /// Generate the next trace ID.
    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("signalbox::{}::{:05}", self.run_id, self.seq)
    }

    /// Emit a log entry with an auto-generated trace_id.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let trace_id = self.next_trace_id();
        let entry = LogEntry::new(trace_id, level, event);
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")?;
        Ok(entry)
    }

    /// Emit a fully-populated log entry. An empty trace id is filled in.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    /// Entries emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.seq
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Release the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ---------------------------------------------------------------------------
// Driver collaborators
// ---------------------------------------------------------------------------

/// Logs every step (`step` events) and every failed predicate (`violation`
/// events). Violations are logged in both report modes; the mode is recorded
/// in `details`.
pub struct LogReporter<W> {
    emitter: LogEmitter<W>,
}

impl<W: Write> LogReporter<W> {
    pub fn new(emitter: LogEmitter<W>) -> Self {
        Self { emitter }
    }

    pub fn into_emitter(self) -> LogEmitter<W> {
        self.emitter
    }
}

impl<W: Write> StepObserver for LogReporter<W> {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError> {
        let entry = LogEntry::new(String::new(), LogLevel::Debug, "step").with_record(record);
        self.emitter.emit_entry(entry)?;
        Ok(())
    }
}

impl<W: Write> ViolationReporter for LogReporter<W> {
    fn report(&mut self, report: &CheckReport, mode: ReportMode) -> Result<(), SignalError> {
        for violation in &report.violations {
            let entry = LogEntry::new(String::new(), LogLevel::Error, "violation")
                .with_step(violation.step)
                .with_predicate(violation.predicate.id(), violation.predicate.message())
                .with_outcome(Outcome::Fail)
                .with_details(serde_json::json!({
                    "mode": mode.as_str(),
                    "previous": violation.previous,
                    "observed": violation.observed,
                }));
            self.emitter.emit_entry(entry)?;
        }
        self.emitter.flush()?;
        Ok(())
    }
}

/// Cloneable handle to one [`LogReporter`], so a single log file can be the
/// driver's observer and its reporter at once.
pub struct SharedLog<W>(Rc<RefCell<LogReporter<W>>>);

impl<W> Clone for SharedLog<W> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<W: Write> SharedLog<W> {
    pub fn new(reporter: LogReporter<W>) -> Self {
        Self(Rc::new(RefCell::new(reporter)))
    }

    /// Entries written so far across every handle.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.0.borrow().emitter.emitted()
    }

    /// Flush the log.
    pub fn flush(&self) -> std::io::Result<()> {
        self.0.borrow_mut().emitter.flush()
    }

    /// Recover the reporter once every other handle is gone.
    pub fn try_unwrap(self) -> Result<LogReporter<W>, Self> {
        Rc::try_unwrap(self.0).map(RefCell::into_inner).map_err(Self)
    }

    /// Emit a free-standing entry such as a run summary.
    pub fn emit_entry(&self, entry: LogEntry) -> std::io::Result<()> {
        self.0.borrow_mut().emitter.emit_entry(entry)
    }
}

impl<W: Write> StepObserver for SharedLog<W> {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError> {
        self.0.borrow_mut().observe(record)
    }
}

impl<W: Write> ViolationReporter for SharedLog<W> {
    fn report(&mut self, report: &CheckReport, mode: ReportMode) -> Result<(), SignalError> {
        self.0.borrow_mut().report(report, mode)
    }
}

/// Fans a step or violation out to two collaborators.
pub struct Tee<A, B>(pub A, pub B);

impl<A: StepObserver, B: StepObserver> StepObserver for Tee<A, B> {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError> {
        self.0.observe(record)?;
        self.1.observe(record)
    }
}

impl<A: ViolationReporter, B: ViolationReporter> ViolationReporter for Tee<A, B> {
    fn report(&mut self, report: &CheckReport, mode: ReportMode) -> Result<(), SignalError> {
        self.0.report(report, mode)?;
        self.1.report(report, mode)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();
    let error = |field: &str, message: String| LogValidationError {
        line_number,
        field: field.to_string(),
        message,
    };

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Err(vec![error("<json>", format!("invalid JSON: {e}"))]),
    };

    let Some(obj) = value.as_object() else {
        return Err(vec![error("<root>", "expected JSON object".to_string())]);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            errors.push(error(field, "required field missing".to_string()));
        }
    }

    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !["trace", "debug", "info", "warn", "error"].contains(&level)
    {
        errors.push(error("level", format!("invalid level: '{level}'")));
    }

    if let Some(outcome) = obj.get("outcome").and_then(|v| v.as_str())
        && !["pass", "fail"].contains(&outcome)
    {
        errors.push(error("outcome", format!("invalid outcome: '{outcome}'")));
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && !trace_id.contains("::")
    {
        errors.push(error(
            "trace_id",
            format!("trace_id should be 'signalbox::<run>::<seq>': '{trace_id}'"),
        ));
    }

    // Violation events must name the predicate they report.
    if obj.get("event").and_then(|v| v.as_str()) == Some("violation")
        && !obj.get("predicate").is_some_and(serde_json::Value::is_string)
    {
        errors.push(error(
            "predicate",
            "violation events must include the predicate id".to_string(),
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(value).map_err(|e| vec![error("<schema>", format!("{e}"))])
}

/// Validate an entire JSONL file. Returns the number of valid lines and all
/// errors found.
pub fn validate_log_file(path: &Path) -> Result<(usize, Vec<LogValidationError>), std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(validate_log_text(&content))
}

/// Validate JSONL text. Blank lines are ignored.
#[must_use]
pub fn validate_log_text(content: &str) -> (usize, Vec<LogValidationError>) {
    let mut valid = 0;
    let mut errors = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match validate_log_line(line, i + 1) {
            Ok(_) => valid += 1,
            Err(mut errs) => errors.append(&mut errs),
        }
    }
    (valid, errors)
}

fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}Z", duration.as_secs(), duration.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalbox_core::{Light, Phase, Predicate, Violation};

    fn record() -> StepRecord {
        StepRecord {
            step_number: 2,
            phases: Phases::uniform(Phase::Yellow),
            powered: true,
            direction: false,
        }
    }

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new("signalbox::t::00001", LogLevel::Info, "run_start");
        let json = entry.to_jsonl().expect("serialize");
        let v: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(v["trace_id"], "signalbox::t::00001");
        assert_eq!(v["level"], "info");
        assert_eq!(v["event"], "run_start");
        assert!(v.get("step").is_none());
        assert!(v.get("predicate").is_none());
    }

    #[test]
    fn log_entry_with_record_fields() {
        let entry = LogEntry::new("signalbox::t::00002", LogLevel::Debug, "step").with_record(&record());
        let v: serde_json::Value =
            serde_json::from_str(&entry.to_jsonl().expect("serialize")).expect("parse");
        assert_eq!(v["step"], 2);
        assert_eq!(v["phases"]["a"], "Yellow");
        assert_eq!(v["powered"], true);
        assert_eq!(v["direction"], false);
    }

    #[test]
    fn emitter_generates_sequential_trace_ids() {
        let mut emitter = LogEmitter::to_buffer("seq");
        let first = emitter.emit(LogLevel::Info, "a").expect("emit");
        let second = emitter.emit(LogLevel::Info, "b").expect("emit");
        assert_eq!(first.trace_id, "signalbox::seq::00001");
        assert_eq!(second.trace_id, "signalbox::seq::00002");
        assert_eq!(emitter.emitted(), 2);
    }

    #[test]
    fn reporter_logs_steps_and_violations() {
        let mut reporter = LogReporter::new(LogEmitter::to_buffer("rep"));
        reporter.observe(&record()).expect("observe");
        let violation = Violation {
            step: 2,
            predicate: Predicate::Sequence(Light::D),
            previous: Phases::ALL_OFF,
            observed: Phases::uniform(Phase::Yellow),
        };
        let report = CheckReport {
            step: 2,
            violations: vec![violation],
        };
        reporter.report(&report, ReportMode::Silent).expect("report");

        let text = String::from_utf8(reporter.into_emitter().into_inner()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let step: serde_json::Value = serde_json::from_str(lines[0]).expect("parse");
        assert_eq!(step["event"], "step");
        let v: serde_json::Value = serde_json::from_str(lines[1]).expect("parse");
        assert_eq!(v["event"], "violation");
        assert_eq!(v["predicate"], "sequence_d");
        assert_eq!(v["outcome"], "fail");
        assert_eq!(v["details"]["mode"], "silent");

        let (valid, errors) = validate_log_text(&text);
        assert_eq!(valid, 2);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn validate_missing_required_field() {
        let line = r#"{"timestamp":"0.000Z","trace_id":"signalbox::x::00001","level":"info"}"#;
        let errors = validate_log_line(line, 1).expect_err("event missing");
        assert!(errors.iter().any(|e| e.field == "event"));
    }

    #[test]
    fn validate_invalid_level() {
        let line = r#"{"timestamp":"0","trace_id":"signalbox::x::00001","level":"loud","event":"e"}"#;
        let errors = validate_log_line(line, 3).expect_err("bad level");
        assert_eq!(errors[0].field, "level");
        assert_eq!(errors[0].line_number, 3);
    }

    #[test]
    fn validate_invalid_json() {
        let errors = validate_log_line("{not json", 1).expect_err("bad json");
        assert_eq!(errors[0].field, "<json>");
    }

    #[test]
    fn validate_bad_trace_id_format() {
        let line = r#"{"timestamp":"0","trace_id":"flat","level":"info","event":"e"}"#;
        let errors = validate_log_line(line, 1).expect_err("bad trace id");
        assert_eq!(errors[0].field, "trace_id");
    }

    #[test]
    fn validate_violation_without_predicate() {
        let line =
            r#"{"timestamp":"0","trace_id":"signalbox::x::00001","level":"error","event":"violation"}"#;
        let errors = validate_log_line(line, 1).expect_err("predicate missing");
        assert_eq!(errors[0].field, "predicate");
    }

    #[test]
    fn shared_log_serves_both_roles() {
        let shared = SharedLog::new(LogReporter::new(LogEmitter::to_buffer("shared")));
        let mut observer = shared.clone();
        let mut reporter = shared.clone();
        observer.observe(&record()).expect("observe");
        let report = CheckReport {
            step: 0,
            violations: vec![Violation {
                step: 0,
                predicate: Predicate::MirrorBc,
                previous: Phases::ALL_OFF,
                observed: Phases::ALL_OFF,
            }],
        };
        reporter.report(&report, ReportMode::Verbose).expect("report");
        assert_eq!(shared.emitted(), 2);
    }

    #[test]
    fn tee_forwards_to_both() {
        let mut tee = Tee(Vec::<StepRecord>::new(), Vec::<StepRecord>::new());
        tee.observe(&record()).expect("observe");
        assert_eq!(tee.0.len(), 1);
        assert_eq!(tee.1.len(), 1);
    }
}
