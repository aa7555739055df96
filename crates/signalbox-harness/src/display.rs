//! Console rendering of step records.

use std::fmt::Write as _;
use std::io::Write;

use signalbox_core::{Light, SignalError, StepObserver, StepRecord};

/// Render a step record as one status line.
///
/// `[00003] A: Red     B: Green   C: Green   D: Red`
#[must_use]
pub fn format_record(record: &StepRecord) -> String {
    let mut line = format!("[{:05}]", record.step_number);
    for light in Light::ALL {
        let phase = record.phases.get(light);
        if light == Light::D {
            let _ = write!(line, " {}: {phase}", light.label());
        } else {
            let _ = write!(line, " {}: {phase:<7}", light.label());
        }
    }
    line
}

/// Writes one status line per record.
pub struct ConsoleDisplay<W> {
    out: W,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StepObserver for ConsoleDisplay<W> {
    fn observe(&mut self, record: &StepRecord) -> Result<(), SignalError> {
        writeln!(self.out, "{}", format_record(record))?;
        Ok(())
    }
}
