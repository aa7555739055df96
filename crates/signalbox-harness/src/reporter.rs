//! Console violation reporter.

use std::io::Write;

use signalbox_core::{CheckReport, ReportMode, SignalError, ViolationReporter};

/// Writes diagnostics for failed checks.
///
/// Silent mode writes nothing; the failure signal still reaches the driver.
/// Verbose mode writes one `[step] message` line per failed predicate.
pub struct ConsoleReporter<W> {
    out: W,
    failed_checks: u64,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            failed_checks: 0,
        }
    }

    /// Failed checks seen, whatever the mode.
    #[must_use]
    pub fn failed_checks(&self) -> u64 {
        self.failed_checks
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ViolationReporter for ConsoleReporter<W> {
    fn report(&mut self, report: &CheckReport, mode: ReportMode) -> Result<(), SignalError> {
        self.failed_checks += 1;
        if !mode.is_verbose() {
            return Ok(());
        }
        for violation in &report.violations {
            writeln!(self.out, "{violation}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}
