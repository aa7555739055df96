//! Report generation for driver runs.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use signalbox_core::{DriverConfig, MetricsSnapshot, StepRecord, Violation};

use crate::display::format_record;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every check passed.
    Clean,
    /// Violations were reported and the loop kept going.
    ViolationsReported,
    /// A violation stopped the loop.
    Halted,
}

/// A run report combining configuration, outcome and counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Report title.
    pub title: String,
    /// Report mode in force.
    pub report_mode: String,
    /// Violation policy in force.
    pub policy: String,
    /// Timestamp (seconds since the epoch).
    pub timestamp: String,
    /// Outcome.
    pub status: RunStatus,
    /// Last observed state.
    pub last: Option<StepRecord>,
    /// Violations observed.
    pub violations: Vec<Violation>,
    /// Driver counters.
    pub metrics: MetricsSnapshot,
}

impl RunReport {
    /// Build a report from run results.
    #[must_use]
    pub fn new(
        config: &DriverConfig,
        status: RunStatus,
        last: Option<StepRecord>,
        violations: Vec<Violation>,
        metrics: MetricsSnapshot,
    ) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs().to_string())
            .unwrap_or_default();
        Self {
            title: String::from("signalbox Run Report"),
            report_mode: config.report_mode.as_str().to_string(),
            policy: config.policy.as_str().to_string(),
            timestamp,
            status,
            last,
            violations,
            metrics,
        }
    }

    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        let _ = writeln!(out, "- Report mode: {}", self.report_mode);
        let _ = writeln!(out, "- Policy: {}", self.policy);
        let _ = writeln!(out, "- Timestamp: {}", self.timestamp);
        let _ = writeln!(out, "- Status: {:?}", self.status);
        let _ = writeln!(out, "- Steps: {}", self.metrics.steps);
        let _ = writeln!(out, "- Checks: {}", self.metrics.checks);
        let _ = writeln!(out, "- Failed checks: {}", self.metrics.failed_checks);
        let _ = writeln!(
            out,
            "- Samples: {} on / {} off",
            self.metrics.power_on_samples, self.metrics.power_off_samples
        );
        if let Some(last) = &self.last {
            let _ = writeln!(out, "- Last state: `{}`", format_record(last));
        }

        if !self.violations.is_empty() {
            out.push_str("\n| Step | Predicate | Message |\n");
            out.push_str("|------|-----------|---------|\n");
            for v in &self.violations {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    v.step,
                    v.predicate.id(),
                    v.predicate.message()
                );
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
