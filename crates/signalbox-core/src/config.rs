//! Driver configuration.
//!
//! Two knobs control how violations surface:
//! - `SIGNALBOX_REPORT`: `silent` (default) emits nothing beyond the failure
//!   signal; `verbose` emits one diagnostic per failed predicate.
//! - `SIGNALBOX_POLICY`: `halt` (default) surfaces the first violation as an
//!   error and stops the loop, which is what a verification run wants;
//!   `continue` reports and keeps stepping, which is what a live console wants.
//!
//! Both are read once and cached. CLI flags override them per run.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// How much the violation reporter says.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Failure signal only.
    #[default]
    Silent,
    /// One message per failed predicate.
    Verbose,
}

impl ReportMode {
    /// Parse from string (case-insensitive). Unknown values fall back to silent.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "verbose" | "debug" | "diagnostic" | "loud" => Self::Verbose,
            _ => Self::Silent,
        }
    }

    /// Returns true if per-predicate diagnostics should be emitted.
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Verbose => "verbose",
        }
    }
}

/// What the driver does after reporting a violation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationPolicy {
    /// Surface the violation as an error and stop.
    #[default]
    Halt,
    /// Report and keep stepping.
    Continue,
}

impl ViolationPolicy {
    /// Parse from string (case-insensitive). Unknown values fall back to halt.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "continue" | "warn" | "log" | "production" => Self::Continue,
            _ => Self::Halt,
        }
    }

    /// Returns true if a violation stops the loop.
    #[must_use]
    pub const fn halts(self) -> bool {
        matches!(self, Self::Halt)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Halt => "halt",
            Self::Continue => "continue",
        }
    }
}

/// Per-run driver settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Reporter verbosity.
    pub report_mode: ReportMode,
    /// Reaction to a violation.
    pub policy: ViolationPolicy,
    /// Stop after this many steps. `None` runs until input ends.
    pub max_steps: Option<u64>,
}

impl DriverConfig {
    /// Settings taken from the environment, with no step limit.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            report_mode: report_mode(),
            policy: violation_policy(),
            max_steps: None,
        }
    }

    /// Override the report mode.
    #[must_use]
    pub fn with_report_mode(mut self, report_mode: ReportMode) -> Self {
        self.report_mode = report_mode;
        self
    }

    /// Override the violation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ViolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set a step limit.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }
}

static GLOBAL_REPORT_MODE: OnceLock<ReportMode> = OnceLock::new();
static GLOBAL_POLICY: OnceLock<ViolationPolicy> = OnceLock::new();

/// Configured report mode (reads env var on first call, caches thereafter).
#[must_use]
pub fn report_mode() -> ReportMode {
    *GLOBAL_REPORT_MODE.get_or_init(|| {
        std::env::var("SIGNALBOX_REPORT")
            .map(|v| ReportMode::from_str_loose(&v))
            .unwrap_or_default()
    })
}

/// Configured violation policy (reads env var on first call, caches thereafter).
#[must_use]
pub fn violation_policy() -> ViolationPolicy {
    *GLOBAL_POLICY.get_or_init(|| {
        std::env::var("SIGNALBOX_POLICY")
            .map(|v| ViolationPolicy::from_str_loose(&v))
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_report_modes() {
        assert_eq!(ReportMode::from_str_loose("verbose"), ReportMode::Verbose);
        assert_eq!(ReportMode::from_str_loose("VERBOSE"), ReportMode::Verbose);
        assert_eq!(ReportMode::from_str_loose("debug"), ReportMode::Verbose);
        assert_eq!(ReportMode::from_str_loose("silent"), ReportMode::Silent);
        assert_eq!(ReportMode::from_str_loose("bogus"), ReportMode::Silent);
    }

    #[test]
    fn parse_policies() {
        assert_eq!(ViolationPolicy::from_str_loose("halt"), ViolationPolicy::Halt);
        assert_eq!(ViolationPolicy::from_str_loose("Continue"), ViolationPolicy::Continue);
        assert_eq!(ViolationPolicy::from_str_loose("warn"), ViolationPolicy::Continue);
        assert_eq!(ViolationPolicy::from_str_loose("bogus"), ViolationPolicy::Halt);
    }

    #[test]
    fn defaults_are_silent_and_halting() {
        let config = DriverConfig::default();
        assert_eq!(config.report_mode, ReportMode::Silent);
        assert!(config.policy.halts());
        assert_eq!(config.max_steps, None);
    }

    #[test]
    fn builder_overrides() {
        let config = DriverConfig::default()
            .with_report_mode(ReportMode::Verbose)
            .with_policy(ViolationPolicy::Continue)
            .with_max_steps(Some(12));
        assert!(config.report_mode.is_verbose());
        assert!(!config.policy.halts());
        assert_eq!(config.max_steps, Some(12));
    }
}
