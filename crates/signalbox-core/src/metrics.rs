//! Atomic counters for driver observability.
//!
//! All counters use relaxed ordering. They are diagnostic, not
//! synchronization primitives.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Per-driver operation counters.
#[derive(Debug)]
pub struct DriverMetrics {
    /// Steps executed.
    pub steps: AtomicU64,
    /// Invariant checks executed, including the initial one.
    pub checks: AtomicU64,
    /// Checks that failed at least one predicate.
    pub failed_checks: AtomicU64,
    /// Individual predicate failures.
    pub violations: AtomicU64,
    /// Input samples with power on.
    pub power_on_samples: AtomicU64,
    /// Input samples with power off.
    pub power_off_samples: AtomicU64,
}

impl DriverMetrics {
    /// Create a new zeroed metrics instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steps: AtomicU64::new(0),
            checks: AtomicU64::new(0),
            failed_checks: AtomicU64::new(0),
            violations: AtomicU64::new(0),
            power_on_samples: AtomicU64::new(0),
            power_off_samples: AtomicU64::new(0),
        }
    }

    /// Increment a counter by 1.
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment a counter by `n`.
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Read a counter value.
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    /// Record one input sample.
    pub fn record_sample(&self, powered: bool) {
        if powered {
            Self::inc(&self.power_on_samples);
        } else {
            Self::inc(&self.power_off_samples);
        }
    }

    /// Snapshot all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            steps: Self::get(&self.steps),
            checks: Self::get(&self.checks),
            failed_checks: Self::get(&self.failed_checks),
            violations: Self::get(&self.violations),
            power_on_samples: Self::get(&self.power_on_samples),
            power_off_samples: Self::get(&self.power_off_samples),
        }
    }
}

impl Default for DriverMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of all driver counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub steps: u64,
    pub checks: u64,
    pub failed_checks: u64,
    pub violations: u64,
    pub power_on_samples: u64,
    pub power_off_samples: u64,
}
