//! Error types.

use thiserror::Error;

use crate::invariants::Violation;

/// Failures surfaced by the driver loop.
#[derive(Debug, Error)]
pub enum SignalError {
    /// A safety predicate failed under the halting policy.
    #[error(
        "safety invariant violated at step {step}: {count} predicate(s) failed",
        count = .violations.len()
    )]
    InvariantViolation {
        step: u64,
        violations: Vec<Violation>,
    },
    /// An input, output or reporting collaborator failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl SignalError {
    /// Returns true for the halt signal raised by a failed check.
    #[must_use]
    pub const fn is_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }

    /// Violations carried by the halt signal, empty for other errors.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::InvariantViolation { violations, .. } => violations,
            Self::Io(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::Predicate;
    use crate::state::Phases;

    #[test]
    fn violation_message_counts_predicates() {
        let v = Violation {
            step: 4,
            predicate: Predicate::MirrorAd,
            previous: Phases::ALL_OFF,
            observed: Phases::ALL_OFF,
        };
        let err = SignalError::InvariantViolation {
            step: 4,
            violations: vec![v, v],
        };
        assert!(err.is_violation());
        assert_eq!(err.violations().len(), 2);
        assert_eq!(
            err.to_string(),
            "safety invariant violated at step 4: 2 predicate(s) failed"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: SignalError = std::io::Error::other("boom").into();
        assert!(!err.is_violation());
        assert!(err.violations().is_empty());
        assert_eq!(err.to_string(), "io: boom");
    }
}
