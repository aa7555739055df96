//! Signal transition rules.
//!
//! Lights A and C are driven; B and D copy C and A after both have moved.
//! The direction flag decides which driven light turns Green after a Yellow
//! phase, and only A's rule writes it. A restarts at Green and C at Red when
//! power returns, so the two opposing lanes never come up permissive together.

use crate::phase::Phase;

/// Next phase of light A.
///
/// Loss of power wins over every phase branch and leaves `direction`
/// untouched. Otherwise a Yellow phase resolves by the current direction and
/// flips it, and a restart from Off always lands on Green with the direction
/// cleared.
pub fn next_phase_a(current: Phase, powered: bool, direction: &mut bool) -> Phase {
    if !powered {
        return Phase::Off;
    }
    match current {
        Phase::Red => Phase::Yellow,
        Phase::Yellow => {
            if *direction {
                *direction = false;
                Phase::Green
            } else {
                *direction = true;
                Phase::Red
            }
        }
        Phase::Green => Phase::Yellow,
        Phase::Off => {
            *direction = false;
            Phase::Green
        }
    }
}

/// Next phase of light C. Reads the direction as A left it in the same step.
#[must_use]
pub const fn next_phase_c(current: Phase, powered: bool, direction: bool) -> Phase {
    if !powered {
        return Phase::Off;
    }
    match current {
        Phase::Red => Phase::Yellow,
        Phase::Yellow => {
            if direction {
                Phase::Green
            } else {
                Phase::Red
            }
        }
        Phase::Green => Phase::Yellow,
        Phase::Off => Phase::Red,
    }
}

/// Legal one-step phase graph for any single light.
///
/// Switching off is always legal. Not symmetric: Red→Green, Green→Red and
/// Off→Yellow are all rejected.
#[must_use]
pub const fn valid_successor(prev: Phase, next: Phase) -> bool {
    if matches!(next, Phase::Off) {
        return true;
    }
    match prev {
        Phase::Red => matches!(next, Phase::Yellow | Phase::Red),
        Phase::Yellow => matches!(next, Phase::Green | Phase::Red | Phase::Yellow),
        Phase::Green => matches!(next, Phase::Yellow | Phase::Green),
        Phase::Off => matches!(next, Phase::Red | Phase::Green),
    }
}
