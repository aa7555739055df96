//! Light phases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Color currently shown by a single traffic light.
///
/// Variant order is not meaningful. Display text comes from [`Phase::label`],
/// never from the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Stop.
    Red,
    /// Transition between Red and Green in either direction.
    Yellow,
    /// Go.
    Green,
    /// Unpowered.
    Off,
}

impl Phase {
    /// Every phase, for exhaustive sweeps.
    pub const ALL: [Self; 4] = [Self::Red, Self::Yellow, Self::Green, Self::Off];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Yellow => "Yellow",
            Self::Green => "Green",
            Self::Off => "Off",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
