//! Round lifecycle phases

use crate::core::Outcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a round currently is
///
/// `Idle -> Counting(n) -> ... -> Counting(0) -> Revealing -> Settled -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "value", rename_all = "lowercase")]
pub enum RoundPhase {
    /// Waiting for the player to pick a move
    Idle,
    /// Countdown running, ticks remaining
    Counting(u32),
    /// Opponent move drawn, result not yet shown
    Revealing,
    /// Result decided and statistics committed
    Settled(Outcome),
}

impl RoundPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, RoundPhase::Idle)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, RoundPhase::Settled(_))
    }

    /// A round is in flight between choose and settle
    pub fn in_flight(&self) -> bool {
        matches!(self, RoundPhase::Counting(_) | RoundPhase::Revealing)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            RoundPhase::Settled(outcome) => Some(*outcome),
            _ => None,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            RoundPhase::Idle => "idle",
            RoundPhase::Counting(_) => "counting",
            RoundPhase::Revealing => "revealing",
            RoundPhase::Settled(_) => "settled",
        }
    }
}

impl Default for RoundPhase {
    fn default() -> Self {
        RoundPhase::Idle
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundPhase::Counting(n) => write!(f, "counting({n})"),
            RoundPhase::Settled(outcome) => write!(f, "settled({outcome})"),
            other => write!(f, "{}", other.name()),
        }
    }
}
