//! Round timing configuration

use crate::{Result, RpslsError};
use serde::{Deserialize, Serialize};

/// Timing knobs for the round lifecycle. All durations are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Countdown length in ticks
    pub countdown_ticks: u32,
    /// Time between countdown ticks
    pub tick_interval_ms: u64,
    /// Pause between revealing the opponent's move and settling the round
    pub reveal_delay_ms: u64,
    /// How long the win celebration stays up
    pub celebration_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            countdown_ticks: 3,
            tick_interval_ms: 1000,
            reveal_delay_ms: 1500,
            celebration_ms: 5000,
        }
    }
}

impl GameConfig {
    /// Same countdown, no waiting (tests, simulations, `--fast`)
    pub fn instant() -> Self {
        GameConfig {
            tick_interval_ms: 0,
            reveal_delay_ms: 0,
            celebration_ms: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.countdown_ticks == 0 {
            return Err(RpslsError::InvalidConfig(
                "countdown_ticks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Virtual time from choosing a move until the round settles
    pub fn round_duration_ms(&self) -> u64 {
        self.countdown_ticks as u64 * self.tick_interval_ms + self.reveal_delay_ms
    }
}
