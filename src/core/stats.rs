//! Persisted win/loss statistics

use crate::core::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// Aggregate statistics across all rounds ever played
///
/// Stored as a small JSON object (`wins`, `losses`, `ties`, `streak`,
/// `bestStreak`). Missing fields decode as zero so older or partial records
/// still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Consecutive wins, reset by a loss
    pub streak: u32,
    /// Highest `streak` ever observed
    pub best_streak: u32,
}

impl StatsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a settled round. Ties leave the streak alone.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => {
                self.wins = self.wins.saturating_add(1);
                self.streak = self.streak.saturating_add(1);
                self.best_streak = self.best_streak.max(self.streak);
            }
            Outcome::Lose => {
                self.losses = self.losses.saturating_add(1);
                self.streak = 0;
            }
            Outcome::Tie => {
                self.ties = self.ties.saturating_add(1);
            }
        }
    }

    pub fn total_games(&self) -> u64 {
        self.wins as u64 + self.losses as u64 + self.ties as u64
    }

    /// Percentage of games won, rounded to one decimal place (0.0 with no games)
    pub fn win_rate(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            0.0
        } else {
            let pct = self.wins as f64 / total as f64 * 100.0;
            (pct * 10.0).round() / 10.0
        }
    }

    /// Repair a record decoded from storage so `best_streak >= streak` holds
    pub fn normalized(mut self) -> Self {
        self.best_streak = self.best_streak.max(self.streak);
        self
    }
}
