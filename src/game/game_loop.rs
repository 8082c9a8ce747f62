//! Session loop
//!
//! Drives a [`RoundController`] through whole rounds, either in virtual time
//! (timers fire as fast as they are reached) or in real time on the tokio
//! clock, and strings rounds together into a session with a player
//! controller choosing each move.

use crate::core::{Move, StatsRecord};
use crate::game::controller::PlayerController;
use crate::game::round::{RoundController, RoundSummary};
use crate::storage::StatsStore;
use crate::{Result, RpslsError};
use std::time::Duration;

/// Verbosity level for game output
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during play
    Silent = 0,
    /// Minimal - only round results
    Minimal = 1,
    /// Normal - round headers and results (default)
    #[default]
    Normal = 2,
    /// Verbose - every transition and timer
    Verbose = 3,
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    /// The player controller returned no move
    PlayerQuit,
    /// The configured round limit was reached
    RoundLimit,
}

/// Result of running a session to completion
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub rounds_played: u32,
    pub end_reason: SessionEndReason,
    /// Statistics after the last round
    pub stats: StatsRecord,
    pub rounds: Vec<RoundSummary>,
}

/// Session manager
pub struct GameLoop<'a, S: StatsStore> {
    pub round: &'a mut RoundController<S>,
    /// Maximum rounds before the session ends on its own (None = until quit)
    max_rounds: Option<u32>,
    /// Upper bound on timers fired per round before giving up
    max_steps: usize,
    rounds_played: u32,
}

impl<'a, S: StatsStore> GameLoop<'a, S> {
    pub fn new(round: &'a mut RoundController<S>) -> Self {
        let max_steps = round.config().countdown_ticks as usize + 8;
        GameLoop {
            round,
            max_rounds: None,
            max_steps,
            rounds_played: 0,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Set verbosity on the round controller's logger
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.round.logger.set_verbosity(verbosity);
        self
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Play one round in virtual time and return its summary
    pub fn run_round(&mut self, player_move: Move) -> Result<RoundSummary> {
        self.start_round(player_move)?;

        for _ in 0..self.max_steps {
            if let Some(summary) = self.settled_summary() {
                return Ok(summary);
            }
            let Some(due) = self.round.next_due() else {
                break;
            };
            self.round.advance_to(due);
        }

        self.settled_summary()
            .ok_or_else(|| RpslsError::InvalidAction(format!("round stalled in {}", self.round.phase())))
    }

    /// Play one round on the wall clock, sleeping until each timer is due
    pub async fn run_round_realtime(&mut self, player_move: Move) -> Result<RoundSummary> {
        self.start_round(player_move)?;

        for _ in 0..self.max_steps {
            if let Some(summary) = self.settled_summary() {
                return Ok(summary);
            }
            let Some(due) = self.round.next_due() else {
                break;
            };
            let wait = due.saturating_sub(self.round.now());
            if wait > 0 {
                tokio::time::sleep(Duration::from_millis(wait)).await;
            }
            self.round.advance_to(due);
        }

        self.settled_summary()
            .ok_or_else(|| RpslsError::InvalidAction(format!("round stalled in {}", self.round.phase())))
    }

    /// Play rounds in virtual time until the player quits or the limit is hit
    pub fn run_session(&mut self, player: &mut dyn PlayerController) -> Result<SessionResult> {
        let mut rounds = Vec::new();
        let end_reason = loop {
            if self.limit_reached() {
                break SessionEndReason::RoundLimit;
            }
            let Some(player_move) = self.next_player_move(player) else {
                break SessionEndReason::PlayerQuit;
            };
            let summary = self.run_round(player_move)?;
            self.notify_round_end(player, &summary);
            rounds.push(summary);
        };

        // Let the last celebration run out
        if let Some(due) = self.round.next_due() {
            self.round.advance_to(due.max(self.round.now()));
        }

        Ok(self.finish(end_reason, rounds))
    }

    /// Play rounds on the wall clock until the player quits or the limit is hit
    pub async fn run_session_realtime(
        &mut self,
        player: &mut dyn PlayerController,
    ) -> Result<SessionResult> {
        let mut rounds = Vec::new();
        let end_reason = loop {
            if self.limit_reached() {
                break SessionEndReason::RoundLimit;
            }
            let Some(player_move) = self.next_player_move(player) else {
                break SessionEndReason::PlayerQuit;
            };
            let summary = self.run_round_realtime(player_move).await?;
            self.notify_round_end(player, &summary);
            rounds.push(summary);
        };

        Ok(self.finish(end_reason, rounds))
    }

    /// Reset out of a settled round and submit the player's move
    fn start_round(&mut self, player_move: Move) -> Result<()> {
        let phase = self.round.phase();
        if phase.in_flight() {
            return Err(RpslsError::InvalidAction(format!(
                "cannot start a round while {phase}"
            )));
        }
        if phase.is_settled() {
            self.round.reset();
        }

        self.rounds_played += 1;
        self.round
            .logger
            .normal(&format!("=== Round {} ===", self.rounds_played));

        if !self.round.choose(player_move) {
            return Err(RpslsError::InvalidAction(format!(
                "choice of {player_move} was not accepted"
            )));
        }
        Ok(())
    }

    fn settled_summary(&self) -> Option<RoundSummary> {
        if self.round.phase().is_settled() {
            self.round.last_round().copied()
        } else {
            None
        }
    }

    fn limit_reached(&self) -> bool {
        self.max_rounds
            .is_some_and(|max| self.rounds_played >= max)
    }

    fn next_player_move(&mut self, player: &mut dyn PlayerController) -> Option<Move> {
        let view = self.round.view();
        let choice = player.choose_move(&view);
        if choice.is_none() {
            self.round
                .logger
                .verbose(&format!("{} has no more moves", player.name()));
        }
        choice
    }

    fn notify_round_end(&mut self, player: &mut dyn PlayerController, summary: &RoundSummary) {
        let view = self.round.view();
        player.on_round_end(&view, summary.outcome());
    }

    fn finish(&mut self, end_reason: SessionEndReason, rounds: Vec<RoundSummary>) -> SessionResult {
        let stats = *self.round.stats();
        self.round.logger.minimal(&format!(
            "Session over after {} round(s): {} wins, {} losses, {} ties, win rate {:.1}%",
            rounds.len(),
            stats.wins,
            stats.losses,
            stats.ties,
            stats.win_rate()
        ));
        SessionResult {
            rounds_played: rounds.len() as u32,
            end_reason,
            stats,
            rounds,
        }
    }
}
