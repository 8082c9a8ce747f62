//! Move controller trait and round view
//!
//! This module defines the interface between the round lifecycle and
//! whatever picks moves: the human at the keyboard, a random opponent, or a
//! fixed script in tests. The round controller asks for a move when one is
//! needed; the controller inspects a read-only view of the session to decide.

use crate::core::{Move, Outcome, StatsRecord};
use crate::game::round::RoundSummary;

/// Read-only view of the session for move controllers
///
/// Deliberately excludes the other side's move for the round in progress.
pub struct RoundView<'a> {
    stats: &'a StatsRecord,
    rounds_settled: u64,
    last_round: Option<&'a RoundSummary>,
}

impl<'a> RoundView<'a> {
    pub fn new(
        stats: &'a StatsRecord,
        rounds_settled: u64,
        last_round: Option<&'a RoundSummary>,
    ) -> Self {
        RoundView {
            stats,
            rounds_settled,
            last_round,
        }
    }

    pub fn stats(&self) -> &StatsRecord {
        self.stats
    }

    /// Rounds settled by this controller instance (not the lifetime total)
    pub fn rounds_settled(&self) -> u64 {
        self.rounds_settled
    }

    /// The previous round, once one has settled
    pub fn last_round(&self) -> Option<&RoundSummary> {
        self.last_round
    }
}

/// Something that picks moves
pub trait PlayerController {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Choose a move. `None` means the controller has nothing more to play
    /// (the human quit, a script ran dry with no fallback).
    fn choose_move(&mut self, view: &RoundView) -> Option<Move>;

    /// Notification after a round settles, from this controller's own side
    fn on_round_end(&mut self, _view: &RoundView, _outcome: Outcome) {}
}

impl<C: PlayerController + ?Sized> PlayerController for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn choose_move(&mut self, view: &RoundView) -> Option<Move> {
        (**self).choose_move(view)
    }

    fn on_round_end(&mut self, view: &RoundView, outcome: Outcome) {
        (**self).on_round_end(view, outcome)
    }
}

/// The same outcome seen from the other side of the table
pub fn flip(outcome: Outcome) -> Outcome {
    match outcome {
        Outcome::Win => Outcome::Lose,
        Outcome::Lose => Outcome::Win,
        Outcome::Tie => Outcome::Tie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluate;

    #[test]
    fn test_view_accessors() {
        let stats = StatsRecord {
            wins: 1,
            ..Default::default()
        };
        let summary = RoundSummary {
            player: Move::Rock,
            opponent: Move::Lizard,
            result: evaluate(Move::Rock, Move::Lizard),
            stats,
        };
        let view = RoundView::new(&stats, 1, Some(&summary));
        assert_eq!(view.stats().wins, 1);
        assert_eq!(view.rounds_settled(), 1);
        assert_eq!(view.last_round().unwrap().opponent, Move::Lizard);
    }

    #[test]
    fn test_flip() {
        for a in Move::ALL {
            for b in Move::ALL {
                assert_eq!(flip(evaluate(a, b).outcome), evaluate(b, a).outcome);
            }
        }
    }
}
