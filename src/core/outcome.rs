//! Outcome engine: decides a round from two moves

use crate::core::moves::{Move, DEFEATS_PER_MOVE, MOVE_COUNT};
use crate::{Result, RpslsError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a round from the human player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

impl Outcome {
    /// Headline shown when a round settles
    pub fn headline(self) -> &'static str {
        match self {
            Outcome::Win => "🎉 You Win!",
            Outcome::Lose => "💀 You Lose!",
            Outcome::Tie => "🤝 It's a Tie!",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
            Outcome::Tie => "tie",
        };
        write!(f, "{s}")
    }
}

/// An evaluated round: who won, and the flavor text explaining why
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    pub outcome: Outcome,
    /// Absent for ties
    pub message: Option<&'static str>,
}

impl RoundOutcome {
    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }
}

/// Flavor text for every "winner beats loser" pair, keyed by (winner, loser)
pub const WIN_MESSAGES: [(Move, Move, &str); MOVE_COUNT * DEFEATS_PER_MOVE] = [
    (Move::Rock, Move::Scissors, "Rock crushes Scissors"),
    (Move::Rock, Move::Lizard, "Rock crushes Lizard"),
    (Move::Paper, Move::Rock, "Paper covers Rock"),
    (Move::Paper, Move::Spock, "Paper disproves Spock"),
    (Move::Scissors, Move::Paper, "Scissors cuts Paper"),
    (Move::Scissors, Move::Lizard, "Scissors decapitates Lizard"),
    (Move::Lizard, Move::Paper, "Lizard eats Paper"),
    (Move::Lizard, Move::Spock, "Lizard poisons Spock"),
    (Move::Spock, Move::Rock, "Spock vaporizes Rock"),
    (Move::Spock, Move::Scissors, "Spock smashes Scissors"),
];

/// Look up the message for `winner` defeating `loser`
pub fn win_message(winner: Move, loser: Move) -> Option<&'static str> {
    WIN_MESSAGES
        .iter()
        .find(|(w, l, _)| *w == winner && *l == loser)
        .map(|(_, _, msg)| *msg)
}

/// Decide a round
///
/// Total over all 25 ordered pairs. A loss reports the message for the
/// opponent's winning pair, so both sides of a matchup read the same text.
pub fn evaluate(player: Move, opponent: Move) -> RoundOutcome {
    if player == opponent {
        RoundOutcome {
            outcome: Outcome::Tie,
            message: None,
        }
    } else if player.beats(opponent) {
        RoundOutcome {
            outcome: Outcome::Win,
            message: win_message(player, opponent),
        }
    } else {
        RoundOutcome {
            outcome: Outcome::Lose,
            message: win_message(opponent, player),
        }
    }
}

/// Evaluate raw move ids, failing fast on anything outside the move set
pub fn evaluate_ids(player: u8, opponent: u8) -> Result<RoundOutcome> {
    Ok(evaluate(Move::from_id(player)?, Move::from_id(opponent)?))
}

/// The one-line rules summary for each move, e.g.
/// "Rock crushes Scissors & Lizard"
pub fn rules_lines() -> Vec<String> {
    Move::ALL
        .iter()
        .map(|m| {
            let verbs: Vec<&str> = m
                .defeats()
                .iter()
                .filter_map(|loser| win_message(*m, *loser))
                .map(|msg| msg.strip_prefix(m.name()).unwrap_or(msg).trim())
                .collect();
            // "crushes Scissors" + "crushes Lizard" collapse to "crushes Scissors & Lizard"
            match verbs.as_slice() {
                [a, b] => {
                    let (verb_a, obj_a) = a.split_once(' ').unwrap_or((*a, ""));
                    let (verb_b, obj_b) = b.split_once(' ').unwrap_or((*b, ""));
                    if verb_a == verb_b {
                        format!("{} {} {} & {}", m.name(), verb_a, obj_a, obj_b)
                    } else {
                        format!("{} {} {} & {} {}", m.name(), verb_a, obj_a, verb_b, obj_b)
                    }
                }
                _ => format!("{} {}", m.name(), verbs.join(" & ")),
            }
        })
        .collect()
}

/// Every defeat relation must have exactly one non-empty message and the
/// message table must not describe any pair that is not a defeat.
pub(crate) fn check_messages() -> Result<()> {
    for winner in Move::ALL {
        for loser in winner.defeats() {
            let count = WIN_MESSAGES
                .iter()
                .filter(|(w, l, msg)| *w == winner && *l == loser && !msg.is_empty())
                .count();
            if count != 1 {
                return Err(RpslsError::InvalidMoveTable(format!(
                    "{} messages for {} beating {}",
                    count, winner, loser
                )));
            }
        }
    }
    if let Some((w, l, _)) = WIN_MESSAGES.iter().find(|(w, l, _)| !w.beats(*l)) {
        return Err(RpslsError::InvalidMoveTable(format!(
            "message for {w} beating {l}, which is not a defeat"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_move_ties() {
        for m in Move::ALL {
            let result = evaluate(m, m);
            assert_eq!(result.outcome, Outcome::Tie);
            assert_eq!(result.message, None);
        }
    }

    #[test]
    fn test_win_lose_antisymmetry() {
        for a in Move::ALL {
            for b in Move::ALL {
                if a == b {
                    continue;
                }
                let ab = evaluate(a, b);
                let ba = evaluate(b, a);
                assert_ne!(ab.outcome, Outcome::Tie);
                assert_eq!(ab.outcome == Outcome::Win, ba.outcome == Outcome::Lose);
                // Both perspectives explain the matchup with the same text
                assert_eq!(ab.message, ba.message);
                assert!(ab.message.is_some());
            }
        }
    }

    #[test]
    fn test_message_table_complete() {
        assert_eq!(WIN_MESSAGES.len(), 10);
        assert!(WIN_MESSAGES.iter().all(|(_, _, msg)| !msg.is_empty()));
        assert!(check_messages().is_ok());
    }

    #[test]
    fn test_rock_crushes_scissors() {
        let result = evaluate(Move::Rock, Move::Scissors);
        assert_eq!(result.outcome, Outcome::Win);
        assert_eq!(result.message, Some("Rock crushes Scissors"));

        let result = evaluate(Move::Scissors, Move::Rock);
        assert_eq!(result.outcome, Outcome::Lose);
        assert_eq!(result.message, Some("Rock crushes Scissors"));
    }

    #[test]
    fn test_evaluate_ids_rejects_out_of_range() {
        assert!(evaluate_ids(1, 3).unwrap().is_win());
        assert!(matches!(evaluate_ids(0, 3), Err(RpslsError::InvalidMove(0))));
        assert!(matches!(evaluate_ids(2, 7), Err(RpslsError::InvalidMove(7))));
    }

    #[test]
    fn test_rules_lines() {
        let lines = rules_lines();
        assert_eq!(
            lines,
            vec![
                "Rock crushes Scissors & Lizard",
                "Paper covers Rock & disproves Spock",
                "Scissors cuts Paper & decapitates Lizard",
                "Lizard eats Paper & poisons Spock",
                "Spock vaporizes Rock & smashes Scissors",
            ]
        );
    }
}
