//! The five moves and their defeat table
//!
//! The "defeats" relation is a fixed adjacency table: every move beats exactly
//! two others and loses to exactly two others. The table is checked once with
//! [`validate_move_table`] instead of being trusted blindly.

use crate::{Result, RpslsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Number of moves in the game
pub const MOVE_COUNT: usize = 5;

/// How many moves each move defeats (and is defeated by)
pub const DEFEATS_PER_MOVE: usize = 2;

/// A move the player or the opponent can throw
///
/// Serialized as its numeric id (1-5), matching the stored representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Move {
    Rock = 1,
    Paper = 2,
    Scissors = 3,
    Lizard = 4,
    Spock = 5,
}

/// Static description of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    pub id: u8,
    pub name: &'static str,
    pub emoji: &'static str,
    pub defeats: [u8; DEFEATS_PER_MOVE],
}

/// The move table, indexed by `id - 1`
pub const MOVE_TABLE: [MoveSpec; MOVE_COUNT] = [
    MoveSpec { id: 1, name: "Rock", emoji: "🗿", defeats: [3, 4] },
    MoveSpec { id: 2, name: "Paper", emoji: "📄", defeats: [1, 5] },
    MoveSpec { id: 3, name: "Scissors", emoji: "✂️", defeats: [2, 4] },
    MoveSpec { id: 4, name: "Lizard", emoji: "🦎", defeats: [2, 5] },
    MoveSpec { id: 5, name: "Spock", emoji: "🖖", defeats: [1, 3] },
];

impl Move {
    /// All moves in id order
    pub const ALL: [Move; MOVE_COUNT] = [
        Move::Rock,
        Move::Paper,
        Move::Scissors,
        Move::Lizard,
        Move::Spock,
    ];

    /// Convert a raw id into a move, rejecting anything outside 1..=5
    pub fn from_id(id: u8) -> Result<Move> {
        match id {
            1 => Ok(Move::Rock),
            2 => Ok(Move::Paper),
            3 => Ok(Move::Scissors),
            4 => Ok(Move::Lizard),
            5 => Ok(Move::Spock),
            other => Err(RpslsError::InvalidMove(other)),
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn spec(self) -> &'static MoveSpec {
        &MOVE_TABLE[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn emoji(self) -> &'static str {
        self.spec().emoji
    }

    /// Zero-based position in [`Move::ALL`]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// The two moves this move defeats
    pub fn defeats(self) -> [Move; DEFEATS_PER_MOVE] {
        // Ids in MOVE_TABLE are in range; validate_move_table checks this.
        self.spec().defeats.map(|id| Move::ALL[(id - 1) as usize])
    }

    pub fn beats(self, other: Move) -> bool {
        self.spec().defeats.contains(&other.id())
    }

    /// Parse a move name, case-insensitive, allowing an unambiguous prefix
    /// ("sp" -> Spock, but "s" is ambiguous between Scissors and Spock).
    pub fn parse_name(input: &str) -> Result<Move> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return Err(RpslsError::UnknownMoveName(input.to_string()));
        }

        if let Ok(id) = needle.parse::<u8>() {
            return Move::from_id(id);
        }

        if let Some(exact) = Move::ALL.iter().find(|m| m.name().to_lowercase() == needle) {
            return Ok(*exact);
        }

        let mut matches = Move::ALL
            .iter()
            .filter(|m| m.name().to_lowercase().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(m), None) => Ok(*m),
            _ => Err(RpslsError::UnknownMoveName(input.to_string())),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Move {
    type Err = RpslsError;

    fn from_str(s: &str) -> Result<Self> {
        Move::parse_name(s)
    }
}

impl TryFrom<u8> for Move {
    type Error = RpslsError;

    fn try_from(id: u8) -> Result<Self> {
        Move::from_id(id)
    }
}

impl From<Move> for u8 {
    fn from(m: Move) -> u8 {
        m.id()
    }
}

/// Check that a move table forms a regular tournament:
/// ids are 1..=N in order, nobody defeats itself, each move defeats exactly
/// two distinct others and is defeated by exactly two, and no pair of moves
/// defeat each other.
pub fn check_tournament(table: &[MoveSpec]) -> Result<()> {
    let n = table.len();
    let mut defeated_by = vec![0usize; n];

    for (idx, spec) in table.iter().enumerate() {
        if spec.id as usize != idx + 1 {
            return Err(RpslsError::InvalidMoveTable(format!(
                "move at position {} has id {}",
                idx, spec.id
            )));
        }
        if spec.defeats[0] == spec.defeats[1] {
            return Err(RpslsError::InvalidMoveTable(format!(
                "{} lists {} twice",
                spec.name, spec.defeats[0]
            )));
        }
        for &loser in &spec.defeats {
            if loser == spec.id {
                return Err(RpslsError::InvalidMoveTable(format!("{} defeats itself", spec.name)));
            }
            if loser == 0 || loser as usize > n {
                return Err(RpslsError::InvalidMoveTable(format!(
                    "{} defeats unknown id {}",
                    spec.name, loser
                )));
            }
            let other = &table[loser as usize - 1];
            if other.defeats.contains(&spec.id) {
                return Err(RpslsError::InvalidMoveTable(format!(
                    "{} and {} defeat each other",
                    spec.name, other.name
                )));
            }
            defeated_by[loser as usize - 1] += 1;
        }
    }

    for (idx, count) in defeated_by.iter().enumerate() {
        if *count != DEFEATS_PER_MOVE {
            return Err(RpslsError::InvalidMoveTable(format!(
                "{} is defeated by {} moves",
                table[idx].name, count
            )));
        }
    }

    Ok(())
}

static TABLE_CHECK: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Validate the built-in move table and message table, once per process
pub fn validate_move_table() -> Result<()> {
    TABLE_CHECK
        .get_or_init(|| {
            check_tournament(&MOVE_TABLE)
                .and_then(|_| crate::core::outcome::check_messages())
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(RpslsError::InvalidMoveTable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_regular_tournament() {
        assert!(check_tournament(&MOVE_TABLE).is_ok());
        assert!(validate_move_table().is_ok());
    }

    #[test]
    fn test_each_move_defeats_and_is_defeated_by_two() {
        for m in Move::ALL {
            let wins = Move::ALL.iter().filter(|o| m.beats(**o)).count();
            let losses = Move::ALL.iter().filter(|o| o.beats(m)).count();
            assert_eq!(wins, 2, "{m} should defeat two moves");
            assert_eq!(losses, 2, "{m} should lose to two moves");
            assert!(!m.beats(m));
        }
    }

    #[test]
    fn test_from_id_bounds() {
        assert_eq!(Move::from_id(1).unwrap(), Move::Rock);
        assert_eq!(Move::from_id(5).unwrap(), Move::Spock);
        assert!(matches!(Move::from_id(0), Err(RpslsError::InvalidMove(0))));
        assert!(matches!(Move::from_id(6), Err(RpslsError::InvalidMove(6))));
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(Move::parse_name("rock").unwrap(), Move::Rock);
        assert_eq!(Move::parse_name("  SPOCK ").unwrap(), Move::Spock);
        assert_eq!(Move::parse_name("liz").unwrap(), Move::Lizard);
        assert_eq!(Move::parse_name("sp").unwrap(), Move::Spock);
        assert_eq!(Move::parse_name("3").unwrap(), Move::Scissors);
        // "s" matches both Scissors and Spock
        assert!(Move::parse_name("s").is_err());
        assert!(Move::parse_name("").is_err());
        assert!(Move::parse_name("dynamite").is_err());
    }

    #[test]
    fn test_serde_as_id() {
        let json = serde_json::to_string(&Move::Lizard).unwrap();
        assert_eq!(json, "4");
        let back: Move = serde_json::from_str("2").unwrap();
        assert_eq!(back, Move::Paper);
        assert!(serde_json::from_str::<Move>("9").is_err());
    }

    #[test]
    fn test_rejects_broken_tables() {
        let mut table = MOVE_TABLE;
        table[0].defeats = [2, 3];
        assert!(check_tournament(&table).is_err());

        let mut table = MOVE_TABLE;
        table[1].defeats = [2, 5];
        assert!(check_tournament(&table).is_err());

        let mut table = MOVE_TABLE;
        table[4].defeats = [1, 9];
        assert!(check_tournament(&table).is_err());
    }
}
