//! Fixed script controller for deterministic testing
//!
//! This controller plays a predetermined sequence of moves, making it ideal
//! for testing specific round scenarios. Once the script is exhausted it
//! either starts over (cycling) or reports that it has nothing left to play.

use crate::core::Move;
use crate::game::controller::{PlayerController, RoundView};
use crate::Result;

/// A controller that follows a fixed script of moves
///
/// This controller is serializable, allowing its position in the script to
/// be saved and restored.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FixedScriptController {
    /// The predetermined sequence of moves
    script: Vec<Move>,
    /// Start over when the script runs out
    cycle: bool,
    /// Current position in the script
    pub current_index: usize,
}

impl FixedScriptController {
    /// Create a scripted controller that stops after the last move
    ///
    /// # Example
    /// ```
    /// use rpsls_rs::core::Move;
    /// use rpsls_rs::game::FixedScriptController;
    ///
    /// let controller = FixedScriptController::new(vec![Move::Rock, Move::Spock]);
    /// assert_eq!(controller.remaining(), 2);
    /// ```
    pub fn new(script: Vec<Move>) -> Self {
        FixedScriptController {
            script,
            cycle: false,
            current_index: 0,
        }
    }

    /// Create a scripted controller that repeats its script forever
    pub fn cycling(script: Vec<Move>) -> Self {
        FixedScriptController {
            script,
            cycle: true,
            current_index: 0,
        }
    }

    /// Build a controller from a comma or space separated list of move names
    /// or ids, e.g. "rock, spock 3"
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self::new(parse_moves(input)?))
    }

    /// Moves left before the script is exhausted (always the full length when cycling)
    pub fn remaining(&self) -> usize {
        if self.cycle {
            self.script.len()
        } else {
            self.script.len().saturating_sub(self.current_index)
        }
    }

    fn next_move(&mut self) -> Option<Move> {
        if self.script.is_empty() {
            return None;
        }
        if self.current_index >= self.script.len() {
            if !self.cycle {
                return None;
            }
            self.current_index = 0;
        }
        let choice = self.script[self.current_index];
        self.current_index += 1;
        Some(choice)
    }
}

/// Parse a comma or whitespace separated list of moves
pub fn parse_moves(input: &str) -> Result<Vec<Move>> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Move::parse_name)
        .collect()
}

impl PlayerController for FixedScriptController {
    fn name(&self) -> &str {
        "script"
    }

    fn choose_move(&mut self, _view: &RoundView) -> Option<Move> {
        self.next_move()
    }
}
