//! Core game types: moves, outcomes and statistics

pub mod moves;
pub mod outcome;
pub mod stats;

pub use moves::{validate_move_table, Move, MoveSpec, MOVE_TABLE};
pub use outcome::{evaluate, evaluate_ids, Outcome, RoundOutcome, WIN_MESSAGES};
pub use stats::StatsRecord;
