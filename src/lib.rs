//! RPSLS - Rock Paper Scissors Lizard Spock engine
//!
//! A table-driven outcome evaluator, a timer-driven round lifecycle with
//! persisted statistics, and the controllers and storage backends around it.

pub mod core;
pub mod game;
pub mod storage;
pub mod tournament;
pub mod error;

pub use error::{Result, RpslsError};
