//! Uniformly random move controller
//!
//! The default opponent: every move with probability 1/5, independent of
//! history.

use crate::core::Move;
use crate::game::controller::{PlayerController, RoundView};
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Where the randomness comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
enum MoveRng {
    /// OS-seeded, not reproducible
    #[serde(skip)]
    Thread,
    /// Seeded, reproducible and serializable
    Seeded(Xoshiro256PlusPlus),
}

/// A controller that picks moves uniformly at random
///
/// Only seeded controllers (`with_seed`) serialize. One backed by the thread
/// RNG has no state to save and fails with a serialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomController {
    rng: MoveRng,
}

impl RandomController {
    /// Create a random controller backed by the thread RNG
    pub fn new() -> Self {
        RandomController {
            rng: MoveRng::Thread,
        }
    }

    /// Create a random controller with a seeded RNG (for deterministic testing)
    pub fn with_seed(seed: u64) -> Self {
        RandomController {
            rng: MoveRng::Seeded(Xoshiro256PlusPlus::seed_from_u64(seed)),
        }
    }

    /// Draw one move
    pub fn sample(&mut self) -> Move {
        match &mut self.rng {
            MoveRng::Thread => sample_move(&mut rand::thread_rng()),
            MoveRng::Seeded(rng) => sample_move(rng),
        }
    }
}

impl Default for RandomController {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform draw from the five moves
pub fn sample_move<R: RngCore + ?Sized>(rng: &mut R) -> Move {
    Move::ALL[rng.gen_range(0..Move::ALL.len())]
}

impl PlayerController for RandomController {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, _view: &RoundView) -> Option<Move> {
        Some(self.sample())
    }
}
