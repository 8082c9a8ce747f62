//! Simulation mode for running many rounds in parallel and collecting statistics
//!
//! Random player against random opponent, split into batches that run on the
//! rayon pool. Each batch owns its own round controller, in-memory store and
//! seeded controllers, so nothing but the final tallies is shared.

use crate::core::{Move, Outcome};
use crate::game::{
    GameConfig, GameLoop, RandomController, RoundController, SessionResult, VerbosityLevel,
};
use crate::storage::InMemoryStatsStore;
use crate::{Result, RpslsError};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Rounds played by one batch
pub const BATCH_SIZE: u64 = 1_000;

/// Aggregated results of a simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub rounds: u64,
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
    /// How often the opponent picked each move, indexed by `Move::index`
    pub opponent_histogram: [u64; 5],
    /// Longest win streak seen in any batch
    pub best_streak: u32,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SimulationReport {
    fn absorb(&mut self, session: &SessionResult) {
        for summary in &session.rounds {
            self.rounds += 1;
            match summary.outcome() {
                Outcome::Win => self.wins += 1,
                Outcome::Lose => self.losses += 1,
                Outcome::Tie => self.ties += 1,
            }
            self.opponent_histogram[summary.opponent.index()] += 1;
        }
        self.best_streak = self.best_streak.max(session.stats.best_streak);
    }

    /// Share of rounds with the given outcome, as a percentage
    pub fn percent(&self, outcome: Outcome) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        let count = match outcome {
            Outcome::Win => self.wins,
            Outcome::Lose => self.losses,
            Outcome::Tie => self.ties,
        };
        100.0 * count as f64 / self.rounds as f64
    }

    /// Pearson chi-square statistic of the opponent histogram against a
    /// uniform distribution (4 degrees of freedom)
    pub fn chi_square(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        let expected = self.rounds as f64 / Move::ALL.len() as f64;
        self.opponent_histogram
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum()
    }
}

#[derive(Debug, Default)]
struct SimulationStats {
    report: SimulationReport,
    failures: Vec<String>,
}

/// Seed for batch `idx`, spread out so neighbouring batches do not correlate
fn batch_seed(seed: u64, idx: u64, salt: u64) -> u64 {
    seed.wrapping_add(idx.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(salt)
}

fn run_batch(seed: u64, idx: u64, rounds: u32) -> Result<SessionResult> {
    let opponent = RandomController::with_seed(batch_seed(seed, idx, 0xFEDC_BA98_7654_3210));
    let mut player = RandomController::with_seed(batch_seed(seed, idx, 0x1234_5678_9ABC_DEF0));

    let mut round = RoundController::new(
        GameConfig::instant(),
        InMemoryStatsStore::new(),
        Box::new(opponent),
    )?
    .with_verbosity(VerbosityLevel::Silent);

    GameLoop::new(&mut round)
        .with_max_rounds(rounds)
        .run_session(&mut player)
}

/// Play `rounds` random-vs-random rounds across the rayon pool
pub fn run_simulation(rounds: u64, seed: Option<u64>) -> Result<SimulationReport> {
    if rounds == 0 {
        return Err(RpslsError::InvalidConfig(
            "simulation needs at least one round".to_string(),
        ));
    }

    let seed = seed.unwrap_or_else(rand::random);
    let batches = rounds.div_ceil(BATCH_SIZE);
    let stats = Arc::new(Mutex::new(SimulationStats::default()));
    let start = Instant::now();

    (0..batches).into_par_iter().for_each(|idx| {
        let batch_rounds = BATCH_SIZE.min(rounds - idx * BATCH_SIZE) as u32;
        let outcome = run_batch(seed, idx, batch_rounds);

        let mut stats = stats.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Ok(session) => stats.report.absorb(&session),
            Err(e) => stats.failures.push(format!("batch {idx}: {e}")),
        }
    });

    let mut stats = stats.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(first) = stats.failures.first() {
        return Err(RpslsError::InvalidAction(format!(
            "{} simulation batch(es) failed, first: {first}",
            stats.failures.len()
        )));
    }

    let mut report = std::mem::take(&mut stats.report);
    report.elapsed = start.elapsed();
    Ok(report)
}

/// Print a report in the same layout the tournament summary uses
pub fn print_report(report: &SimulationReport) {
    println!("=== Simulation Complete ===");
    println!("Total rounds played: {}", report.rounds);
    println!("Elapsed time: {:.2}s", report.elapsed.as_secs_f64());
    if report.elapsed.as_secs_f64() > 0.0 {
        println!(
            "Rounds per second: {:.0}",
            report.rounds as f64 / report.elapsed.as_secs_f64()
        );
    }

    println!("\n=== Outcome Distribution ===");
    println!("Wins:   {} ({:.1}%)", report.wins, report.percent(Outcome::Win));
    println!("Losses: {} ({:.1}%)", report.losses, report.percent(Outcome::Lose));
    println!("Ties:   {} ({:.1}%)", report.ties, report.percent(Outcome::Tie));
    println!("Best win streak: {}", report.best_streak);

    println!("\n=== Opponent Moves ===");
    for m in Move::ALL {
        let count = report.opponent_histogram[m.index()];
        let pct = if report.rounds == 0 {
            0.0
        } else {
            100.0 * count as f64 / report.rounds as f64
        };
        println!("  {} {:<8} {:>8} ({:.1}%)", m.emoji(), m.name(), count, pct);
    }
    println!("Chi-square vs uniform (4 dof): {:.2}", report.chi_square());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_counts_add_up() {
        let report = run_simulation(2_500, Some(7)).unwrap();
        assert_eq!(report.rounds, 2_500);
        assert_eq!(report.wins + report.losses + report.ties, 2_500);
        assert_eq!(report.opponent_histogram.iter().sum::<u64>(), 2_500);
    }

    #[test]
    fn test_simulation_is_roughly_fair() {
        let report = run_simulation(20_000, Some(42)).unwrap();
        // Ties are 1/5, wins and losses 2/5 each
        assert!((report.percent(Outcome::Tie) - 20.0).abs() < 2.0);
        assert!((report.percent(Outcome::Win) - 40.0).abs() < 2.0);
        // 99.9th percentile of chi-square with 4 degrees of freedom
        assert!(report.chi_square() < 18.47, "chi2 = {}", report.chi_square());
    }

    #[test]
    fn test_seeded_simulation_is_reproducible() {
        let a = run_simulation(3_000, Some(99)).unwrap();
        let b = run_simulation(3_000, Some(99)).unwrap();
        assert_eq!(a.opponent_histogram, b.opponent_histogram);
        assert_eq!((a.wins, a.losses, a.ties), (b.wins, b.losses, b.ties));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        assert!(matches!(
            run_simulation(0, None),
            Err(RpslsError::InvalidConfig(_))
        ));
    }
}
