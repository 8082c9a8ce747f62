//! Round lifecycle controller
//!
//! Drives one play-through at a time:
//!
//! ```text
//! Idle --choose--> Counting(N) --tick--> ... Counting(0) --auto--> Revealing
//!      --delay--> Settled(outcome) --reset--> Idle
//! ```
//!
//! All timing goes through a [`TimerQueue`]; the controller never sleeps.
//! Every timer is tagged with the epoch it was scheduled in and `reset` bumps
//! the epoch, so timers left over from an abandoned round are ignored.

use crate::core::{evaluate, validate_move_table, Move, Outcome, RoundOutcome, StatsRecord};
use crate::game::config::GameConfig;
use crate::game::controller::{flip, PlayerController, RoundView};
use crate::game::events::{EventKind, EventSink, NullSink, RoundEvent};
use crate::game::logger::GameLogger;
use crate::game::phase::RoundPhase;
use crate::game::random_controller::sample_move;
use crate::game::timer::{TimerEntry, TimerKind, TimerQueue};
use crate::game::VerbosityLevel;
use crate::storage::StatsStore;
use crate::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::Serialize;

/// A finished round
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundSummary {
    pub player: Move,
    pub opponent: Move,
    pub result: RoundOutcome,
    /// Statistics right after this round was recorded
    pub stats: StatsRecord,
}

impl RoundSummary {
    pub fn outcome(&self) -> Outcome {
        self.result.outcome
    }
}

/// Transient state of the round in progress; cleared by every reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub player_move: Option<Move>,
    pub opponent_move: Option<Move>,
    pub countdown: u32,
    pub result: Option<RoundOutcome>,
    /// Win celebration is showing
    pub celebrate: bool,
}

/// Finite-state machine for a single player's rounds
///
/// Owns the statistics record exclusively. Stats are read from the store
/// once at construction and written back after every settled round.
pub struct RoundController<S: StatsStore> {
    config: GameConfig,
    store: S,
    stats: StatsRecord,
    round: RoundState,
    epoch: u64,
    timers: TimerQueue,
    opponent: Box<dyn PlayerController>,
    sink: Box<dyn EventSink>,
    /// Last save failed; the next mutation retries
    pending_write: bool,
    rounds_settled: u64,
    last_round: Option<RoundSummary>,
    /// Draws the opponent's move when the opponent controller has none
    rng: ChaCha12Rng,
    pub logger: GameLogger,
}

impl<S: StatsStore> RoundController<S> {
    /// Create a controller, loading statistics from `store`
    ///
    /// A failed or empty read starts from zeroed statistics. Only an invalid
    /// config or move table is an error.
    pub fn new(config: GameConfig, store: S, opponent: Box<dyn PlayerController>) -> Result<Self> {
        config.validate()?;
        validate_move_table()?;

        let logger = GameLogger::new();
        let stats = match store.load() {
            Ok(Some(stats)) => stats.normalized(),
            Ok(None) => StatsRecord::default(),
            Err(e) => {
                logger.persistence_warning(&format!("{e}; starting from empty statistics"));
                StatsRecord::default()
            }
        };

        Ok(RoundController {
            config,
            store,
            stats,
            round: RoundState::default(),
            epoch: 0,
            timers: TimerQueue::new(),
            opponent,
            sink: Box::new(NullSink),
            pending_write: false,
            rounds_settled: 0,
            last_round: None,
            rng: ChaCha12Rng::from_entropy(),
            logger,
        })
    }

    /// Send events to `sink`
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.logger.set_verbosity(verbosity);
        self
    }

    /// Seed the fallback RNG used when the opponent has no move
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn stats(&self) -> &StatsRecord {
        &self.stats
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn celebrating(&self) -> bool {
        self.round.celebrate
    }

    pub fn rounds_settled(&self) -> u64 {
        self.rounds_settled
    }

    pub fn last_round(&self) -> Option<&RoundSummary> {
        self.last_round.as_ref()
    }

    /// The last save failed and has not been retried successfully yet
    pub fn has_pending_write(&self) -> bool {
        self.pending_write
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Due time of the next pending timer, stale or not
    pub fn next_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn view(&self) -> RoundView<'_> {
        RoundView::new(&self.stats, self.rounds_settled, self.last_round.as_ref())
    }

    /// Start a round with the player's move
    ///
    /// Only valid while Idle. Returns `false` and changes nothing otherwise.
    pub fn choose(&mut self, player_move: Move) -> bool {
        if !self.round.phase.is_idle() {
            self.logger.verbose(&format!(
                "ignoring choice of {} while {}",
                player_move, self.round.phase
            ));
            return false;
        }

        let ticks = self.config.countdown_ticks;
        self.round.player_move = Some(player_move);
        self.round.countdown = ticks;
        self.set_phase(RoundPhase::Counting(ticks));
        self.emit(EventKind::ChoiceAcknowledged);

        self.schedule(self.config.tick_interval_ms, TimerKind::Tick);
        true
    }

    /// Abandon or finish the current round and return to Idle
    ///
    /// Statistics are never touched. Any timer scheduled before this call
    /// becomes a no-op.
    pub fn reset(&mut self) {
        let was = self.round.phase;
        self.epoch += 1;
        self.round = RoundState::default();
        if !was.is_idle() {
            self.logger.transition(&format!("{was} -> idle (reset)"));
        }
        self.emit(EventKind::Reset);
    }

    /// Fire every timer due at or before `at`, in order. Returns how many
    /// timers were live (not stale).
    pub fn advance_to(&mut self, at: u64) -> usize {
        let mut fired = 0;
        while let Some(entry) = self.timers.pop_due(at) {
            if self.deliver(entry) {
                fired += 1;
            }
        }
        self.timers.set_now(at);
        fired
    }

    /// Advance the virtual clock by `ms`
    pub fn advance_by(&mut self, ms: u64) -> usize {
        let at = self.now().saturating_add(ms);
        self.advance_to(at)
    }

    /// Handle one timer. Returns `false` if it belonged to an earlier epoch.
    pub fn deliver(&mut self, entry: TimerEntry) -> bool {
        if entry.epoch != self.epoch {
            self.logger.verbose(&format!(
                "dropping stale {:?} timer from epoch {} (now {})",
                entry.kind, entry.epoch, self.epoch
            ));
            return false;
        }

        match entry.kind {
            TimerKind::Tick => self.on_tick(),
            TimerKind::Settle => self.on_settle(),
            TimerKind::ClearCelebration => self.on_clear_celebration(),
        }
        true
    }

    /// Retry a failed save now
    pub fn flush(&mut self) -> Result<()> {
        self.store.save(&self.stats)?;
        self.pending_write = false;
        Ok(())
    }

    /// Drop timers from epochs before the current one
    pub fn purge_stale_timers(&mut self) -> usize {
        self.timers.purge_before(self.epoch)
    }

    fn on_tick(&mut self) {
        let RoundPhase::Counting(n) = self.round.phase else {
            return;
        };

        let remaining = n.saturating_sub(1);
        self.round.countdown = remaining;
        self.set_phase(RoundPhase::Counting(remaining));
        self.emit(EventKind::CountdownTick);

        if remaining > 0 {
            self.schedule(self.config.tick_interval_ms, TimerKind::Tick);
        } else {
            self.reveal();
        }
    }

    fn reveal(&mut self) {
        let view = RoundView::new(&self.stats, self.rounds_settled, self.last_round.as_ref());
        let opponent_move = match self.opponent.choose_move(&view) {
            Some(m) => m,
            None => {
                self.logger.verbose(&format!(
                    "{} opponent had no move, drawing at random",
                    self.opponent.name()
                ));
                sample_move(&mut self.rng)
            }
        };

        self.round.opponent_move = Some(opponent_move);
        self.set_phase(RoundPhase::Revealing);
        self.emit(EventKind::Revealed);

        self.schedule(self.config.reveal_delay_ms, TimerKind::Settle);
    }

    fn on_settle(&mut self) {
        if self.round.phase != RoundPhase::Revealing {
            return;
        }
        let (Some(player), Some(opponent)) = (self.round.player_move, self.round.opponent_move)
        else {
            return;
        };

        let result = evaluate(player, opponent);
        self.round.result = Some(result);
        self.stats.record(result.outcome);
        self.set_phase(RoundPhase::Settled(result.outcome));

        self.logger.normal(&format!(
            "{} vs {}: {}{}",
            player,
            opponent,
            result.outcome.headline(),
            result.message.map(|m| format!(" {m}")).unwrap_or_default()
        ));

        self.persist();

        if result.is_win() {
            self.round.celebrate = true;
            self.schedule(self.config.celebration_ms, TimerKind::ClearCelebration);
        }

        self.emit(EventKind::Settled);

        let summary = RoundSummary {
            player,
            opponent,
            result,
            stats: self.stats,
        };
        self.rounds_settled += 1;
        self.last_round = Some(summary);

        let view = RoundView::new(&self.stats, self.rounds_settled, self.last_round.as_ref());
        self.opponent.on_round_end(&view, flip(result.outcome));
    }

    fn on_clear_celebration(&mut self) {
        if self.round.celebrate {
            self.round.celebrate = false;
            self.emit(EventKind::CelebrationEnded);
        }
    }

    /// Write-through, best effort. A failure never rolls back memory.
    fn persist(&mut self) {
        match self.store.save(&self.stats) {
            Ok(()) => {
                if self.pending_write {
                    self.logger.verbose("statistics saved after earlier failure");
                }
                self.pending_write = false;
            }
            Err(e) => {
                self.pending_write = true;
                self.logger.persistence_warning(&e.to_string());
                self.emit(EventKind::PersistenceFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    fn schedule(&mut self, delay_ms: u64, kind: TimerKind) {
        self.timers.schedule(delay_ms, self.epoch, kind);
    }

    fn set_phase(&mut self, phase: RoundPhase) {
        #[cfg(feature = "verbose-logging")]
        self.logger
            .transition(&format!("{} -> {}", self.round.phase, phase));
        self.round.phase = phase;
    }

    /// Snapshot of the current round for the presentation layer
    pub fn snapshot(&self, kind: EventKind) -> RoundEvent {
        RoundEvent {
            kind,
            epoch: self.epoch,
            at_ms: self.timers.now(),
            phase: self.round.phase,
            player_move: self.round.player_move,
            opponent_move: self.round.opponent_move,
            outcome: self.round.result.map(|r| r.outcome),
            message: self.round.result.and_then(|r| r.message),
            stats: self.stats,
            celebrate: self.round.celebrate,
        }
    }

    fn emit(&mut self, kind: EventKind) {
        let event = self.snapshot(kind);
        self.sink.emit(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::EventLog;
    use crate::game::FixedScriptController;
    use crate::storage::InMemoryStatsStore;

    fn controller_against(
        opponent: Vec<Move>,
        store: InMemoryStatsStore,
    ) -> (RoundController<InMemoryStatsStore>, EventLog) {
        let log = EventLog::new();
        let mut controller = RoundController::new(
            GameConfig::default(),
            store,
            Box::new(FixedScriptController::cycling(opponent)),
        )
        .unwrap()
        .with_sink(log.clone());
        controller.logger.enable_capture();
        (controller, log)
    }

    #[test]
    fn test_rock_beats_scissors_scenario() {
        let (mut controller, log) = controller_against(vec![Move::Scissors], InMemoryStatsStore::new());

        assert!(controller.choose(Move::Rock));
        assert_eq!(controller.phase(), RoundPhase::Counting(3));

        controller.advance_by(1000);
        assert_eq!(controller.phase(), RoundPhase::Counting(2));
        controller.advance_by(1000);
        assert_eq!(controller.phase(), RoundPhase::Counting(1));
        controller.advance_by(1000);
        assert_eq!(controller.phase(), RoundPhase::Revealing);
        assert_eq!(controller.round().opponent_move, Some(Move::Scissors));
        assert_eq!(controller.round().countdown, 0);

        controller.advance_by(1499);
        assert_eq!(controller.phase(), RoundPhase::Revealing);
        controller.advance_by(1);
        assert_eq!(controller.phase(), RoundPhase::Settled(Outcome::Win));

        let result = controller.round().result.unwrap();
        assert_eq!(result.message, Some("Rock crushes Scissors"));
        assert_eq!(
            *controller.stats(),
            StatsRecord {
                wins: 1,
                losses: 0,
                ties: 0,
                streak: 1,
                best_streak: 1
            }
        );
        assert!(controller.celebrating());
        assert_eq!(controller.store().stored(), Some(*controller.stats()));

        assert_eq!(
            log.kinds(),
            vec![
                EventKind::ChoiceAcknowledged,
                EventKind::CountdownTick,
                EventKind::CountdownTick,
                EventKind::CountdownTick,
                EventKind::Revealed,
                EventKind::Settled,
            ]
        );

        controller.advance_by(5000);
        assert!(!controller.celebrating());
        assert_eq!(log.last().unwrap().kind, EventKind::CelebrationEnded);
    }

    #[test]
    fn test_choose_ignored_while_busy() {
        let (mut controller, _log) = controller_against(vec![Move::Paper], InMemoryStatsStore::new());
        assert!(controller.choose(Move::Rock));

        assert!(!controller.choose(Move::Spock));
        assert_eq!(controller.round().player_move, Some(Move::Rock));
        assert_eq!(controller.phase(), RoundPhase::Counting(3));

        controller.advance_by(3000);
        assert!(!controller.choose(Move::Spock));
        assert_eq!(controller.phase(), RoundPhase::Revealing);

        controller.advance_by(1500);
        let stats_before = *controller.stats();
        assert!(!controller.choose(Move::Spock));
        assert_eq!(*controller.stats(), stats_before);
        assert_eq!(controller.round().player_move, Some(Move::Rock));
        assert_eq!(controller.round().countdown, 0);
    }

    #[test]
    fn test_reset_while_idle_is_idempotent() {
        let stored = StatsRecord {
            wins: 2,
            losses: 1,
            ties: 0,
            streak: 0,
            best_streak: 2,
        };
        let (mut controller, _log) =
            controller_against(vec![Move::Paper], InMemoryStatsStore::with_record(stored).unwrap());
        controller.reset();
        controller.reset();
        assert_eq!(controller.phase(), RoundPhase::Idle);
        assert_eq!(*controller.stats(), stored);
    }

    #[test]
    fn test_stale_timers_ignored_after_reset() {
        let (mut controller, log) = controller_against(vec![Move::Rock], InMemoryStatsStore::new());
        controller.choose(Move::Paper);
        controller.advance_by(1000);
        assert_eq!(controller.phase(), RoundPhase::Counting(2));

        controller.reset();
        assert_eq!(controller.phase(), RoundPhase::Idle);

        // The pending tick from the abandoned round is dropped
        let fired = controller.advance_by(10_000);
        assert_eq!(fired, 0);
        assert_eq!(controller.phase(), RoundPhase::Idle);
        assert_eq!(controller.stats().total_games(), 0);
        assert_eq!(log.last().unwrap().kind, EventKind::Reset);
    }

    #[test]
    fn test_stale_timer_cannot_advance_new_round() {
        let (mut controller, _log) = controller_against(vec![Move::Rock], InMemoryStatsStore::new());
        controller.choose(Move::Paper);
        controller.advance_by(500);
        controller.reset();

        // New round starts mid-way through the old tick interval
        controller.choose(Move::Spock);
        controller.advance_by(500);
        // Old tick was due now but belongs to the previous epoch
        assert_eq!(controller.phase(), RoundPhase::Counting(3));
        controller.advance_by(500);
        assert_eq!(controller.phase(), RoundPhase::Counting(2));
    }

    #[test]
    fn test_reset_clears_celebration_but_not_stats() {
        let (mut controller, _log) = controller_against(vec![Move::Lizard], InMemoryStatsStore::new());
        controller.choose(Move::Rock);
        controller.advance_by(4500);
        assert!(controller.celebrating());

        controller.reset();
        assert!(!controller.celebrating());
        assert_eq!(*controller.round(), RoundState::default());
        assert_eq!(controller.stats().wins, 1);
    }

    #[test]
    fn test_streaks_over_rounds() {
        // Rock beats Scissors twice, then loses to Paper
        let (mut controller, _log) = controller_against(
            vec![Move::Scissors, Move::Scissors, Move::Paper],
            InMemoryStatsStore::new(),
        );
        let mut streaks = Vec::new();
        for _ in 0..3 {
            controller.choose(Move::Rock);
            controller.advance_by(4500);
            streaks.push(controller.stats().streak);
            controller.reset();
        }
        assert_eq!(streaks, vec![1, 2, 0]);
        assert_eq!(controller.stats().best_streak, 2);
        assert_eq!(controller.rounds_settled(), 3);
        assert_eq!(controller.last_round().unwrap().opponent, Move::Paper);
    }

    #[test]
    fn test_tie_from_fresh_stats() {
        let (mut controller, _log) = controller_against(vec![Move::Spock], InMemoryStatsStore::new());
        controller.choose(Move::Spock);
        controller.advance_by(4500);

        assert_eq!(controller.phase(), RoundPhase::Settled(Outcome::Tie));
        assert_eq!(controller.round().result.unwrap().message, None);
        assert_eq!(
            *controller.stats(),
            StatsRecord {
                wins: 0,
                losses: 0,
                ties: 1,
                streak: 0,
                best_streak: 0
            }
        );
        assert_eq!(controller.stats().win_rate(), 0.0);
        assert!(!controller.celebrating());
    }

    #[test]
    fn test_write_failure_keeps_memory_and_retries() {
        let mut store = InMemoryStatsStore::new();
        store.set_fail_writes(true);
        let (mut controller, log) = controller_against(vec![Move::Rock], store);

        controller.choose(Move::Paper);
        controller.advance_by(4500);
        assert_eq!(controller.stats().wins, 1);
        assert!(controller.has_pending_write());
        assert_eq!(controller.store().stored(), None);
        assert!(log
            .kinds()
            .iter()
            .any(|k| matches!(k, EventKind::PersistenceFailed { .. })));

        controller.store_mut().set_fail_writes(false);
        controller.reset();
        controller.choose(Move::Paper);
        controller.advance_by(4500);
        assert!(!controller.has_pending_write());
        assert_eq!(controller.store().stored().unwrap().wins, 2);
    }

    #[test]
    fn test_read_failure_starts_from_zero() {
        let mut store = InMemoryStatsStore::with_record(StatsRecord {
            wins: 9,
            ..Default::default()
        })
        .unwrap();
        store.set_fail_reads(true);
        let (controller, _log) = controller_against(vec![Move::Rock], store);
        assert_eq!(*controller.stats(), StatsRecord::default());
    }

    #[test]
    fn test_loads_existing_stats() {
        let stored = StatsRecord {
            wins: 4,
            losses: 2,
            ties: 1,
            streak: 3,
            best_streak: 3,
        };
        let (mut controller, _log) =
            controller_against(vec![Move::Scissors], InMemoryStatsStore::with_record(stored).unwrap());
        controller.choose(Move::Rock);
        controller.advance_by(4500);
        assert_eq!(controller.stats().wins, 5);
        assert_eq!(controller.stats().streak, 4);
        assert_eq!(controller.stats().best_streak, 4);
    }

    #[test]
    fn test_exhausted_opponent_falls_back_to_random() {
        let log = EventLog::new();
        let mut controller = RoundController::new(
            GameConfig::instant(),
            InMemoryStatsStore::new(),
            Box::new(FixedScriptController::new(Vec::new())),
        )
        .unwrap()
        .with_sink(log.clone());
        controller.logger.enable_capture();

        controller.choose(Move::Rock);
        controller.advance_by(0);
        assert!(controller.phase().is_settled());
        assert!(controller.round().opponent_move.is_some());
    }

    #[test]
    fn test_logs_outcome_and_persistence_problems() {
        let mut store = InMemoryStatsStore::new();
        store.set_fail_writes(true);
        let (mut controller, _log) = controller_against(vec![Move::Spock], store);
        controller.choose(Move::Rock);
        controller.advance_by(4500);

        let logs = controller.logger.logs();
        assert!(logs
            .iter()
            .any(|e| e.message.starts_with("Rock vs Spock: 💀 You Lose! Spock vaporizes Rock")));
        assert!(logs
            .iter()
            .any(|e| e.category.as_deref() == Some("persistence")));
        #[cfg(feature = "verbose-logging")]
        assert!(logs
            .iter()
            .any(|e| e.category.as_deref() == Some("transition") && e.message == "revealing -> settled(lose)"));
    }

    #[test]
    fn test_seeded_fallback_is_reproducible() {
        let draw = |seed: u64| {
            let mut controller = RoundController::new(
                GameConfig::instant(),
                InMemoryStatsStore::new(),
                Box::new(FixedScriptController::new(Vec::new())),
            )
            .unwrap()
            .with_verbosity(VerbosityLevel::Silent);
            controller.seed_rng(seed);
            let mut moves = Vec::new();
            for _ in 0..10 {
                controller.reset();
                controller.choose(Move::Rock);
                controller.advance_by(0);
                moves.push(controller.round().opponent_move.unwrap());
            }
            moves
        };
        assert_eq!(draw(3), draw(3));
    }

    #[test]
    fn test_purge_stale_timers() {
        let (mut controller, _log) = controller_against(vec![Move::Rock], InMemoryStatsStore::new());
        controller.choose(Move::Paper);
        controller.reset();
        assert_eq!(controller.purge_stale_timers(), 1);
        assert_eq!(controller.next_due(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            countdown_ticks: 0,
            ..GameConfig::default()
        };
        let result = RoundController::new(
            config,
            InMemoryStatsStore::new(),
            Box::new(FixedScriptController::new(vec![Move::Rock])),
        );
        assert!(result.is_err());
    }
}
