//! Virtual-time timer queue
//!
//! Single-threaded and cooperative: nothing fires on its own. The owner asks
//! for the next due time, advances the clock, and handles each entry to
//! completion before popping the next. Every entry carries the epoch of the
//! round that scheduled it so the owner can drop timers from a round that has
//! since been reset.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// Advance the countdown by one
    Tick,
    /// Settle a revealed round
    Settle,
    /// Turn off the win celebration
    ClearCelebration,
}

/// A scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerEntry {
    pub due_at: u64,
    /// Insertion order, breaks ties between equal due times
    pub seq: u64,
    pub epoch: u64,
    pub kind: TimerKind,
}

/// Min-heap of pending timers plus the current virtual time
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: u64,
    next_seq: u64,
    pending: BinaryHeap<Reverse<TimerEntry>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `kind` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, epoch: u64, kind: TimerKind) -> TimerEntry {
        let entry = TimerEntry {
            due_at: self.now.saturating_add(delay_ms),
            seq: self.next_seq,
            epoch,
            kind,
        };
        self.next_seq += 1;
        self.pending.push(Reverse(entry));
        entry
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.pending.peek().map(|Reverse(entry)| entry.due_at)
    }

    /// Pop the earliest timer if it is due at or before `at`, moving the
    /// clock forward to its due time.
    pub fn pop_due(&mut self, at: u64) -> Option<TimerEntry> {
        if self.next_due()? > at {
            return None;
        }
        let Reverse(entry) = self.pending.pop()?;
        self.now = self.now.max(entry.due_at);
        Some(entry)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, at: u64) {
        self.now = self.now.max(at);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every timer scheduled by an epoch older than `epoch`
    pub fn purge_before(&mut self, epoch: u64) -> usize {
        let before = self.pending.len();
        self.pending.retain(|Reverse(entry)| entry.epoch >= epoch);
        before - self.pending.len()
    }
}
