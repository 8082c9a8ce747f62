//! Round events for the presentation layer
//!
//! The round controller emits one [`RoundEvent`] per transition. Rendering,
//! toasts and confetti live on the other side of [`EventSink`] and never
//! answer back.

use crate::core::{Move, Outcome, StatsRecord};
use crate::game::phase::RoundPhase;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Which transition produced an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    ChoiceAcknowledged,
    CountdownTick,
    Revealed,
    Settled,
    CelebrationEnded,
    Reset,
    PersistenceFailed { error: String },
}

/// Snapshot of the round after a transition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEvent {
    pub kind: EventKind,
    pub epoch: u64,
    pub at_ms: u64,
    pub phase: RoundPhase,
    pub player_move: Option<Move>,
    pub opponent_move: Option<Move>,
    pub outcome: Option<Outcome>,
    pub message: Option<&'static str>,
    pub stats: StatsRecord,
    /// Win celebration is showing
    pub celebrate: bool,
}

impl RoundEvent {
    /// Toast-style text for this event, if it has any
    pub fn describe(&self) -> Option<String> {
        match &self.kind {
            EventKind::ChoiceAcknowledged => self
                .player_move
                .map(|m| format!("You chose {}! {}", m.name(), m.emoji())),
            EventKind::CountdownTick => match self.phase {
                RoundPhase::Counting(n) if n > 0 => Some(n.to_string()),
                _ => None,
            },
            EventKind::Revealed => self
                .opponent_move
                .map(|m| format!("Computer chose {} {}", m.name(), m.emoji())),
            EventKind::Settled => {
                let outcome = self.outcome?;
                let mut text = outcome.headline().to_string();
                if let Some(message) = self.message {
                    text.push_str(&format!(" {message}"));
                }
                if outcome == Outcome::Win && self.stats.streak > 1 {
                    text.push_str(&format!(" 🔥 {} Win Streak!", self.stats.streak));
                }
                Some(text)
            }
            EventKind::PersistenceFailed { error } => {
                Some(format!("Could not save statistics: {error}"))
            }
            EventKind::CelebrationEnded | EventKind::Reset => None,
        }
    }
}

/// Consumer of round events
pub trait EventSink {
    fn emit(&mut self, event: &RoundEvent);
}

impl<F: FnMut(&RoundEvent)> EventSink for F {
    fn emit(&mut self, event: &RoundEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &RoundEvent) {}
}

/// Records events into a shared buffer
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the controller.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<RoundEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RoundEvent> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(|e| e.kind.clone()).collect()
    }

    pub fn last(&self) -> Option<RoundEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &RoundEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
