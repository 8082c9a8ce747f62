//! Round lifecycle, timing and move controllers

pub mod config;
pub mod controller;
pub mod events;
pub mod fixed_script_controller;
pub mod game_loop;
pub mod interactive_controller;
pub mod logger;
pub mod phase;
pub mod random_controller;
pub mod round;
pub mod timer;

pub use config::GameConfig;
pub use controller::{PlayerController, RoundView};
pub use events::{EventKind, EventLog, EventSink, NullSink, RoundEvent};
pub use fixed_script_controller::FixedScriptController;
pub use game_loop::{GameLoop, SessionEndReason, SessionResult, VerbosityLevel};
pub use interactive_controller::InteractiveController;
pub use logger::{GameLogger, LogEntry, OutputFormat};
pub use phase::RoundPhase;
pub use random_controller::RandomController;
pub use round::{RoundController, RoundState, RoundSummary};
pub use timer::{TimerEntry, TimerKind, TimerQueue};
