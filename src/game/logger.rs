//! Round logger
//!
//! Diagnostics from the round controller and the session loop, filtered by
//! [`VerbosityLevel`] and written to stdout as text or one JSON object per
//! line. Tests switch on capture, which keeps every entry in memory
//! (regardless of level) instead of printing it.

use crate::game::VerbosityLevel;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};

/// How log lines are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, indented below round headers
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// A single log line
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// "transition", "persistence", or none for general messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

pub struct GameLogger {
    verbosity: VerbosityLevel,
    format: OutputFormat,
    /// Keep entries in memory instead of printing them
    capture: bool,
    captured: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    /// Logger at the default verbosity (Normal)
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            format: OutputFormat::default(),
            capture: false,
            captured: RefCell::new(Vec::new()),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    /// Stop printing and record every entry for later inspection
    pub fn enable_capture(&mut self) {
        self.capture = true;
    }

    /// Entries recorded since capture was enabled
    pub fn logs(&self) -> Ref<'_, [LogEntry]> {
        Ref::map(self.captured.borrow(), Vec::as_slice)
    }

    /// Render an entry the way it is printed
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string(entry).unwrap_or_else(|_| entry.message.clone())
            }
            OutputFormat::Text if entry.level <= VerbosityLevel::Minimal => entry.message.clone(),
            OutputFormat::Text => format!("  {}", entry.message),
        }
    }

    fn log(&self, level: VerbosityLevel, category: Option<&str>, message: &str) {
        if !self.capture && level > self.verbosity {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            category: category.map(str::to_string),
        };

        if self.capture {
            self.captured.borrow_mut().push(entry);
        } else {
            println!("{}", self.format_entry(&entry));
        }
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.log(VerbosityLevel::Minimal, None, message);
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        self.log(VerbosityLevel::Normal, None, message);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.log(VerbosityLevel::Verbose, None, message);
    }

    /// Phase change, at Verbose
    pub fn transition(&self, message: &str) {
        self.log(VerbosityLevel::Verbose, Some("transition"), message);
    }

    /// A statistics read or write failed
    ///
    /// Goes to stderr (unless Silent) so it stays visible next to the round
    /// output on stdout.
    pub fn persistence_warning(&self, message: &str) {
        if self.capture {
            self.captured.borrow_mut().push(LogEntry {
                level: VerbosityLevel::Minimal,
                message: message.to_string(),
                category: Some("persistence".to_string()),
            });
        } else if self.verbosity > VerbosityLevel::Silent {
            eprintln!("warning: {message}");
        }
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("format", &self.format)
            .field("captured", &self.captured.borrow().len())
            .finish()
    }
}
