//! Statistics storage
//!
//! The round controller only sees the [`StatsStore`] trait: read once at
//! startup, write after every settled round. Tests inject
//! [`InMemoryStatsStore`]; the CLI uses [`JsonFileStatsStore`].

pub mod file;
pub mod memory;

pub use file::JsonFileStatsStore;
pub use memory::InMemoryStatsStore;

use crate::core::StatsRecord;
use crate::Result;

/// A single durable slot holding the statistics record
pub trait StatsStore {
    /// Read the stored record. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<StatsRecord>>;

    /// Overwrite the stored record. Must be idempotent.
    fn save(&mut self, stats: &StatsRecord) -> Result<()>;
}

impl<S: StatsStore + ?Sized> StatsStore for Box<S> {
    fn load(&self) -> Result<Option<StatsRecord>> {
        (**self).load()
    }

    fn save(&mut self, stats: &StatsRecord) -> Result<()> {
        (**self).save(stats)
    }
}

/// Decode a stored record, tolerating missing fields and garbage.
///
/// Corrupt input yields `None` so the caller falls back to zeroed stats.
pub fn decode_record(raw: &str) -> Option<StatsRecord> {
    serde_json::from_str::<StatsRecord>(raw)
        .ok()
        .map(StatsRecord::normalized)
}

pub fn encode_record(stats: &StatsRecord) -> Result<String> {
    serde_json::to_string_pretty(stats)
        .map_err(|e| crate::RpslsError::SerializationError(e.to_string()))
}
