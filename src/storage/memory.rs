//! In-memory statistics store for tests and simulations

use super::{decode_record, encode_record, StatsStore};
use crate::core::StatsRecord;
use crate::{Result, RpslsError};

/// Keeps the encoded record in a `String`, like a browser local-storage slot.
///
/// Reads and writes can be made to fail to exercise the controller's
/// best-effort persistence paths.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStatsStore {
    slot: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    /// Number of successful saves
    pub writes: usize,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a record already stored
    pub fn with_record(stats: StatsRecord) -> Result<Self> {
        Ok(InMemoryStatsStore {
            slot: Some(encode_record(&stats)?),
            ..Self::default()
        })
    }

    /// Start with raw slot contents (possibly corrupt)
    pub fn with_raw(raw: impl Into<String>) -> Self {
        InMemoryStatsStore {
            slot: Some(raw.into()),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw slot contents
    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Decoded slot contents, bypassing failure injection
    pub fn stored(&self) -> Option<StatsRecord> {
        self.slot.as_deref().and_then(decode_record)
    }
}

impl StatsStore for InMemoryStatsStore {
    fn load(&self) -> Result<Option<StatsRecord>> {
        if self.fail_reads {
            return Err(RpslsError::PersistenceRead("storage unavailable".to_string()));
        }
        Ok(self.stored())
    }

    fn save(&mut self, stats: &StatsRecord) -> Result<()> {
        if self.fail_writes {
            return Err(RpslsError::PersistenceWrite("storage unavailable".to_string()));
        }
        self.slot = Some(encode_record(stats)?);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_loads_none() {
        let store = InMemoryStatsStore::new();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = InMemoryStatsStore::new();
        let stats = StatsRecord {
            wins: 2,
            streak: 2,
            best_streak: 2,
            ..Default::default()
        };
        store.save(&stats).unwrap();
        assert_eq!(store.load().unwrap(), Some(stats));
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn test_corrupt_slot_loads_none() {
        let store = InMemoryStatsStore::with_raw("{wins: oops");
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_injected_failures() {
        let mut store = InMemoryStatsStore::new();
        store.set_fail_writes(true);
        assert!(matches!(
            store.save(&StatsRecord::default()),
            Err(RpslsError::PersistenceWrite(_))
        ));
        assert_eq!(store.raw(), None);

        store.set_fail_reads(true);
        assert!(matches!(store.load(), Err(RpslsError::PersistenceRead(_))));
    }
}
