//! JSON file backend for the statistics slot

use super::{decode_record, encode_record, StatsStore};
use crate::core::StatsRecord;
use crate::{Result, RpslsError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default file name, next to the working directory
pub const DEFAULT_STATS_FILE: &str = "rpsls-stats.json";

/// Stores the statistics record as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStatsStore {
    path: PathBuf,
}

impl JsonFileStatsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileStatsStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STATS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonFileStatsStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATS_FILE)
    }
}

impl StatsStore for JsonFileStatsStore {
    fn load(&self) -> Result<Option<StatsRecord>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(decode_record(&contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RpslsError::PersistenceRead(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&mut self, stats: &StatsRecord) -> Result<()> {
        let json = encode_record(stats)?;
        let tmp = self.temp_path();

        // Write next to the target, then rename over it
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| RpslsError::PersistenceWrite(format!("{}: {}", self.path.display(), e)))
    }
}
