//! Best-run leaderboard
//!
//! Persisted through a [`SaveStore`], tracks the top 10 runs by lifetime earnings.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::SaveStore;

/// Maximum number of runs to keep
pub const MAX_RECORDS: usize = 10;

/// Store key for the leaderboard
pub const RECORDS_KEY: &str = "records";

/// A finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Total cash earned selling cargo
    pub earnings: u64,
    /// Deepest row reached
    pub max_depth: u32,
    /// World seed, so the run can be replayed
    pub seed: u64,
}

/// Leaderboard, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Records {
    pub entries: Vec<RunRecord>,
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a run would make the board
    pub fn qualifies(&self, earnings: u64) -> bool {
        if earnings == 0 {
            return false;
        }
        if self.entries.len() < MAX_RECORDS {
            return true;
        }
        self.entries.last().is_none_or(|e| earnings > e.earnings)
    }

    /// Insert a run if it qualifies. Returns its 1-based rank.
    pub fn add(&mut self, record: RunRecord) -> Option<usize> {
        if !self.qualifies(record.earnings) {
            return None;
        }

        // Ties keep the older run ahead
        let pos = self
            .entries
            .iter()
            .position(|e| record.earnings > e.earnings)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, record);
        self.entries.truncate(MAX_RECORDS);
        Some(pos + 1)
    }

    pub fn best(&self) -> Option<&RunRecord> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read the board from `store`; an empty board if none was saved
    pub fn load(store: &dyn SaveStore) -> Result<Self> {
        let Some(json) = store.read(RECORDS_KEY)? else {
            log::info!("No records found, starting fresh");
            return Ok(Self::new());
        };
        let mut records: Records = serde_json::from_str(&json)?;
        records
            .entries
            .sort_by(|a, b| b.earnings.cmp(&a.earnings));
        records.entries.truncate(MAX_RECORDS);
        log::info!("Loaded {} records", records.entries.len());
        Ok(records)
    }

    pub fn save(&self, store: &mut dyn SaveStore) -> Result<()> {
        store.write(RECORDS_KEY, &serde_json::to_string(self)?)?;
        log::info!("Records saved ({} entries)", self.entries.len());
        Ok(())
    }
}
