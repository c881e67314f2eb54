//! Immutable canonical lead table. Built once by the normalizer, then
//! shared read-only across all queries; a reload produces a whole new
//! snapshot with a higher generation, never an in-place mutation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::LeadRecord;

#[derive(Debug, Clone, Serialize)]
pub struct LeadTable {
    rows: Vec<LeadRecord>,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

impl LeadTable {
    pub fn new(rows: Vec<LeadRecord>, generation: u64) -> LeadTable {
        LeadTable {
            rows,
            generation,
            loaded_at: Utc::now(),
        }
    }

    pub fn rows(&self) -> &[LeadRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Snapshot generation; cache keys derive from this so a reload
    /// invalidates every cached aggregate at once.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Earliest and latest creation timestamps among rows that have one.
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut timestamps = self.rows.iter().filter_map(|r| r.created_at);
        let first = timestamps.next()?;
        let (min, max) = timestamps.fold((first, first), |(lo, hi), ts| {
            (lo.min(ts), hi.max(ts))
        });
        Some((min, max))
    }
}
