//! Analysis session state — the canonical table snapshot behind an atomic
//! swap slot, plus a generation-keyed cache of aggregate results.
//!
//! Queries take an `Arc<LeadTable>` snapshot and never observe a partial
//! reload. Cache keys embed the snapshot generation, so swapping in a new
//! table invalidates every cached aggregate at once; partial invalidation
//! is impossible by construction.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use funnel_core::{FunnelResult, LeadTable};
use funnel_ingest::{load_csv, QualityReport};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    generation: u64,
    query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReloadSummary {
    pub generation: u64,
    pub rows: usize,
    pub anomalies: usize,
}

pub struct AnalysisSession {
    dataset_path: PathBuf,
    table: RwLock<Arc<LeadTable>>,
    quality: RwLock<Arc<QualityReport>>,
    generation: AtomicU64,
    cache: DashMap<CacheKey, Arc<serde_json::Value>>,
}

impl AnalysisSession {
    /// Load the dataset once and open a session at generation 1.
    pub fn open(dataset_path: impl Into<PathBuf>) -> FunnelResult<AnalysisSession> {
        let dataset_path = dataset_path.into();
        let (table, report) = load_csv(&dataset_path, 1)?;
        Ok(AnalysisSession {
            dataset_path,
            table: RwLock::new(Arc::new(table)),
            quality: RwLock::new(Arc::new(report)),
            generation: AtomicU64::new(1),
            cache: DashMap::new(),
        })
    }

    /// Open a session over an already-built table; used by tests.
    pub fn with_table(table: LeadTable, report: QualityReport) -> AnalysisSession {
        let generation = table.generation();
        AnalysisSession {
            dataset_path: PathBuf::new(),
            table: RwLock::new(Arc::new(table)),
            quality: RwLock::new(Arc::new(report)),
            generation: AtomicU64::new(generation),
            cache: DashMap::new(),
        }
    }

    /// Current immutable table snapshot.
    pub fn table(&self) -> Arc<LeadTable> {
        self.table.read().clone()
    }

    pub fn quality(&self) -> Arc<QualityReport> {
        self.quality.read().clone()
    }

    /// Reload the dataset and swap the snapshot wholesale. Stale cache
    /// entries (any older generation) are dropped in the same step.
    pub fn reload(&self) -> FunnelResult<ReloadSummary> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (table, report) = load_csv(&self.dataset_path, generation)?;
        let summary = ReloadSummary {
            generation,
            rows: table.len(),
            anomalies: report.anomaly_count(),
        };

        *self.table.write() = Arc::new(table);
        *self.quality.write() = Arc::new(report);
        self.cache.retain(|key, _| key.generation == generation);

        info!(
            generation,
            rows = summary.rows,
            "Dataset reloaded, aggregate cache invalidated"
        );
        Ok(summary)
    }

    /// Fetch a cached aggregate for the current snapshot, or build and
    /// cache it. `build` runs against the snapshot the key derives from.
    pub fn cached_or<F>(&self, query: &str, build: F) -> FunnelResult<Arc<serde_json::Value>>
    where
        F: FnOnce(&LeadTable) -> FunnelResult<serde_json::Value>,
    {
        let table = self.table();
        let key = CacheKey {
            generation: table.generation(),
            query: query.to_string(),
        };

        if let Some(hit) = self.cache.get(&key) {
            metrics::counter!("api.cache_hits").increment(1);
            return Ok(hit.clone());
        }

        let value = Arc::new(build(&table)?);
        self.cache.insert(key, value.clone());
        metrics::counter!("api.cache_misses").increment(1);
        Ok(value)
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
