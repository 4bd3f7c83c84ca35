//! Telemetry Store
//!
//! Maps equipment identifiers to bounded series and answers point-in-time
//! queries sorted newest-first.
//!
//! # Concurrency
//!
//! - `DashMap` provides atomic get-or-insert, so each identifier gets exactly
//!   one series even under concurrent first writes
//! - Each series sits behind its own `RwLock`; append and evict happen under
//!   one write guard
//! - The map guard is always released before a series lock is taken
//! - Queries copy a snapshot under the read guard and sort outside it

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::series::Series;
use super::MAX_READINGS_PER_EQUIPMENT;
use crate::domain::{Reading, TelemetryRepository};
use crate::error::{Error, Result};

/// Telemetry store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Readings retained per equipment before FIFO eviction
    pub max_readings_per_equipment: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_readings_per_equipment: MAX_READINGS_PER_EQUIPMENT,
        }
    }
}

impl StoreConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_readings_per_equipment == 0 {
            return Err(Error::Config(
                "max_readings_per_equipment must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Equipment units with at least one reading
    pub equipment_count: usize,
    /// Readings currently held across all series
    pub stored_readings: usize,
    /// Readings accepted since startup
    pub ingested_total: u64,
    /// Readings dropped by the sliding window since startup
    pub evicted_total: u64,
}

/// In-memory, concurrently writable telemetry store
#[derive(Debug)]
pub struct TelemetryStore {
    config: StoreConfig,
    series: DashMap<String, Arc<RwLock<Series>>>,
    ingested: AtomicU64,
    evicted: AtomicU64,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore {
    /// Create a store with the default cap
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            series: DashMap::new(),
            ingested: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    /// Create a store with a custom configuration
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Append a reading to its equipment's series.
    ///
    /// Fails only when the equipment identifier is empty.
    pub fn ingest(&self, reading: Reading) -> Result<()> {
        if reading.equipment_id.is_empty() {
            return Err(Error::InvalidArgument(
                "equipment id must not be empty".to_string(),
            ));
        }

        let series = self.series_for(&reading.equipment_id);
        let evicted = series.write().push(reading);

        self.ingested.fetch_add(1, Ordering::Relaxed);
        if let Some(old) = evicted {
            self.evicted.fetch_add(1, Ordering::Relaxed);
            trace!(
                equipment_id = %old.equipment_id,
                timestamp = %old.timestamp,
                "Evicted oldest reading"
            );
        }
        Ok(())
    }

    /// All readings for `equipment_id`, newest first.
    ///
    /// Equal timestamps keep their insertion order (stable sort).
    pub fn query_all(&self, equipment_id: &str) -> Vec<Reading> {
        let mut readings = self.snapshot(equipment_id);
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        readings
    }

    /// The reading `query_all` would list first.
    pub fn query_latest(&self, equipment_id: &str) -> Option<Reading> {
        let series = self.get_series(equipment_id)?;
        let guard = series.read();
        guard.latest().cloned()
    }

    /// The first `limit` readings of `query_all`.
    pub fn query_recent(&self, equipment_id: &str, limit: usize) -> Vec<Reading> {
        if limit == 0 {
            return Vec::new();
        }
        let mut readings = self.query_all(equipment_id);
        readings.truncate(limit);
        readings
    }

    /// Readings for `equipment_id` in insertion order (oldest first).
    pub fn snapshot(&self, equipment_id: &str) -> Vec<Reading> {
        let Some(series) = self.get_series(equipment_id) else {
            return Vec::new();
        };
        let guard = series.read();
        guard.to_vec()
    }

    /// Number of readings currently held for `equipment_id`
    pub fn series_len(&self, equipment_id: &str) -> usize {
        let Some(series) = self.get_series(equipment_id) else {
            return 0;
        };
        let guard = series.read();
        guard.len()
    }

    /// Known equipment identifiers, sorted
    pub fn equipment_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.series.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Current statistics
    pub fn stats(&self) -> StoreStats {
        // Release the map shards before touching any series lock
        let series: Vec<Arc<RwLock<Series>>> =
            self.series.iter().map(|e| Arc::clone(e.value())).collect();

        StoreStats {
            equipment_count: series.len(),
            stored_readings: series.iter().map(|s| s.read().len()).sum(),
            ingested_total: self.ingested.load(Ordering::Relaxed),
            evicted_total: self.evicted.load(Ordering::Relaxed),
        }
    }

    fn get_series(&self, equipment_id: &str) -> Option<Arc<RwLock<Series>>> {
        self.series.get(equipment_id).map(|s| Arc::clone(s.value()))
    }

    /// Get or create the series for `equipment_id`
    fn series_for(&self, equipment_id: &str) -> Arc<RwLock<Series>> {
        if let Some(series) = self.get_series(equipment_id) {
            return series;
        }

        let capacity = self.config.max_readings_per_equipment;
        self.series
            .entry(equipment_id.to_string())
            .or_insert_with(|| {
                debug!(equipment_id, capacity, "Creating series");
                Arc::new(RwLock::new(Series::new(capacity)))
            })
            .clone()
    }
}

impl TelemetryRepository for TelemetryStore {
    fn ingest(&self, reading: Reading) -> Result<()> {
        TelemetryStore::ingest(self, reading)
    }

    fn query_all(&self, equipment_id: &str) -> Vec<Reading> {
        TelemetryStore::query_all(self, equipment_id)
    }

    fn query_latest(&self, equipment_id: &str) -> Option<Reading> {
        TelemetryStore::query_latest(self, equipment_id)
    }

    fn query_recent(&self, equipment_id: &str, limit: usize) -> Vec<Reading> {
        TelemetryStore::query_recent(self, equipment_id, limit)
    }

    fn equipment_ids(&self) -> Vec<String> {
        TelemetryStore::equipment_ids(self)
    }

    fn stats(&self) -> StoreStats {
        TelemetryStore::stats(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
