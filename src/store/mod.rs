//! Telemetry Store
//!
//! Bounded, concurrently written per-equipment time series with
//! sort-on-read queries.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        TelemetryStore                            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  DashMap<equipment id, Arc<RwLock<Series>>>                      │
//! │     "CNC-001" ──▶ [r0, r1, ... r999]   (insertion order)         │
//! │     "PUMP-7"  ──▶ [r0, r1, ...]                                  │
//! │                                                                  │
//! │  ingest:  get-or-create ─▶ write lock ─▶ push + evict-one        │
//! │  query:   read lock ─▶ copy snapshot ─▶ stable sort (desc time)  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Every series holds at most `max_readings_per_equipment` readings
//! - Eviction is FIFO over insertion order, never over timestamps
//! - Concurrent ingests are never lost; readers never see a torn append

mod series;
mod telemetry;

#[cfg(test)]
mod proptest;

pub use series::Series;
pub use telemetry::{StoreConfig, StoreStats, TelemetryStore};

/// Default readings retained per equipment unit
pub const MAX_READINGS_PER_EQUIPMENT: usize = 1000;

/// Default number of readings returned by recent-N queries
pub const DEFAULT_RECENT_LIMIT: usize = 10;

// =============================================================================
// Tests
// =============================================================================
