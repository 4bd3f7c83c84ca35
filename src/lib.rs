//! Telemetry Ingest - Equipment Telemetry Ingestion Service
//!
//! Ingests time-stamped sensor readings (temperature, vibration, pressure)
//! keyed by equipment identifier and serves full-history, latest and
//! recent-N queries, newest first.
//!
//! # Architecture
//!
//! ```text
//! HTTP (api) → TelemetryRepository (domain) → TelemetryStore (store)
//! ```
//!
//! The store keeps a bounded, insertion-ordered window of readings per
//! equipment in memory. Nothing is persisted; a restart begins empty.
//!
//! # Modules
//!
//! - [`api`] - HTTP transport: handlers, routing, server loop
//! - [`domain`] - Reading type, repository port, analytics
//! - [`error`] - Error types
//! - [`health`] - Liveness and readiness probes
//! - [`metrics`] - Prometheus exposition
//! - [`store`] - Bounded concurrent time-series store

pub mod api;
pub mod domain;
pub mod error;
pub mod health;
pub mod metrics;
pub mod store;

// Re-export commonly used types
pub use domain::{AnalyticsSummary, Reading, TelemetryRepository};
pub use error::{Error, Result};
pub use store::{StoreConfig, StoreStats, TelemetryStore, MAX_READINGS_PER_EQUIPMENT};
