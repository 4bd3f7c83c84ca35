//! Metrics module
//!
//! Prometheus exposition for the ingestion API and the telemetry store.

mod exporter;

pub use exporter::{Scrape, TelemetryMetrics};
