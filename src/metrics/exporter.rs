//! Prometheus Exporter
//!
//! Request counters and latencies for the HTTP surface, plus store gauges
//! and the eviction counter refreshed from [`StoreStats`] at scrape time.

use std::time::Duration;

use hyper::StatusCode;
use parking_lot::Mutex;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

use crate::error::Result;
use crate::store::StoreStats;

/// Latency buckets in seconds; the store answers in microseconds, so the
/// low end is dense.
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Encoded scrape payload
#[derive(Debug, Clone)]
pub struct Scrape {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Metrics registry for the service
pub struct TelemetryMetrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_request_duration: HistogramVec,
    readings_ingested: IntCounter,
    equipment_tracked: IntGauge,
    readings_stored: IntGauge,
    readings_evicted: IntCounter,
    // Serializes scrape-time refreshes so the eviction delta is applied once
    refresh: Mutex<()>,
}

impl TelemetryMetrics {
    /// Create and register all metrics in a fresh registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            Opts::new(
                "telemetry_http_requests_total",
                "HTTP requests handled, by route and status",
            ),
            &["route", "status"],
        )?;
        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "telemetry_http_request_duration_seconds",
                "HTTP request latency, by route",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["route"],
        )?;
        let readings_ingested = IntCounter::new(
            "telemetry_readings_ingested_total",
            "Readings accepted through the API",
        )?;
        let equipment_tracked = IntGauge::new(
            "telemetry_store_equipment",
            "Equipment units with stored readings",
        )?;
        let readings_stored = IntGauge::new(
            "telemetry_store_readings",
            "Readings currently held in memory",
        )?;
        let readings_evicted = IntCounter::new(
            "telemetry_store_evicted_readings_total",
            "Readings dropped by the per-equipment sliding window since startup",
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(readings_ingested.clone()))?;
        registry.register(Box::new(equipment_tracked.clone()))?;
        registry.register(Box::new(readings_stored.clone()))?;
        registry.register(Box::new(readings_evicted.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_request_duration,
            readings_ingested,
            equipment_tracked,
            readings_stored,
            readings_evicted,
            refresh: Mutex::new(()),
        })
    }

    /// Record one handled request
    pub fn record_request(&self, route: &str, status: StatusCode, elapsed: Duration) {
        self.http_requests
            .with_label_values(&[route, status.as_str()])
            .inc();
        self.http_request_duration
            .with_label_values(&[route])
            .observe(elapsed.as_secs_f64());
    }

    /// Record one accepted reading
    pub fn record_ingest(&self) {
        self.readings_ingested.inc();
    }

    pub fn readings_ingested(&self) -> u64 {
        self.readings_ingested.get()
    }

    /// Refresh store gauges and advance the eviction counter to the
    /// store's running total
    pub fn observe_store(&self, stats: &StoreStats) {
        let _guard = self.refresh.lock();
        self.equipment_tracked.set(stats.equipment_count as i64);
        self.readings_stored.set(stats.stored_readings as i64);

        let delta = stats
            .evicted_total
            .saturating_sub(self.readings_evicted.get());
        if delta > 0 {
            self.readings_evicted.inc_by(delta);
        }
    }

    /// Encode all metrics in the Prometheus text format
    pub fn render(&self) -> Result<Scrape> {
        let encoder = TextEncoder::new();
        let mut body = Vec::new();
        encoder.encode(&self.registry.gather(), &mut body)?;

        Ok(Scrape {
            content_type: encoder.format_type().to_string(),
            body,
        })
    }
}

impl std::fmt::Debug for TelemetryMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryMetrics")
            .field("readings_ingested", &self.readings_ingested.get())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
