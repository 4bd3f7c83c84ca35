//! HTTP Transport
//!
//! Thin shell around the telemetry store. Three listeners share one
//! [`AppState`]:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  API :8080   │   │ Health :8081 │   │ Metrics :9090│
//! │  /api/...    │   │ /healthz ... │   │ /metrics     │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!                 AppState { repo, metrics, health }
//! ```

pub mod handlers;
pub mod router;
pub mod server;

use std::sync::Arc;

use crate::domain::TelemetryRepository;
use crate::health::HealthCheck;
use crate::metrics::TelemetryMetrics;

pub use router::{dispatch, dispatch_health, dispatch_metrics, read_body, Route, MAX_BODY_BYTES};
pub use server::{bind, serve};

/// Shared state handed to every connection
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn TelemetryRepository>,
    pub metrics: Arc<TelemetryMetrics>,
    pub health: Arc<HealthCheck>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn TelemetryRepository>,
        metrics: Arc<TelemetryMetrics>,
        health: Arc<HealthCheck>,
    ) -> Self {
        Self {
            repo,
            metrics,
            health,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("metrics", &self.metrics)
            .field("ready", &self.health.is_ready())
            .finish()
    }
}
