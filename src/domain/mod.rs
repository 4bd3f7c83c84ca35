//! Domain Layer
//!
//! - **Reading** (`reading.rs`) - the telemetry value type
//! - **Ports** (`ports.rs`) - the storage contract used by the transport
//! - **Analytics** (`analytics.rs`) - aggregates over an equipment's readings

pub mod analytics;
pub mod ports;
pub mod reading;

pub use analytics::AnalyticsSummary;
pub use ports::TelemetryRepository;
pub use reading::Reading;
