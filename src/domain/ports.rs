//! Domain Ports (Port/Adapter Pattern)
//!
//! The transport shell talks to telemetry storage only through
//! [`TelemetryRepository`]. The in-memory [`TelemetryStore`] is the
//! production adapter; tests substitute their own implementations.
//!
//! ```text
//! ┌──────────────────────┐      ┌───────────────────────────┐
//! │   api (handlers)     │ ───▶ │  TelemetryRepository      │
//! └──────────────────────┘      └───────────────────────────┘
//!                                            │
//!                                            ▼
//!                               ┌───────────────────────────┐
//!                               │  store::TelemetryStore    │
//!                               └───────────────────────────┘
//! ```
//!
//! [`TelemetryStore`]: crate::store::TelemetryStore

use crate::domain::Reading;
use crate::error::Result;
use crate::store::StoreStats;

/// Port for storing and querying equipment telemetry.
///
/// Implementations must be safe to call from many threads at once.
pub trait TelemetryRepository: Send + Sync {
    /// Append a reading to its equipment's series.
    fn ingest(&self, reading: Reading) -> Result<()>;

    /// All stored readings for `equipment_id`, newest first.
    fn query_all(&self, equipment_id: &str) -> Vec<Reading>;

    /// The newest reading for `equipment_id`, if any.
    fn query_latest(&self, equipment_id: &str) -> Option<Reading>;

    /// At most `limit` readings for `equipment_id`, newest first.
    fn query_recent(&self, equipment_id: &str, limit: usize) -> Vec<Reading>;

    /// Known equipment identifiers, sorted.
    fn equipment_ids(&self) -> Vec<String>;

    /// Point-in-time statistics.
    fn stats(&self) -> StoreStats {
        StoreStats::default()
    }
}
