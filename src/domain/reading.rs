//! Telemetry Reading
//!
//! One timestamped sensor sample for one equipment unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single sensor reading (value object).
///
/// Readings have no identity beyond their fields. Two readings for the same
/// equipment may share a timestamp; the store keeps both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Equipment identifier (non-empty)
    pub equipment_id: String,
    /// Sample time
    pub timestamp: DateTime<Utc>,
    /// Temperature
    pub temperature: f64,
    /// Vibration
    pub vibration: f64,
    /// Pressure
    pub pressure: f64,
}

impl Reading {
    /// Create a new reading.
    pub fn new(
        equipment_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        temperature: f64,
        vibration: f64,
        pressure: f64,
    ) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            timestamp,
            temperature,
            vibration,
            pressure,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
