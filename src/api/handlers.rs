//! Request Handlers
//!
//! Transport-level policy on top of [`TelemetryRepository`]: request
//! validation, and mapping of empty results to not-found. Handlers are plain
//! functions returning [`Result`] so the router decides the response shape.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::domain::{AnalyticsSummary, Reading, TelemetryRepository};
use crate::error::{Error, Result};
use crate::store::DEFAULT_RECENT_LIMIT;

/// Acknowledgement body for accepted readings
pub const SUBMIT_ACK: &str = "Telemetry data received successfully";

/// Ingestion request body.
///
/// Every field is optional at parse time so missing ones can be reported
/// individually by [`SubmitRequest::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub equipment_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub vibration: Option<f64>,
    pub pressure: Option<f64>,
}

impl SubmitRequest {
    /// Parse a JSON body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::Validation(format!("Malformed request body: {}", e)))
    }

    /// Check required fields and build the reading
    pub fn validate(self) -> Result<Reading> {
        let equipment_id = self.equipment_id.filter(|id| !id.trim().is_empty());

        match (
            equipment_id,
            self.timestamp,
            self.temperature,
            self.vibration,
            self.pressure,
        ) {
            (Some(id), Some(timestamp), Some(temperature), Some(vibration), Some(pressure)) => {
                Ok(Reading::new(id, timestamp, temperature, vibration, pressure))
            }
            (id, timestamp, temperature, vibration, pressure) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push("Equipment ID is required");
                }
                if timestamp.is_none() {
                    missing.push("Timestamp is required");
                }
                if temperature.is_none() {
                    missing.push("Temperature is required");
                }
                if vibration.is_none() {
                    missing.push("Vibration is required");
                }
                if pressure.is_none() {
                    missing.push("Pressure is required");
                }
                Err(Error::Validation(missing.join("; ")))
            }
        }
    }
}

/// Validate and store one reading.
pub fn submit(repo: &dyn TelemetryRepository, body: &[u8]) -> Result<()> {
    let reading = SubmitRequest::from_json(body)?.validate()?;
    let equipment_id = reading.equipment_id.clone();

    info!("Received telemetry data for equipment: {}", equipment_id);

    repo.ingest(reading).map_err(|e| {
        error!(
            equipment_id = %equipment_id,
            "Error storing telemetry data: {}", e
        );
        Error::Internal("Error processing telemetry data".to_string())
    })
}

/// Full history, newest first; not-found when empty.
#[instrument(skip(repo))]
pub fn fetch_all(repo: &dyn TelemetryRepository, equipment_id: &str) -> Result<Vec<Reading>> {
    info!("Fetching telemetry for equipment: {}", equipment_id);

    let readings = repo.query_all(equipment_id);
    if readings.is_empty() {
        return Err(not_found(equipment_id));
    }
    Ok(readings)
}

/// Latest reading; not-found when absent.
#[instrument(skip(repo))]
pub fn fetch_latest(repo: &dyn TelemetryRepository, equipment_id: &str) -> Result<Reading> {
    repo.query_latest(equipment_id)
        .ok_or_else(|| not_found(equipment_id))
}

/// Up to `limit` newest readings. An empty result is not an error here.
#[instrument(skip(repo))]
pub fn fetch_recent(
    repo: &dyn TelemetryRepository,
    equipment_id: &str,
    limit: usize,
) -> Vec<Reading> {
    repo.query_recent(equipment_id, limit)
}

/// Aggregate statistics; not-found when there is no data.
#[instrument(skip(repo))]
pub fn fetch_analytics(
    repo: &dyn TelemetryRepository,
    equipment_id: &str,
) -> Result<AnalyticsSummary> {
    info!("Fetching analytics for equipment: {}", equipment_id);

    let readings = repo.query_all(equipment_id);
    AnalyticsSummary::from_readings(equipment_id, &readings).ok_or_else(|| {
        warn!("No telemetry data found for equipment: {}", equipment_id);
        not_found(equipment_id)
    })
}

/// Known equipment identifiers
pub fn list_equipment(repo: &dyn TelemetryRepository) -> Vec<String> {
    repo.equipment_ids()
}

/// Read `limit` from a query string, defaulting when absent
pub fn parse_limit(query: Option<&str>) -> Result<usize> {
    let value = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "limit")
        .map(|(_, value)| value);

    match value {
        None => Ok(DEFAULT_RECENT_LIMIT),
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            Error::Validation(format!(
                "limit must be a non-negative integer, got '{}'",
                raw
            ))
        }),
    }
}

fn not_found(equipment_id: &str) -> Error {
    Error::NotFound(format!("No telemetry data for equipment {}", equipment_id))
}

// =============================================================================
// Tests
// =============================================================================
