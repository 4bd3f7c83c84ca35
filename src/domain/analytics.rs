//! Equipment Analytics
//!
//! Aggregate view over an equipment's stored readings: counts, averages and
//! extremes, plus the most recent sample.

use serde::{Deserialize, Serialize};

use super::Reading;

/// Summary statistics for one equipment unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub equipment_id: String,
    pub reading_count: usize,
    pub average_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub average_vibration: f64,
    pub max_vibration: f64,
    pub average_pressure: f64,
    /// Reading with the greatest timestamp
    pub last_reading: Option<Reading>,
}

impl AnalyticsSummary {
    /// Summarize `readings`, or `None` when there are none.
    ///
    /// `readings` may be in any order; `last_reading` is the first reading
    /// carrying the maximum timestamp.
    pub fn from_readings(equipment_id: &str, readings: &[Reading]) -> Option<Self> {
        let first = readings.first()?;
        let count = readings.len() as f64;

        let mut sum_temperature = 0.0;
        let mut sum_vibration = 0.0;
        let mut sum_pressure = 0.0;
        let mut min_temperature = f64::INFINITY;
        let mut max_temperature = f64::NEG_INFINITY;
        let mut max_vibration = f64::NEG_INFINITY;
        let mut last = first;

        for r in readings {
            sum_temperature += r.temperature;
            sum_vibration += r.vibration;
            sum_pressure += r.pressure;
            min_temperature = min_temperature.min(r.temperature);
            max_temperature = max_temperature.max(r.temperature);
            max_vibration = max_vibration.max(r.vibration);
            if r.timestamp > last.timestamp {
                last = r;
            }
        }

        Some(Self {
            equipment_id: equipment_id.to_string(),
            reading_count: readings.len(),
            average_temperature: sum_temperature / count,
            min_temperature,
            max_temperature,
            average_vibration: sum_vibration / count,
            max_vibration,
            average_pressure: sum_pressure / count,
            last_reading: Some(last.clone()),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(secs: i64, temperature: f64, vibration: f64, pressure: f64) -> Reading {
        Reading::new(
            "CNC-001",
            Utc.timestamp_opt(secs, 0).unwrap(),
            temperature,
            vibration,
            pressure,
        )
    }

    #[test]
    fn test_empty_readings() {
        assert!(AnalyticsSummary::from_readings("CNC-001", &[]).is_none());
    }

    #[test]
    fn test_summary_values() {
        let readings = vec![
            reading(100, 75.5, 0.18, 102.3),
            reading(300, 76.0, 0.19, 103.5),
            reading(200, 80.1, 0.22, 101.0),
        ];

        let summary = AnalyticsSummary::from_readings("CNC-001", &readings).unwrap();

        assert_eq!(summary.equipment_id, "CNC-001");
        assert_eq!(summary.reading_count, 3);
        assert!((summary.average_temperature - (75.5 + 76.0 + 80.1) / 3.0).abs() < 1e-9);
        assert_eq!(summary.min_temperature, 75.5);
        assert_eq!(summary.max_temperature, 80.1);
        assert!((summary.average_vibration - (0.18 + 0.19 + 0.22) / 3.0).abs() < 1e-9);
        assert_eq!(summary.max_vibration, 0.22);
        assert!((summary.average_pressure - (102.3 + 103.5 + 101.0) / 3.0).abs() < 1e-9);
        assert_eq!(summary.last_reading, Some(readings[1].clone()));
    }

    #[test]
    fn test_last_reading_tie_keeps_first() {
        let readings = vec![reading(500, 1.0, 0.0, 0.0), reading(500, 2.0, 0.0, 0.0)];

        let summary = AnalyticsSummary::from_readings("CNC-001", &readings).unwrap();
        assert_eq!(summary.last_reading.unwrap().temperature, 1.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let summary =
            AnalyticsSummary::from_readings("CNC-001", &[reading(1, 70.0, 0.1, 100.0)]).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["readingCount"], 1);
        assert_eq!(json["lastReading"]["equipmentId"], "CNC-001");
    }
}
