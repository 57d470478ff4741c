//! Row types returned by the Geo Store

use chrono::{DateTime, Utc};
use floodwatch_core::{Coordinates, FloodForecast, MonitoringStation};
use serde::{Deserialize, Serialize};

/// Most recent reading of a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestReading {
    pub level: f64,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

/// An active station joined with its latest reading, if it ever reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub station: MonitoringStation,
    pub latest: Option<LatestReading>,
}

/// Rainfall summed per (district, point) over a time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallTotal {
    pub district: String,
    pub location: Coordinates,
    pub total_mm: f64,
    pub last_updated: DateTime<Utc>,
}

/// Both alert signals, read from the same point in time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlertSnapshot {
    pub stations: Vec<StationSnapshot>,
    pub forecasts: Vec<FloodForecast>,
}

/// Bounds for selecting current forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastWindow {
    /// Earliest accepted forecast target time
    pub target_from: DateTime<Utc>,
    /// Latest accepted forecast target time
    pub target_until: DateTime<Utc>,
    /// Earliest accepted issue time
    pub issued_since: DateTime<Utc>,
}

impl ForecastWindow {
    pub fn contains(&self, forecast_time: DateTime<Utc>, created_at: DateTime<Utc>) -> bool {
        forecast_time >= self.target_from
            && forecast_time <= self.target_until
            && created_at >= self.issued_since
    }
}
