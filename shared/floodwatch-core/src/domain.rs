//! Flood monitoring domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitoring station identifier
pub type StationId = i32;

/// A WGS84 point, serialized as `[lon, lat]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinates {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lon, c.lat]
    }
}

/// Closed ring of `[lon, lat]` positions
pub type LinearRing = Vec<[f64; 2]>;

/// GeoJSON geometry. Only polygons are stored by the geo store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<LinearRing> },
}

impl Geometry {
    /// Axis-aligned square of half-width `half` degrees around a centre point
    pub fn square(center: Coordinates, half: f64) -> Self {
        let (lon, lat) = (center.lon, center.lat);
        Geometry::Polygon {
            coordinates: vec![vec![
                [lon - half, lat - half],
                [lon + half, lat - half],
                [lon + half, lat + half],
                [lon - half, lat + half],
                [lon - half, lat - half],
            ]],
        }
    }

    /// Well-known text, as accepted by `ST_GeomFromText`
    pub fn to_wkt(&self) -> String {
        match self {
            Geometry::Polygon { coordinates } => {
                let rings: Vec<String> = coordinates
                    .iter()
                    .map(|ring| {
                        let points: Vec<String> =
                            ring.iter().map(|[x, y]| format!("{} {}", x, y)).collect();
                        format!("({})", points.join(", "))
                    })
                    .collect();
                format!("POLYGON({})", rings.join(", "))
            }
        }
    }
}

/// Ascending water level thresholds of a gauge station, in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub normal: f64,
    pub warning: f64,
    pub danger: f64,
}

impl Thresholds {
    pub fn new(normal: f64, warning: f64, danger: f64) -> Self {
        Self { normal, warning, danger }
    }

    /// normal < warning < danger
    pub fn is_ascending(&self) -> bool {
        self.normal < self.warning && self.warning < self.danger
    }
}

/// River gauge monitoring station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringStation {
    pub id: StationId,
    pub name: String,
    pub river_name: String,
    pub district: String,
    pub location: Coordinates,
    pub thresholds: Thresholds,
    pub is_active: bool,
}

/// One timestamped water level observation.
///
/// `status` is the label written alongside the reading. It may be stale
/// relative to the station's current thresholds and is never used for
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterLevelReading {
    pub station_id: StationId,
    pub level: f64,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallObservation {
    pub district: String,
    pub location: Coordinates,
    pub rainfall_mm: f64,
    pub duration_hours: i32,
    pub timestamp: DateTime<Utc>,
}

/// Predicted flood risk for a district
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodForecast {
    pub district: String,
    /// Stored label; see [`crate::RiskLevel`] for the ordering
    pub risk_level: String,
    pub area: Geometry,
    /// When the predicted event occurs
    pub forecast_time: DateTime<Utc>,
    /// When the forecast was issued
    pub created_at: DateTime<Utc>,
    /// 0.0 to 1.0; `None` where the store holds NULL
    pub confidence: Option<f64>,
    pub affected_population: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub name: String,
    pub boundary: Geometry,
    pub population: Option<i32>,
    pub area_sq_km: Option<f64>,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lon, self.lat)
    }
}
