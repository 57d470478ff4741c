//! Rainfall aggregation query

use chrono::{DateTime, Duration, Utc};
use floodwatch_core::{Coordinates, RainfallIntensity};
use floodwatch_geostore::{GeoStore, RainfallTotal, StoreError};
use serde::Serialize;
use tracing::{debug, instrument};

/// Trailing window used when `hours` is absent or unusable
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallView {
    pub district: String,
    pub coordinates: Coordinates,
    pub rainfall: f64,
    pub intensity: RainfallIntensity,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RainfallResponse {
    pub rainfall: Vec<RainfallView>,
}

impl From<RainfallTotal> for RainfallView {
    fn from(total: RainfallTotal) -> Self {
        RainfallView {
            intensity: RainfallIntensity::classify(total.total_mm),
            district: total.district,
            coordinates: total.location,
            rainfall: total.total_mm,
            last_updated: total.last_updated,
        }
    }
}

/// Window size from the raw `hours` parameter. Missing, malformed and
/// non-positive values fall back to the default.
pub fn window_hours(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_WINDOW_HOURS)
}

/// 0001-01-01T00:00:00Z; PostgreSQL rejects TIMESTAMPTZ values before 4713 BC
const EARLIEST_CUTOFF_SECS: i64 = -62_135_596_800;

/// Earliest cutoff handed to the store
pub fn earliest_cutoff() -> DateTime<Utc> {
    DateTime::from_timestamp(EARLIEST_CUTOFF_SECS, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Start of the trailing window, never earlier than [`earliest_cutoff`]
pub fn cutoff(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    let floor = earliest_cutoff();
    Duration::try_hours(hours)
        .and_then(|window| now.checked_sub_signed(window))
        .map_or(floor, |start| start.max(floor))
}

/// Rainfall per district point over the last `hours`, heaviest first
#[instrument(skip(store))]
pub async fn rainfall_totals(
    store: &dyn GeoStore,
    now: DateTime<Utc>,
    hours: i64,
) -> Result<Vec<RainfallView>, StoreError> {
    let totals = store.rainfall_totals_since(cutoff(now, hours)).await?;

    let mut rainfall: Vec<RainfallView> = totals.into_iter().map(RainfallView::from).collect();
    rainfall.sort_by(|a, b| {
        b.rainfall
            .total_cmp(&a.rainfall)
            .then_with(|| a.district.cmp(&b.district))
            .then_with(|| a.coordinates.lon.total_cmp(&b.coordinates.lon))
            .then_with(|| a.coordinates.lat.total_cmp(&b.coordinates.lat))
    });

    debug!(count = rainfall.len(), hours, "Rainfall totals computed");
    Ok(rainfall)
}
