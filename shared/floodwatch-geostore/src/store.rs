//! Storage handle passed to every query

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use floodwatch_core::{District, FloodForecast};
use std::sync::Arc;

use crate::types::{AlertSnapshot, ForecastWindow, RainfallTotal, StationSnapshot};
use crate::Result;

/// Read-only access to the flood monitoring store.
///
/// Implementations filter and aggregate; they do not classify or rank.
/// Ordering of the returned rows is unspecified.
#[async_trait]
pub trait GeoStore: Send + Sync + 'static {
    /// Every station with `is_active = true`, each joined with its single
    /// most recent reading by timestamp.
    async fn active_stations_with_latest(&self) -> Result<Vec<StationSnapshot>>;

    /// Rainfall observations with `timestamp >= cutoff`, summed per
    /// (district, exact point) with the newest timestamp of the group.
    async fn rainfall_totals_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<RainfallTotal>>;

    /// Forecasts whose target and issue times fall inside `window`
    async fn forecasts_in(&self, window: ForecastWindow) -> Result<Vec<FloodForecast>>;

    /// Active stations with their latest reading and the forecasts inside
    /// `window`, both read from one consistent view of the store
    async fn alert_snapshot(&self, window: ForecastWindow) -> Result<AlertSnapshot>;

    /// All districts
    async fn districts(&self) -> Result<Vec<District>>;

    /// Round-trip to storage, for readiness probes
    async fn ping(&self) -> Result<()>;
}

pub type SharedGeoStore = Arc<dyn GeoStore>;
