//! Forecast query
//!
//! Current forecasts: issued within the last 24 hours for an event due in
//! the next 24 hours.

use chrono::{DateTime, Duration, Utc};
use floodwatch_core::{FloodForecast, Geometry, RiskLevel};
use floodwatch_geostore::{ForecastWindow, GeoStore, StoreError};
use serde::Serialize;
use tracing::{debug, instrument};

/// How far ahead a forecast target may lie
pub const FORECAST_HORIZON_HOURS: i64 = 24;

/// How old a forecast may be to count as current
pub const FORECAST_RECENCY_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastView {
    pub district: String,
    pub risk_level: String,
    pub area: Geometry,
    pub forecast_time: DateTime<Utc>,
    pub confidence: Option<f64>,
    pub affected_population: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub forecasts: Vec<ForecastView>,
}

impl From<FloodForecast> for ForecastView {
    fn from(f: FloodForecast) -> Self {
        ForecastView {
            district: f.district,
            risk_level: f.risk_level,
            area: f.area,
            forecast_time: f.forecast_time,
            confidence: f.confidence,
            affected_population: f.affected_population,
            created_at: f.created_at,
        }
    }
}

/// Target within the horizon, issued no earlier than `recency_hours` ago
pub fn forecast_window(now: DateTime<Utc>, recency_hours: i64) -> ForecastWindow {
    ForecastWindow {
        target_from: now,
        target_until: now + Duration::hours(FORECAST_HORIZON_HOURS),
        issued_since: now - Duration::hours(recency_hours),
    }
}

/// Highest risk first (critical, high, medium, low, then unknown labels),
/// newest first within a risk level
pub fn sort_by_risk(forecasts: &mut [ForecastView]) {
    forecasts.sort_by(|a, b| {
        RiskLevel::rank(&b.risk_level)
            .cmp(&RiskLevel::rank(&a.risk_level))
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.district.cmp(&b.district))
    });
}

#[instrument(skip(store))]
pub async fn current_forecasts(
    store: &dyn GeoStore,
    now: DateTime<Utc>,
) -> Result<Vec<ForecastView>, StoreError> {
    let rows = store
        .forecasts_in(forecast_window(now, FORECAST_RECENCY_HOURS))
        .await?;

    let mut forecasts: Vec<ForecastView> = rows.into_iter().map(ForecastView::from).collect();
    sort_by_risk(&mut forecasts);

    debug!(count = forecasts.len(), "Current forecasts selected");
    Ok(forecasts)
}
