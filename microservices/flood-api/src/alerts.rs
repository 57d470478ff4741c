//! Alert ranking
//!
//! Merges two risk signals per district and keeps the most urgent ones:
//!
//! - station breach: every active station whose latest level is at or above
//!   its warning threshold scores [`STATION_BREACH_PRIORITY`], whatever the
//!   severity
//! - forecast risk: every forecast issued in the last two hours for an event
//!   due within 24 hours scores by its risk level (critical=4 .. low=1)
//!
//! A district's priority is the highest score across both signals. Districts
//! are ranked by priority, then name, and cut to [`MAX_ALERTS`].

use chrono::{DateTime, Utc};
use floodwatch_core::{
    classify_latest, forecast_priority, AlertType, FloodForecast, STATION_BREACH_PRIORITY,
};
use floodwatch_geostore::{GeoStore, StationSnapshot, StoreError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

use crate::forecast::forecast_window;

/// Longest alert list served
pub const MAX_ALERTS: usize = 5;

/// Forecasts older than this do not raise alerts
pub const ALERT_RECENCY_HOURS: i64 = 2;

/// One district-level risk contribution from either signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskSignal {
    pub district: String,
    pub label: String,
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub district: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub risks: String,
    pub priority: i32,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertView>,
}

/// Breach signals of stations above their warning level.
///
/// Status comes from the latest level against the station's own thresholds;
/// the label stored with the reading is not consulted.
pub fn station_signals(snapshots: &[StationSnapshot]) -> Vec<RiskSignal> {
    snapshots
        .iter()
        .filter_map(|snapshot| {
            let level = snapshot.latest.as_ref().map(|r| r.level);
            let status = classify_latest(level, &snapshot.station.thresholds);
            status.is_breach().then(|| RiskSignal {
                district: snapshot.station.district.clone(),
                label: status.as_str().to_string(),
                priority: STATION_BREACH_PRIORITY,
            })
        })
        .collect()
}

pub fn forecast_signals(forecasts: &[FloodForecast]) -> Vec<RiskSignal> {
    forecasts
        .iter()
        .map(|f| RiskSignal {
            district: f.district.clone(),
            label: f.risk_level.clone(),
            priority: forecast_priority(&f.risk_level),
        })
        .collect()
}

/// Group signals by district and keep the `limit` most urgent districts
pub fn rank_alerts(signals: impl IntoIterator<Item = RiskSignal>, limit: usize) -> Vec<AlertView> {
    let mut by_district: BTreeMap<String, (i32, BTreeSet<String>)> = BTreeMap::new();
    for signal in signals {
        let entry = by_district
            .entry(signal.district)
            .or_insert_with(|| (signal.priority, BTreeSet::new()));
        entry.0 = entry.0.max(signal.priority);
        entry.1.insert(signal.label);
    }

    let mut alerts: Vec<AlertView> = by_district
        .into_iter()
        .map(|(district, (priority, labels))| AlertView {
            district,
            alert_type: AlertType::from_priority(priority),
            risks: labels.into_iter().collect::<Vec<_>>().join(", "),
            priority,
        })
        .collect();

    // BTreeMap iteration is already by name, and the sort is stable.
    alerts.sort_by(|a, b| b.priority.cmp(&a.priority));
    alerts.truncate(limit);
    alerts
}

#[instrument(skip(store))]
pub async fn current_alerts(
    store: &dyn GeoStore,
    now: DateTime<Utc>,
) -> Result<Vec<AlertView>, StoreError> {
    let snapshot = store
        .alert_snapshot(forecast_window(now, ALERT_RECENCY_HOURS))
        .await?;

    let breaches = station_signals(&snapshot.stations);
    let forecast_risks = forecast_signals(&snapshot.forecasts);
    debug!(
        station_breaches = breaches.len(),
        forecast_risks = forecast_risks.len(),
        "Ranking alert signals"
    );

    Ok(rank_alerts(breaches.into_iter().chain(forecast_risks), MAX_ALERTS))
}
