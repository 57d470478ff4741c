//! Station status query
//!
//! Current level and status of every active gauge station. A station that
//! never reported sits at its normal level with status `normal`.

use chrono::{DateTime, Utc};
use floodwatch_core::{classify_latest, Coordinates, StationId, StationStatus};
use floodwatch_geostore::{GeoStore, StationSnapshot, StoreError};
use serde::Serialize;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Levels {
    pub normal: f64,
    pub warning: f64,
    pub danger: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationView {
    pub id: StationId,
    pub name: String,
    pub river: String,
    pub district: String,
    pub coordinates: Coordinates,
    pub levels: Levels,
    pub status: StationStatus,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationView>,
}

impl From<StationSnapshot> for StationView {
    fn from(snapshot: StationSnapshot) -> Self {
        let StationSnapshot { station, latest } = snapshot;
        let thresholds = station.thresholds;

        if !thresholds.is_ascending() {
            warn!(
                station_id = station.id,
                normal = thresholds.normal,
                warning = thresholds.warning,
                danger = thresholds.danger,
                "Station thresholds are not ascending"
            );
        }

        let level = latest.as_ref().map(|r| r.level);
        StationView {
            id: station.id,
            name: station.name,
            river: station.river_name,
            district: station.district,
            coordinates: station.location,
            levels: Levels {
                normal: thresholds.normal,
                warning: thresholds.warning,
                danger: thresholds.danger,
                current: level.unwrap_or(thresholds.normal),
            },
            // Recomputed from the level; the label stored with the reading may be stale.
            status: classify_latest(level, &thresholds),
            last_updated: latest.map(|r| r.timestamp),
        }
    }
}

/// All active stations ordered by name
#[instrument(skip(store))]
pub async fn station_statuses(store: &dyn GeoStore) -> Result<Vec<StationView>, StoreError> {
    let snapshots = store.active_stations_with_latest().await?;

    let mut stations: Vec<StationView> = snapshots.into_iter().map(StationView::from).collect();
    stations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    debug!(count = stations.len(), "Station statuses computed");
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use floodwatch_core::{MonitoringStation, Thresholds, WaterLevelReading};
    use floodwatch_geostore::MemoryGeoStore;

    fn station(id: StationId, name: &str, active: bool) -> MonitoringStation {
        MonitoringStation {
            id,
            name: name.to_string(),
            river_name: "Sutlej".to_string(),
            district: "Firozpur".to_string(),
            location: Coordinates::new(74.9619, 31.1656),
            thresholds: Thresholds::new(248.0, 252.0, 255.0),
            is_active: active,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, hour, 0, 0).unwrap()
    }

    fn reading(station_id: StationId, level: f64, hour: u32, status: &str) -> WaterLevelReading {
        WaterLevelReading {
            station_id,
            level,
            timestamp: at(hour),
            status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn test_station_without_readings_falls_back_to_normal() {
        let store = MemoryGeoStore::new();
        store.insert_station(station(1, "Sutlej at Harike", true)).await;

        let stations = station_statuses(&store).await.unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].levels.current, 248.0);
        assert_eq!(stations[0].status, StationStatus::Normal);
        assert_eq!(stations[0].last_updated, None);
    }

    #[tokio::test]
    async fn test_latest_level_above_danger() {
        let store = MemoryGeoStore::new();
        store.insert_station(station(1, "Sutlej at Harike", true)).await;
        store.insert_reading(reading(1, 249.0, 8, "normal")).await;
        store.insert_reading(reading(1, 256.0, 9, "normal")).await;

        let stations = station_statuses(&store).await.unwrap();
        assert_eq!(stations[0].levels.current, 256.0);
        assert_eq!(stations[0].status, StationStatus::Danger);
        assert_eq!(stations[0].last_updated, Some(at(9)));
    }

    #[tokio::test]
    async fn test_stored_label_is_ignored() {
        let store = MemoryGeoStore::new();
        store.insert_station(station(1, "Sutlej at Harike", true)).await;
        store.insert_reading(reading(1, 253.0, 9, "danger")).await;

        let stations = station_statuses(&store).await.unwrap();
        assert_eq!(stations[0].status, StationStatus::Warning);
    }

    #[tokio::test]
    async fn test_inactive_excluded_and_sorted_by_name() {
        let store = MemoryGeoStore::new();
        store.insert_station(station(1, "Sutlej at Ludhiana", true)).await;
        store.insert_station(station(2, "Beas at Mirthal", true)).await;
        store.insert_station(station(3, "Ravi at Basantar", false)).await;

        let names: Vec<String> = station_statuses(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Beas at Mirthal", "Sutlej at Ludhiana"]);
    }

    #[test]
    fn test_wire_shape() {
        let view = StationView::from(StationSnapshot {
            station: station(7, "Sutlej at Harike", true),
            latest: None,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["coordinates"], serde_json::json!([74.9619, 31.1656]));
        assert_eq!(json["levels"]["current"], 248.0);
        assert_eq!(json["status"], "normal");
        assert!(json["lastUpdated"].is_null());
        assert_eq!(json["river"], "Sutlej");
    }
}
