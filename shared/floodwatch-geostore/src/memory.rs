//! In-memory implementation of [`GeoStore`]
//!
//! Applies the same filtering and aggregation as the PostGIS queries. Backs
//! the demo mode of the API and the query tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use floodwatch_core::{
    Coordinates, District, FloodForecast, MonitoringStation, RainfallObservation, WaterLevelReading,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::seed::Fixture;
use crate::store::GeoStore;
use crate::types::{AlertSnapshot, ForecastWindow, LatestReading, RainfallTotal, StationSnapshot};
use crate::Result;

#[derive(Default)]
pub struct MemoryGeoStore {
    tables: RwLock<Fixture>,
}

impl MemoryGeoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        Self {
            tables: RwLock::new(fixture),
        }
    }

    pub async fn insert_station(&self, station: MonitoringStation) {
        self.tables.write().await.stations.push(station);
    }

    pub async fn insert_reading(&self, reading: WaterLevelReading) {
        self.tables.write().await.readings.push(reading);
    }

    pub async fn insert_rainfall(&self, observation: RainfallObservation) {
        self.tables.write().await.rainfall.push(observation);
    }

    pub async fn insert_forecast(&self, forecast: FloodForecast) {
        self.tables.write().await.forecasts.push(forecast);
    }

    pub async fn insert_district(&self, district: District) {
        self.tables.write().await.districts.push(district);
    }
}

#[async_trait]
impl GeoStore for MemoryGeoStore {
    async fn active_stations_with_latest(&self) -> Result<Vec<StationSnapshot>> {
        Ok(stations_with_latest(&*self.tables.read().await))
    }

    async fn rainfall_totals_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<RainfallTotal>> {
        let tables = self.tables.read().await;
        // Grouped on the exact point, like GROUP BY ST_X, ST_Y.
        let mut groups: BTreeMap<(String, u64, u64), (Coordinates, f64, DateTime<Utc>)> =
            BTreeMap::new();

        for obs in tables.rainfall.iter().filter(|o| o.timestamp >= cutoff) {
            let key = (
                obs.district.clone(),
                obs.location.lon.to_bits(),
                obs.location.lat.to_bits(),
            );
            groups
                .entry(key)
                .and_modify(|(_, total, latest)| {
                    *total += obs.rainfall_mm;
                    if obs.timestamp > *latest {
                        *latest = obs.timestamp;
                    }
                })
                .or_insert((obs.location, obs.rainfall_mm, obs.timestamp));
        }

        Ok(groups
            .into_iter()
            .map(|((district, _, _), (location, total_mm, last_updated))| RainfallTotal {
                district,
                location,
                total_mm,
                last_updated,
            })
            .collect())
    }

    async fn forecasts_in(&self, window: ForecastWindow) -> Result<Vec<FloodForecast>> {
        Ok(forecasts_within(&*self.tables.read().await, window))
    }

    async fn alert_snapshot(&self, window: ForecastWindow) -> Result<AlertSnapshot> {
        // One read guard for both, so no insert lands in between.
        let tables = self.tables.read().await;
        Ok(AlertSnapshot {
            stations: stations_with_latest(&tables),
            forecasts: forecasts_within(&tables, window),
        })
    }

    async fn districts(&self) -> Result<Vec<District>> {
        Ok(self.tables.read().await.districts.clone())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

fn stations_with_latest(tables: &Fixture) -> Vec<StationSnapshot> {
    tables
        .stations
        .iter()
        .filter(|s| s.is_active)
        .map(|station| {
            let latest = tables
                .readings
                .iter()
                .filter(|r| r.station_id == station.id)
                .max_by_key(|r| r.timestamp)
                .map(|r| LatestReading {
                    level: r.level,
                    timestamp: r.timestamp,
                    status: r.status.clone(),
                });
            StationSnapshot {
                station: station.clone(),
                latest,
            }
        })
        .collect()
}

fn forecasts_within(tables: &Fixture, window: ForecastWindow) -> Vec<FloodForecast> {
    tables
        .forecasts
        .iter()
        .filter(|f| window.contains(f.forecast_time, f.created_at))
        .cloned()
        .collect()
}
