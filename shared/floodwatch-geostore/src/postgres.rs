//! PostgreSQL/PostGIS implementation of [`GeoStore`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use floodwatch_core::{Coordinates, District, FloodForecast, Geometry, MonitoringStation, Thresholds};
use tokio_postgres::{IsolationLevel, Row};
use tracing::{debug, instrument};

use crate::pool::GeoDbPool;
use crate::store::GeoStore;
use crate::types::{AlertSnapshot, ForecastWindow, LatestReading, RainfallTotal, StationSnapshot};
use crate::{Result, StoreError};

const ACTIVE_STATIONS_SQL: &str = r#"
    SELECT
        ms.id, ms.name, ms.river_name, ms.district,
        ST_X(ms.location) AS longitude, ST_Y(ms.location) AS latitude,
        ms.normal_level, ms.warning_level, ms.danger_level, ms.is_active,
        wl.level, wl.status, wl.timestamp AS reading_time
    FROM monitoring_stations ms
    LEFT JOIN LATERAL (
        SELECT level, status, timestamp
        FROM water_levels
        WHERE station_id = ms.id
        ORDER BY timestamp DESC
        LIMIT 1
    ) wl ON true
    WHERE ms.is_active = true
    ORDER BY ms.name
"#;

const RAINFALL_TOTALS_SQL: &str = r#"
    SELECT
        district,
        ST_X(location) AS longitude,
        ST_Y(location) AS latitude,
        SUM(rainfall_mm) AS total_rainfall,
        MAX(timestamp) AS latest_timestamp
    FROM rainfall_data
    WHERE timestamp >= $1
    GROUP BY district, ST_X(location), ST_Y(location)
"#;

const FORECASTS_SQL: &str = r#"
    SELECT
        district,
        risk_level,
        ST_AsGeoJSON(forecast_area) AS area_geojson,
        forecast_time,
        created_at,
        confidence,
        affected_population
    FROM flood_forecasts
    WHERE forecast_time >= $1
      AND forecast_time <= $2
      AND created_at >= $3
"#;

const DISTRICTS_SQL: &str = r#"
    SELECT
        name,
        ST_AsGeoJSON(boundary) AS boundary_geojson,
        population,
        area_sq_km
    FROM districts
    ORDER BY name
"#;

/// Geo store backed by a PostGIS database
#[derive(Clone)]
pub struct PgGeoStore {
    pool: GeoDbPool,
}

impl PgGeoStore {
    pub fn new(pool: GeoDbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &GeoDbPool {
        &self.pool
    }

    async fn fetch(&self, sql: &str, params: &[&(dyn tokio_postgres::types::ToSql + Sync)]) -> Result<Vec<Row>> {
        // The connection goes back to the pool when `client` drops.
        let client = self.pool.get().await?;
        client.query(sql, params).await.map_err(StoreError::Query)
    }
}

#[async_trait]
impl GeoStore for PgGeoStore {
    #[instrument(skip(self))]
    async fn active_stations_with_latest(&self) -> Result<Vec<StationSnapshot>> {
        let rows = self.fetch(ACTIVE_STATIONS_SQL, &[]).await?;
        debug!(rows = rows.len(), "Fetched active stations");
        rows.iter().map(station_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn rainfall_totals_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<RainfallTotal>> {
        let rows = self.fetch(RAINFALL_TOTALS_SQL, &[&cutoff]).await?;
        debug!(rows = rows.len(), "Fetched rainfall totals");
        rows.iter()
            .map(|row| {
                Ok(RainfallTotal {
                    district: col(row, "district")?,
                    location: Coordinates::new(col(row, "longitude")?, col(row, "latitude")?),
                    total_mm: col(row, "total_rainfall")?,
                    last_updated: col(row, "latest_timestamp")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn forecasts_in(&self, window: ForecastWindow) -> Result<Vec<FloodForecast>> {
        let rows = self
            .fetch(
                FORECASTS_SQL,
                &[&window.target_from, &window.target_until, &window.issued_since],
            )
            .await?;
        debug!(rows = rows.len(), "Fetched forecasts");
        rows.iter().map(forecast_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn alert_snapshot(&self, window: ForecastWindow) -> Result<AlertSnapshot> {
        let mut client = self.pool.get().await?;
        // Both reads see the same snapshot; a concurrent seed cannot split them.
        let tx = client
            .build_transaction()
            .isolation_level(IsolationLevel::RepeatableRead)
            .read_only(true)
            .start()
            .await
            .map_err(StoreError::Query)?;

        let station_rows = tx
            .query(ACTIVE_STATIONS_SQL, &[])
            .await
            .map_err(StoreError::Query)?;
        let forecast_rows = tx
            .query(
                FORECASTS_SQL,
                &[&window.target_from, &window.target_until, &window.issued_since],
            )
            .await
            .map_err(StoreError::Query)?;
        tx.commit().await.map_err(StoreError::Query)?;

        debug!(
            stations = station_rows.len(),
            forecasts = forecast_rows.len(),
            "Fetched alert snapshot"
        );
        Ok(AlertSnapshot {
            stations: station_rows
                .iter()
                .map(station_from_row)
                .collect::<Result<_>>()?,
            forecasts: forecast_rows
                .iter()
                .map(forecast_from_row)
                .collect::<Result<_>>()?,
        })
    }

    #[instrument(skip(self))]
    async fn districts(&self) -> Result<Vec<District>> {
        let rows = self.fetch(DISTRICTS_SQL, &[]).await?;
        debug!(rows = rows.len(), "Fetched districts");
        rows.iter()
            .map(|row| {
                Ok(District {
                    name: col(row, "name")?,
                    boundary: geometry(row, "boundary_geojson")?,
                    population: col(row, "population")?,
                    area_sq_km: col(row, "area_sq_km")?,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        client
            .simple_query("SELECT 1")
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn col<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name).map_err(StoreError::Query)
}

fn geometry(row: &Row, name: &str) -> Result<Geometry> {
    let raw: String = col(row, name)?;
    Ok(serde_json::from_str(&raw)?)
}

fn forecast_from_row(row: &Row) -> Result<FloodForecast> {
    Ok(FloodForecast {
        district: col(row, "district")?,
        risk_level: col(row, "risk_level")?,
        area: geometry(row, "area_geojson")?,
        forecast_time: col(row, "forecast_time")?,
        created_at: col(row, "created_at")?,
        confidence: col(row, "confidence")?,
        affected_population: col(row, "affected_population")?,
    })
}

fn station_from_row(row: &Row) -> Result<StationSnapshot> {
    let level: Option<f64> = col(row, "level")?;
    let reading_time: Option<DateTime<Utc>> = col(row, "reading_time")?;
    let status: Option<String> = col(row, "status")?;

    let latest = match (level, reading_time) {
        (Some(level), Some(timestamp)) => Some(LatestReading {
            level,
            timestamp,
            status: status.unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(StationSnapshot {
        station: MonitoringStation {
            id: col(row, "id")?,
            name: col(row, "name")?,
            river_name: col(row, "river_name")?,
            district: col(row, "district")?,
            location: Coordinates::new(col(row, "longitude")?, col(row, "latitude")?),
            thresholds: Thresholds::new(
                col(row, "normal_level")?,
                col(row, "warning_level")?,
                col(row, "danger_level")?,
            ),
            is_active: col::<Option<bool>>(row, "is_active")?.unwrap_or(true),
        },
        latest,
    })
}
