//! Idempotent PostGIS schema bootstrap

use tracing::info;

use crate::pool::GeoDbPool;
use crate::{Result, StoreError};

pub const SCHEMA_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS postgis;

CREATE TABLE IF NOT EXISTS monitoring_stations (
    id            SERIAL PRIMARY KEY,
    name          VARCHAR(100) NOT NULL,
    river_name    VARCHAR(50) NOT NULL,
    location      geometry(Point, 4326) NOT NULL,
    district      VARCHAR(50) NOT NULL,
    normal_level  DOUBLE PRECISION NOT NULL,
    warning_level DOUBLE PRECISION NOT NULL,
    danger_level  DOUBLE PRECISION NOT NULL,
    is_active     BOOLEAN DEFAULT TRUE,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- station_id is deliberately not a foreign key
CREATE TABLE IF NOT EXISTS water_levels (
    id         SERIAL PRIMARY KEY,
    station_id INTEGER NOT NULL,
    level      DOUBLE PRECISION NOT NULL,
    timestamp  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    status     VARCHAR(20) NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_water_levels_station_time
    ON water_levels (station_id, timestamp DESC);

CREATE TABLE IF NOT EXISTS rainfall_data (
    id             SERIAL PRIMARY KEY,
    district       VARCHAR(50) NOT NULL,
    location       geometry(Point, 4326) NOT NULL,
    rainfall_mm    DOUBLE PRECISION NOT NULL,
    duration_hours INTEGER NOT NULL,
    timestamp      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_rainfall_data_time ON rainfall_data (timestamp);

CREATE TABLE IF NOT EXISTS flood_forecasts (
    id                  SERIAL PRIMARY KEY,
    forecast_area       geometry(Polygon, 4326) NOT NULL,
    district            VARCHAR(50) NOT NULL,
    risk_level          VARCHAR(20) NOT NULL,
    forecast_time       TIMESTAMPTZ NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    confidence          DOUBLE PRECISION DEFAULT 0.0,
    affected_population INTEGER DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_flood_forecasts_window
    ON flood_forecasts (forecast_time, created_at);

CREATE TABLE IF NOT EXISTS districts (
    id          SERIAL PRIMARY KEY,
    name        VARCHAR(50) NOT NULL UNIQUE,
    boundary    geometry(Polygon, 4326) NOT NULL,
    population  INTEGER DEFAULT 0,
    area_sq_km  DOUBLE PRECISION DEFAULT 0.0,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Create the extension, tables and indexes if they do not exist yet
pub async fn bootstrap(pool: &GeoDbPool) -> Result<()> {
    let client = pool.get().await?;
    client
        .batch_execute(SCHEMA_SQL)
        .await
        .map_err(StoreError::Query)?;
    info!("Geo store schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent_ddl() {
        for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let ddl: String = statement
                .lines()
                .filter(|l| !l.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join(" ");
            assert!(
                ddl.contains("IF NOT EXISTS"),
                "statement is not idempotent: {}",
                ddl
            );
        }
    }
}
