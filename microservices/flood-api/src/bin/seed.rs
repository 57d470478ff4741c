//! Load the Punjab demo data set into the PostGIS store
//!
//! Creates the schema if needed, then inserts districts, stations, 48 hours
//! of readings, a day of rainfall and three forecasts relative to now.

use chrono::Utc;
use floodwatch_core::ServiceConfig;
use floodwatch_geostore::{schema, seed::Fixture, GeoDbPool, PoolConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let _telemetry = floodwatch_telemetry::init("floodwatch-seed")?;

    let config = ServiceConfig::from_env()?;
    let pool = GeoDbPool::new(PoolConfig::new(config.database_url, 1))?;

    schema::bootstrap(&pool).await?;

    let fixture = Fixture::punjab(Utc::now(), &mut rand::thread_rng());
    fixture.write_to(&pool).await?;

    info!(
        districts = fixture.districts.len(),
        stations = fixture.stations.len(),
        readings = fixture.readings.len(),
        rainfall = fixture.rainfall.len(),
        forecasts = fixture.forecasts.len(),
        "Seed data written"
    );
    Ok(())
}
