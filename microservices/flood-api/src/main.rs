//! Flood API
//!
//! Read-only HTTP/JSON API over the Punjab flood monitoring store:
//! - Gauge station status against each station's thresholds
//! - Rainfall totals and intensity over a trailing window
//! - Current flood forecasts, highest risk first
//! - Top-5 district alerts merged from station breaches and fresh forecasts
//! - District boundaries

use chrono::Utc;
use floodwatch_core::{
    DependencyStatus, FloodwatchService, HealthStatus, ReadinessStatus, Result, ServiceRuntime,
};
use floodwatch_geostore::{
    schema, seed::Fixture, GeoDbPool, MemoryGeoStore, PgGeoStore, PoolConfig, SharedGeoStore,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

mod alerts;
mod api;
mod config;
mod districts;
mod error;
mod forecast;
mod rainfall;
mod stations;

#[cfg(test)]
mod tests;

use config::{Config, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let _telemetry = floodwatch_telemetry::init("flood-api")?;

    info!("Starting Flood API");

    let config = Config::from_env()?;
    let service = Arc::new(FloodApiService::new(config).await?);
    ServiceRuntime::run(service).await?;
    Ok(())
}

pub struct FloodApiService {
    config: Config,
    store: SharedGeoStore,
    pool: Option<GeoDbPool>,
    start_time: Instant,
}

impl FloodApiService {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (store, pool): (SharedGeoStore, Option<GeoDbPool>) = match config.store_backend {
            StoreBackend::Postgres => {
                let pool = GeoDbPool::new(PoolConfig::new(
                    config.service.database_url.clone(),
                    config.service.db_pool_size,
                ))?;
                if config.bootstrap_schema {
                    schema::bootstrap(&pool).await?;
                }
                (Arc::new(PgGeoStore::new(pool.clone())), Some(pool))
            }
            StoreBackend::Memory => {
                info!("Serving generated demo data from memory");
                let fixture = Fixture::punjab(Utc::now(), &mut rand::thread_rng());
                (Arc::new(MemoryGeoStore::from_fixture(fixture)), None)
            }
        };

        Ok(Self {
            config,
            store,
            pool,
            start_time: Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl FloodwatchService for FloodApiService {
    fn service_id(&self) -> &'static str {
        "flood-api"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        let started = Instant::now();
        let available = self.store.ping().await.is_ok();
        ReadinessStatus {
            ready: available,
            dependencies: vec![DependencyStatus {
                name: "geostore".to_string(),
                available,
                latency_ms: Some(started.elapsed().as_millis() as u64),
            }],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some(pool) = &self.pool {
            let stats = pool.stats();
            info!(
                size = stats.size,
                available = stats.available,
                waiting = stats.waiting,
                "Geo store pool at shutdown"
            );
        }
        info!("Shutting down Flood API");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        let readiness = self.ready().await;
        if !readiness.ready {
            tracing::warn!("Geo store not reachable yet; serving anyway");
        }

        let router = api::rest::create_router(
            api::rest::AppState {
                store: self.store.clone(),
            },
            &self.config.api_prefix,
        );

        let bind = self.config.bind_address();
        info!(
            bind = %bind,
            prefix = %self.config.api_prefix,
            backend = ?self.config.store_backend,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(&bind).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
