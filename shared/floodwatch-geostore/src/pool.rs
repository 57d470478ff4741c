//! Connection Pool for the Geo Store

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use tracing::{debug, info};

use crate::{Result, StoreError};

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub url: String,
    pub max_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            url: floodwatch_core::config::DEFAULT_DATABASE_URL.to_string(),
            max_size: 16,
        }
    }
}

impl PoolConfig {
    pub fn new(url: impl Into<String>, max_size: usize) -> Self {
        Self {
            url: url.into(),
            max_size,
        }
    }
}

/// Pooled PostgreSQL connections.
///
/// Connections are checked out per query and return to the pool when the
/// guard drops, whether the query succeeded or not.
#[derive(Clone)]
pub struct GeoDbPool {
    pool: Pool,
}

impl GeoDbPool {
    /// Create a new connection pool. No connection is opened until first use.
    pub fn new(config: PoolConfig) -> Result<Self> {
        info!(max_size = config.max_size, "Creating geo store connection pool");

        let pg_config: tokio_postgres::Config = config
            .url
            .parse()
            .map_err(|e| StoreError::Configuration(format!("Invalid URL: {}", e)))?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = Manager::from_config(pg_config, NoTls, manager_config);

        let pool = Pool::builder(manager)
            .max_size(config.max_size)
            .build()
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        debug!("Geo store pool created successfully");

        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let status = self.pool.status();
        PoolStats {
            size: status.size,
            available: status.available as usize,
            waiting: status.waiting,
        }
    }
}

/// Pool statistics
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: usize,
    pub available: usize,
    pub waiting: usize,
}
