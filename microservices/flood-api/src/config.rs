//! Configuration for the Flood API

use floodwatch_core::ServiceConfig;

/// Where query data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostGIS database at `DATABASE_URL`
    Postgres,
    /// Generated Punjab demo data held in memory, no database needed
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "demo" => Ok(Self::Memory),
            other => anyhow::bail!("Invalid STORE_BACKEND: {}", other),
        }
    }
}

/// Flood API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address, database URL, pool size, log level
    pub service: ServiceConfig,
    /// Common path prefix of the data endpoints
    pub api_prefix: String,
    pub store_backend: StoreBackend,
    /// Create the PostGIS schema at startup
    pub bootstrap_schema: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            service: ServiceConfig::from_env()?,
            api_prefix: normalize_prefix(
                &std::env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            ),
            store_backend: std::env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "postgres".to_string())
                .parse()?,
            bootstrap_schema: std::env::var("BOOTSTRAP_SCHEMA")
                .unwrap_or_else(|_| "false".to_string())
                .parse()?,
        })
    }

    /// Get the `host:port` string for binding
    pub fn bind_address(&self) -> String {
        self.service.bind_address()
    }
}

/// `api/` -> `/api`; `/` and empty -> no prefix
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
