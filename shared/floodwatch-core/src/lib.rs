//! Floodwatch Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Standard service trait the flood monitoring services implement
//! - The flood monitoring domain model (stations, readings, rainfall,
//!   forecasts, districts) and GeoJSON polygon geometry
//! - Pure risk classification (station status, rainfall intensity,
//!   forecast risk priority, alert tier)
//! - Error handling utilities
//! - Configuration management

pub mod config;
pub mod domain;
pub mod error;
pub mod risk;
pub mod service;

pub use config::ServiceConfig;
pub use domain::*;
pub use error::{FloodError, Result};
pub use risk::{
    classify_latest, classify_level, forecast_priority, AlertType, RainfallIntensity, RiskLevel,
    StationStatus, STATION_BREACH_PRIORITY,
};
pub use service::{DependencyStatus, FloodwatchService, HealthStatus, ReadinessStatus, ServiceRuntime};
