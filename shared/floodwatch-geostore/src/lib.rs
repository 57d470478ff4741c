//! Floodwatch Geo Store
//!
//! Read access to the PostGIS-backed flood monitoring store: stations and
//! their latest readings, rainfall totals, forecasts and district
//! boundaries. Queries only filter and aggregate; classification happens in
//! `floodwatch_core::risk`.

mod error;
mod memory;
mod pool;
mod postgres;
pub mod schema;
pub mod seed;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryGeoStore;
pub use pool::{GeoDbPool, PoolConfig, PoolStats};
pub use postgres::PgGeoStore;
pub use store::{GeoStore, SharedGeoStore};
pub use types::*;
