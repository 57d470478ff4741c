//! Floodwatch Telemetry
//!
//! Structured logging via `tracing`, with optional span export over OTLP.

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

/// Initialize telemetry for a service from the environment
pub fn init(service_name: &str) -> Result<TelemetryGuard, TelemetryError> {
    init_tracing(&TelemetryConfig::from_env(service_name))?;
    Ok(TelemetryGuard { _private: () })
}

/// Guard that flushes and shuts down span export on drop
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        opentelemetry::global::shutdown_tracer_provider();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),

    #[error("OTLP configuration error: {0}")]
    OtlpConfig(String),
}
