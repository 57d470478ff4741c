//! Flood API REST routes and handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use floodwatch_geostore::SharedGeoStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alerts::{current_alerts, AlertsResponse};
use crate::districts::{all_districts, DistrictsResponse};
use crate::error::{Error, Result};
use crate::forecast::{current_forecasts, ForecastResponse};
use crate::rainfall::{rainfall_totals, window_hours, RainfallResponse};
use crate::stations::{station_statuses, StationsResponse};

pub const API_TITLE: &str = "Punjab Flood Monitoring System API";

#[derive(Clone)]
pub struct AppState {
    pub store: SharedGeoStore,
}

/// Build the router. Data endpoints live under `api_prefix`; an empty
/// prefix mounts them at the root.
pub fn create_router(state: AppState, api_prefix: &str) -> Router {
    let data = Router::new()
        .route("/stations", get(get_stations))
        .route("/rainfall", get(get_rainfall))
        .route("/forecast", get(get_forecast))
        .route("/alerts", get(get_alerts))
        .route("/districts", get(get_districts))
        .route("/info", get(info));

    let root = Router::new()
        .route("/", get(info))
        .route("/health", get(health))
        .route("/ready", get(ready));

    let router = if api_prefix.is_empty() {
        root.merge(data)
    } else {
        root.nest(api_prefix, data.route("/health", get(health)))
    };

    router.with_state(state)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub database: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RainfallParams {
    /// Kept as text so a malformed value falls back instead of a 400
    pub hours: Option<String>,
}

pub async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        message: API_TITLE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyResponse {
                ready: true,
                database: "connected".to_string(),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Geo store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    ready: false,
                    database: e.to_string(),
                }),
            )
        }
    }
}

pub async fn get_stations(State(state): State<AppState>) -> Result<Json<StationsResponse>> {
    let stations = station_statuses(state.store.as_ref())
        .await
        .map_err(Error::fetching("stations"))?;
    Ok(Json(StationsResponse { stations }))
}

pub async fn get_rainfall(
    State(state): State<AppState>,
    Query(params): Query<RainfallParams>,
) -> Result<Json<RainfallResponse>> {
    let hours = window_hours(params.hours.as_deref());
    let rainfall = rainfall_totals(state.store.as_ref(), Utc::now(), hours)
        .await
        .map_err(Error::fetching("rainfall data"))?;
    Ok(Json(RainfallResponse { rainfall }))
}

pub async fn get_forecast(State(state): State<AppState>) -> Result<Json<ForecastResponse>> {
    let forecasts = current_forecasts(state.store.as_ref(), Utc::now())
        .await
        .map_err(Error::fetching("forecasts"))?;
    Ok(Json(ForecastResponse { forecasts }))
}

pub async fn get_alerts(State(state): State<AppState>) -> Result<Json<AlertsResponse>> {
    let alerts = current_alerts(state.store.as_ref(), Utc::now())
        .await
        .map_err(Error::fetching("alerts"))?;
    Ok(Json(AlertsResponse { alerts }))
}

pub async fn get_districts(State(state): State<AppState>) -> Result<Json<DistrictsResponse>> {
    let districts = all_districts(state.store.as_ref())
        .await
        .map_err(Error::fetching("districts"))?;
    Ok(Json(DistrictsResponse { districts }))
}
