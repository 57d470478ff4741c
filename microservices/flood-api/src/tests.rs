//! Endpoint scenarios for the Flood API

use async_trait::async_trait;
use axum::{
    body::to_bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use floodwatch_core::{
    Coordinates, District, FloodForecast, Geometry, MonitoringStation, RainfallObservation,
    Thresholds, WaterLevelReading,
};
use floodwatch_geostore::{
    seed::Fixture, AlertSnapshot, ForecastWindow, GeoStore, MemoryGeoStore, RainfallTotal, SharedGeoStore,
    StationSnapshot, StoreError,
};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::Value;
use std::sync::Arc;

use crate::api::rest::{self, AppState, RainfallParams};

/// Store whose every call fails, as if the database were down
struct FailingStore;

#[async_trait]
impl GeoStore for FailingStore {
    async fn active_stations_with_latest(&self) -> floodwatch_geostore::Result<Vec<StationSnapshot>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn rainfall_totals_since(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> floodwatch_geostore::Result<Vec<RainfallTotal>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn forecasts_in(
        &self,
        _window: ForecastWindow,
    ) -> floodwatch_geostore::Result<Vec<FloodForecast>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn alert_snapshot(
        &self,
        _window: ForecastWindow,
    ) -> floodwatch_geostore::Result<AlertSnapshot> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn districts(&self) -> floodwatch_geostore::Result<Vec<District>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> floodwatch_geostore::Result<()> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn state(store: impl GeoStore) -> AppState {
    let store: SharedGeoStore = Arc::new(store);
    AppState { store }
}

async fn body_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

fn no_params() -> Query<RainfallParams> {
    Query(RainfallParams::default())
}

fn hours(raw: &str) -> Query<RainfallParams> {
    Query(RainfallParams {
        hours: Some(raw.to_string()),
    })
}

fn ludhiana_station() -> MonitoringStation {
    MonitoringStation {
        id: 3,
        name: "Sutlej at Ludhiana".to_string(),
        river_name: "Sutlej".to_string(),
        district: "Ludhiana".to_string(),
        location: Coordinates::new(75.8573, 30.9010),
        thresholds: Thresholds::new(242.0, 246.0, 249.0),
        is_active: true,
    }
}

async fn ludhiana_flooding() -> MemoryGeoStore {
    let now = Utc::now();
    let store = MemoryGeoStore::new();
    store.insert_station(ludhiana_station()).await;
    store
        .insert_reading(WaterLevelReading {
            station_id: 3,
            level: 250.5,
            timestamp: now - Duration::minutes(20),
            status: "danger".to_string(),
        })
        .await;
    store
        .insert_forecast(FloodForecast {
            district: "Ludhiana".to_string(),
            risk_level: "high".to_string(),
            area: Geometry::square(Coordinates::new(75.8573, 30.9010), 0.1),
            forecast_time: now + Duration::hours(12),
            created_at: now - Duration::hours(1),
            confidence: Some(0.82),
            affected_population: Some(41_000),
        })
        .await;
    for (mm, minutes_ago) in [(12.0, 30), (10.2, 150), (15.0, 300), (8.0, 600)] {
        store
            .insert_rainfall(RainfallObservation {
                district: "Ludhiana".to_string(),
                location: Coordinates::new(75.8573, 30.9010),
                rainfall_mm: mm,
                duration_hours: 1,
                timestamp: now - Duration::minutes(minutes_ago),
            })
            .await;
    }
    store
}

#[tokio::test]
async fn test_ludhiana_breach_with_high_forecast_is_high_alert() {
    let store = ludhiana_flooding().await;
    let response = rest::get_alerts(State(state(store))).await.unwrap().into_response();

    let (status, json) = body_json(response).await;
    assert_eq!(status, StatusCode::OK);
    let alerts = json["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["district"], "Ludhiana");
    assert_eq!(alerts[0]["priority"], 3);
    assert_eq!(alerts[0]["type"], "high");
    assert_eq!(alerts[0]["risks"], "danger, high");
}

#[tokio::test]
async fn test_stations_endpoint_shape() {
    let store = ludhiana_flooding().await;
    store
        .insert_station(MonitoringStation {
            id: 9,
            name: "Ghaggar at Ottu".to_string(),
            river_name: "Ghaggar".to_string(),
            district: "Patiala".to_string(),
            location: Coordinates::new(76.4, 30.25),
            thresholds: Thresholds::new(210.0, 214.0, 217.0),
            is_active: true,
        })
        .await;

    let response = rest::get_stations(State(state(store))).await.unwrap().into_response();
    let (status, json) = body_json(response).await;
    assert_eq!(status, StatusCode::OK);

    let stations = json["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0]["name"], "Ghaggar at Ottu");
    assert_eq!(stations[0]["status"], "normal");
    assert_eq!(stations[0]["levels"]["current"], 210.0);
    assert!(stations[0]["lastUpdated"].is_null());

    assert_eq!(stations[1]["river"], "Sutlej");
    assert_eq!(stations[1]["status"], "danger");
    assert_eq!(stations[1]["coordinates"], serde_json::json!([75.8573, 30.9010]));
    assert!(stations[1]["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_rainfall_hours_window() {
    let store = state(ludhiana_flooding().await);

    let (_, day) = body_json(
        rest::get_rainfall(State(store.clone()), no_params())
            .await
            .unwrap()
            .into_response(),
    )
    .await;
    let day = day["rainfall"].as_array().unwrap().clone();
    assert_eq!(day.len(), 1);
    assert!((day[0]["rainfall"].as_f64().unwrap() - 45.2).abs() < 1e-9);
    assert_eq!(day[0]["intensity"], "medium");

    let (_, hour) = body_json(
        rest::get_rainfall(State(store.clone()), hours("1"))
            .await
            .unwrap()
            .into_response(),
    )
    .await;
    assert_eq!(hour["rainfall"][0]["rainfall"], 12.0);
    assert_eq!(hour["rainfall"][0]["intensity"], "low");

    let (status, garbage) = body_json(
        rest::get_rainfall(State(store), hours("soon"))
            .await
            .unwrap()
            .into_response(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(garbage["rainfall"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_forecast_endpoint_orders_by_risk() {
    let now = Utc::now();
    let fixture = Fixture::punjab(now, &mut StdRng::seed_from_u64(11));
    let store = state(MemoryGeoStore::from_fixture(fixture));

    let (status, json) = body_json(
        rest::get_forecast(State(store)).await.unwrap().into_response(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let risks: Vec<&str> = json["forecasts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["riskLevel"].as_str().unwrap())
        .collect();
    assert_eq!(risks, vec!["high", "high", "medium"]);
    assert_eq!(json["forecasts"][0]["district"], "Firozpur");
    assert_eq!(json["forecasts"][0]["area"]["type"], "Polygon");
}

#[tokio::test]
async fn test_demo_fixture_alerts_are_capped_and_sorted() {
    let fixture = Fixture::punjab(Utc::now(), &mut StdRng::seed_from_u64(3));
    let store = state(MemoryGeoStore::from_fixture(fixture));

    let (_, json) = body_json(rest::get_alerts(State(store)).await.unwrap().into_response()).await;
    let alerts = json["alerts"].as_array().unwrap();
    assert!(alerts.len() <= 5);

    let keys: Vec<(i64, String)> = alerts
        .iter()
        .map(|a| {
            (
                a["priority"].as_i64().unwrap(),
                a["district"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    assert_eq!(keys, sorted);

    // Firozpur and Kapurthala have fresh high forecasts.
    assert_eq!(keys[0].0, 3);
}

#[tokio::test]
async fn test_repeated_requests_are_byte_identical() {
    let fixture = Fixture::punjab(Utc::now(), &mut StdRng::seed_from_u64(5));
    let store = state(MemoryGeoStore::from_fixture(fixture));

    let first = tokio_test::assert_ok!(rest::get_districts(State(store.clone())).await);
    let first = body_bytes(first.into_response()).await;
    let second = body_bytes(
        rest::get_districts(State(store.clone())).await.unwrap().into_response(),
    )
    .await;
    assert_eq!(first, second);

    let first = body_bytes(rest::get_stations(State(store.clone())).await.unwrap().into_response()).await;
    let second = body_bytes(rest::get_stations(State(store)).await.unwrap().into_response()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_storage_failure_is_500_with_detail() {
    let store = state(FailingStore);

    let response = rest::get_stations(State(store.clone())).await.unwrap_err().into_response();
    let (status, json) = body_json(response).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json["detail"],
        "Error fetching stations: Storage unavailable: connection refused"
    );

    let response = rest::get_rainfall(State(store.clone()), no_params())
        .await
        .unwrap_err()
        .into_response();
    let (_, json) = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().starts_with("Error fetching rainfall data: "));

    let response = rest::get_districts(State(store)).await.unwrap_err().into_response();
    let (_, json) = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().starts_with("Error fetching districts: "));
}

#[tokio::test]
async fn test_ready_reports_unreachable_store() {
    let (status, json) = body_json(rest::ready(State(state(FailingStore))).await.into_response()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["ready"], false);

    let (status, json) =
        body_json(rest::ready(State(state(MemoryGeoStore::new()))).await.into_response()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
}

#[tokio::test]
async fn test_info_and_health() {
    let (_, info) = body_json(rest::info().await.into_response()).await;
    assert_eq!(info["message"], "Punjab Flood Monitoring System API");
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));

    let (_, health) = body_json(rest::health().await.into_response()).await;
    assert_eq!(health["status"], "healthy");
}

/// Serve the router on an ephemeral port and return its base URL
async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn status_of(base: &str, path: &str) -> StatusCode {
    let response = reqwest::get(format!("{}{}", base, path)).await.unwrap();
    StatusCode::from_u16(response.status().as_u16()).unwrap()
}

#[tokio::test]
async fn test_routes_mounted_under_prefix() {
    let store = ludhiana_flooding().await;
    let base = serve(rest::create_router(state(store), "/api")).await;

    for path in [
        "/api/stations",
        "/api/rainfall?hours=1",
        "/api/forecast",
        "/api/alerts",
        "/api/districts",
        "/api/health",
        "/api/info",
        "/health",
        "/ready",
        "/",
    ] {
        assert_eq!(status_of(&base, path).await, StatusCode::OK, "GET {}", path);
    }
    assert_eq!(status_of(&base, "/stations").await, StatusCode::NOT_FOUND);

    let alerts: Value = reqwest::get(format!("{}/api/alerts", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alerts["alerts"][0]["district"], "Ludhiana");

    let info: Value = reqwest::get(format!("{}/api/info", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(info["message"], "Punjab Flood Monitoring System API");
}

#[tokio::test]
async fn test_empty_prefix_mounts_at_root() {
    let base = serve(rest::create_router(state(ludhiana_flooding().await), "")).await;

    assert_eq!(status_of(&base, "/stations").await, StatusCode::OK);
    assert_eq!(status_of(&base, "/info").await, StatusCode::OK);
    assert_eq!(status_of(&base, "/health").await, StatusCode::OK);
    assert_eq!(status_of(&base, "/api/stations").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_storage_failure_through_router() {
    let base = serve(rest::create_router(state(FailingStore), "/api")).await;

    assert_eq!(
        status_of(&base, "/api/alerts").await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(status_of(&base, "/ready").await, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(status_of(&base, "/health").await, StatusCode::OK);
}
