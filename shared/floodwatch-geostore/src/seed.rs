//! Punjab demo data set
//!
//! Produces stations, readings, rainfall, forecasts and district boundaries
//! for development and demos. The random source is injected so a seeded RNG
//! gives a reproducible data set.

use chrono::{DateTime, Duration, Utc};
use floodwatch_core::{
    classify_level, Coordinates, District, FloodForecast, Geometry, MonitoringStation,
    RainfallObservation, StationId, Thresholds, WaterLevelReading,
};
use rand::Rng;
use std::collections::HashMap;
use tracing::info;

use crate::pool::GeoDbPool;
use crate::{Result, StoreError};

/// (name, lat, lon, population, area km²)
const DISTRICTS: &[(&str, f64, f64, i32, f64)] = &[
    ("Amritsar", 31.6340, 74.8723, 2_490_000, 5075.0),
    ("Ludhiana", 30.9010, 75.8573, 3_498_000, 3767.0),
    ("Jalandhar", 31.3260, 75.5762, 2_193_000, 2682.0),
    ("Patiala", 30.3398, 76.3869, 1_895_000, 3212.0),
    ("Bathinda", 30.2118, 74.9455, 1_388_000, 3385.0),
    ("Mohali", 30.7046, 76.7179, 994_000, 1001.0),
    ("Firozpur", 30.9328, 74.6122, 1_170_000, 5305.0),
    ("Hoshiarpur", 31.5344, 75.9119, 1_586_000, 3386.0),
    ("Kapurthala", 31.3800, 75.3800, 815_000, 1633.0),
    ("Faridkot", 30.6735, 74.7555, 617_000, 1469.0),
    ("Muktsar", 30.4762, 74.5161, 901_000, 2297.0),
    ("Fatehgarh Sahib", 30.6466, 76.3969, 600_000, 1180.0),
    ("Pathankot", 32.2746, 75.6411, 649_000, 929.0),
    ("Rupnagar", 30.9631, 76.5270, 684_000, 1569.0),
    ("Sangrur", 30.2459, 75.8421, 1_655_000, 3635.0),
    ("Tarn Taran", 31.4532, 74.9205, 1_119_000, 2414.0),
    ("Gurdaspur", 32.0409, 75.4024, 2_298_000, 3564.0),
    ("Fazilka", 30.4028, 74.0281, 1_048_000, 2463.0),
    ("Barnala", 30.3804, 75.5504, 595_000, 1423.0),
    ("Mansa", 29.9988, 75.3933, 769_000, 2174.0),
    ("Nawanshahr", 31.1242, 76.1172, 612_000, 1268.0),
    ("Moga", 30.8028, 75.1667, 995_000, 2235.0),
];

/// (name, river, lat, lon, district, normal, warning, danger)
const STATIONS: &[(&str, &str, f64, f64, &str, f64, f64, f64)] = &[
    ("Sutlej at Harike", "Sutlej", 31.1656, 74.9619, "Firozpur", 248.0, 252.0, 255.0),
    ("Sutlej at Ganguwal", "Sutlej", 31.0500, 75.2000, "Ludhiana", 245.0, 249.0, 252.0),
    ("Sutlej at Ludhiana", "Sutlej", 30.9010, 75.8573, "Ludhiana", 242.0, 246.0, 249.0),
    ("Beas at Talagang", "Beas", 31.9167, 76.0167, "Hoshiarpur", 280.0, 284.0, 287.0),
    ("Beas at Sujanpur", "Beas", 31.8333, 76.5000, "Hoshiarpur", 275.0, 279.0, 282.0),
    ("Beas at Mirthal", "Beas", 31.4167, 75.3333, "Kapurthala", 230.0, 234.0, 237.0),
    ("Ravi at Madhopur", "Ravi", 32.0500, 75.5667, "Pathankot", 290.0, 294.0, 297.0),
    ("Ravi at Basantar", "Ravi", 32.2000, 75.4000, "Pathankot", 295.0, 299.0, 302.0),
    ("Ghaggar at Ottu", "Ghaggar", 30.2500, 76.4000, "Patiala", 210.0, 214.0, 217.0),
    ("Ghaggar at Sirsa", "Ghaggar", 29.5333, 75.0167, "Bathinda", 205.0, 209.0, 212.0),
    ("Choe at Kharar", "Choe", 30.7418, 76.6469, "Mohali", 300.0, 304.0, 307.0),
    ("Swan at Bajakhana", "Swan", 30.8000, 75.3000, "Hoshiarpur", 250.0, 254.0, 257.0),
];

/// Districts that receive rainfall observations
const RAINFALL_DISTRICTS: &[&str] = &[
    "Amritsar", "Ludhiana", "Jalandhar", "Patiala", "Bathinda",
    "Mohali", "Firozpur", "Hoshiarpur", "Kapurthala", "Faridkot",
];

/// (district, risk level)
const FORECAST_AREAS: &[(&str, &str)] = &[
    ("Firozpur", "high"),
    ("Ludhiana", "medium"),
    ("Kapurthala", "high"),
];

const READING_HOURS: i64 = 48;
const RAINFALL_HOURS: i64 = 24;
const RAINFALL_STEP_HOURS: i64 = 6;

/// A complete set of store rows
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub stations: Vec<MonitoringStation>,
    pub readings: Vec<WaterLevelReading>,
    pub rainfall: Vec<RainfallObservation>,
    pub forecasts: Vec<FloodForecast>,
    pub districts: Vec<District>,
}

fn district_center(name: &str) -> Option<Coordinates> {
    DISTRICTS
        .iter()
        .find(|(n, ..)| *n == name)
        .map(|&(_, lat, lon, ..)| Coordinates::new(lon, lat))
}

impl Fixture {
    /// Build the Punjab demo data relative to `now`
    pub fn punjab<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let mut fixture = Fixture::default();

        for &(name, lat, lon, population, area) in DISTRICTS {
            fixture.districts.push(District {
                name: name.to_string(),
                boundary: Geometry::square(Coordinates::new(lon, lat), 0.2),
                population: Some(population),
                area_sq_km: Some(area),
            });
        }

        for (idx, &(name, river, lat, lon, district, normal, warning, danger)) in
            STATIONS.iter().enumerate()
        {
            let station = MonitoringStation {
                id: idx as StationId + 1,
                name: name.to_string(),
                river_name: river.to_string(),
                district: district.to_string(),
                location: Coordinates::new(lon, lat),
                thresholds: Thresholds::new(normal, warning, danger),
                is_active: true,
            };

            let base_time = now - Duration::hours(READING_HOURS);
            for hour in 0..READING_HOURS {
                let level = normal + rng.gen_range(-2.0..4.0);
                fixture.readings.push(WaterLevelReading {
                    station_id: station.id,
                    level,
                    timestamp: base_time + Duration::hours(hour),
                    status: classify_level(level, &station.thresholds).to_string(),
                });
            }

            fixture.stations.push(station);
        }

        for &district in RAINFALL_DISTRICTS {
            let Some(center) = district_center(district) else {
                continue;
            };
            let base_time = now - Duration::hours(RAINFALL_HOURS);
            for hour in (0..RAINFALL_HOURS).step_by(RAINFALL_STEP_HOURS as usize) {
                fixture.rainfall.push(RainfallObservation {
                    district: district.to_string(),
                    location: center,
                    rainfall_mm: rng.gen_range(0.0..15.0),
                    duration_hours: RAINFALL_STEP_HOURS as i32,
                    timestamp: base_time + Duration::hours(hour),
                });
            }
        }

        for &(district, risk) in FORECAST_AREAS {
            let Some(center) = district_center(district) else {
                continue;
            };
            fixture.forecasts.push(FloodForecast {
                district: district.to_string(),
                risk_level: risk.to_string(),
                area: Geometry::square(center, 0.1),
                forecast_time: now + Duration::hours(24),
                created_at: now,
                confidence: Some(rng.gen_range(0.7..0.95)),
                affected_population: Some(rng.gen_range(1000..50000)),
            });
        }

        fixture
    }

    /// Insert every row in one transaction.
    ///
    /// Station ids are assigned by the database; readings are re-pointed at
    /// the inserted ids.
    pub async fn write_to(&self, pool: &GeoDbPool) -> Result<()> {
        let mut client = pool.get().await?;
        let tx = client.transaction().await.map_err(StoreError::Query)?;

        for d in &self.districts {
            tx.execute(
                "INSERT INTO districts (name, boundary, population, area_sq_km)
                 VALUES ($1, ST_GeomFromText($2, 4326), $3, $4)
                 ON CONFLICT (name) DO NOTHING",
                &[&d.name, &d.boundary.to_wkt(), &d.population, &d.area_sq_km],
            )
            .await
            .map_err(StoreError::Query)?;
        }

        let mut station_ids: HashMap<StationId, StationId> = HashMap::new();
        for s in &self.stations {
            let row = tx
                .query_one(
                    "INSERT INTO monitoring_stations
                        (name, river_name, location, district,
                         normal_level, warning_level, danger_level, is_active)
                     VALUES ($1, $2, ST_SetSRID(ST_MakePoint($3, $4), 4326), $5, $6, $7, $8, $9)
                     RETURNING id",
                    &[
                        &s.name,
                        &s.river_name,
                        &s.location.lon,
                        &s.location.lat,
                        &s.district,
                        &s.thresholds.normal,
                        &s.thresholds.warning,
                        &s.thresholds.danger,
                        &s.is_active,
                    ],
                )
                .await
                .map_err(StoreError::Query)?;
            let id: StationId = row.try_get("id").map_err(StoreError::Query)?;
            station_ids.insert(s.id, id);
        }

        for r in &self.readings {
            let Some(station_id) = station_ids.get(&r.station_id) else {
                continue;
            };
            tx.execute(
                "INSERT INTO water_levels (station_id, level, timestamp, status)
                 VALUES ($1, $2, $3, $4)",
                &[station_id, &r.level, &r.timestamp, &r.status],
            )
            .await
            .map_err(StoreError::Query)?;
        }

        for o in &self.rainfall {
            tx.execute(
                "INSERT INTO rainfall_data (district, location, rainfall_mm, duration_hours, timestamp)
                 VALUES ($1, ST_SetSRID(ST_MakePoint($2, $3), 4326), $4, $5, $6)",
                &[
                    &o.district,
                    &o.location.lon,
                    &o.location.lat,
                    &o.rainfall_mm,
                    &o.duration_hours,
                    &o.timestamp,
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        }

        for f in &self.forecasts {
            tx.execute(
                "INSERT INTO flood_forecasts
                    (forecast_area, district, risk_level, forecast_time,
                     created_at, confidence, affected_population)
                 VALUES (ST_GeomFromText($1, 4326), $2, $3, $4, $5, $6, $7)",
                &[
                    &f.area.to_wkt(),
                    &f.district,
                    &f.risk_level,
                    &f.forecast_time,
                    &f.created_at,
                    &f.confidence,
                    &f.affected_population,
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        }

        tx.commit().await.map_err(StoreError::Query)?;

        info!(
            districts = self.districts.len(),
            stations = self.stations.len(),
            readings = self.readings.len(),
            rainfall = self.rainfall.len(),
            forecasts = self.forecasts.len(),
            "Seeded geo store"
        );
        Ok(())
    }
}
