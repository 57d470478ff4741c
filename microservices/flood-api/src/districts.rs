//! District lookup

use floodwatch_core::{District, Geometry};
use floodwatch_geostore::{GeoStore, StoreError};
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictView {
    pub name: String,
    pub boundary: Geometry,
    pub population: Option<i32>,
    pub area: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DistrictsResponse {
    pub districts: Vec<DistrictView>,
}

impl From<District> for DistrictView {
    fn from(d: District) -> Self {
        DistrictView {
            name: d.name,
            boundary: d.boundary,
            population: d.population,
            area: d.area_sq_km,
        }
    }
}

/// Every district ordered by name
#[instrument(skip(store))]
pub async fn all_districts(store: &dyn GeoStore) -> Result<Vec<DistrictView>, StoreError> {
    let mut districts: Vec<DistrictView> = store
        .districts()
        .await?
        .into_iter()
        .map(DistrictView::from)
        .collect();
    districts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(districts)
}
