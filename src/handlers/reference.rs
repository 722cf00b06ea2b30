//! Read-only reference data: stations and the city roster

use axum::{extract::State, Json};

use crate::logic::cities::CityProfile;
use crate::logic::stations::Station;
use crate::AppState;

/// List all stations, sorted by code
pub async fn stations(State(state): State<AppState>) -> Json<Vec<Station>> {
    Json(state.service.stations().sorted().into_iter().cloned().collect())
}

/// List the cities warnings are computed for
pub async fn cities(State(state): State<AppState>) -> Json<Vec<CityProfile>> {
    Json(state.service.cities().to_vec())
}
