//! Prediction Service - request validation and orchestration
//!
//! ```text
//! request ─▶ validate ─▶ EpicenterSource ─▶ WarningEngine ─▶ response
//!                          │ model: encode → infer → origin time
//!                          │ sample: random epicenter, t0 = now = 0
//! ```

use std::sync::Arc;

use crate::error::EewError;
use crate::logic::cities::{CityProfile, JAPAN_CITIES};
use crate::logic::features::MAX_STATIONS;
use crate::logic::model::{EngineStatus, InferenceEngine};
use crate::logic::source::{EpicenterSource, ModelSource, PredictionInput, SampleRegion};
use crate::logic::stations::StationDirectory;
use crate::logic::warning::{compute_warnings, round_to};
use crate::models::{Mode, PredictRequest, PredictionResponse};

/// Stateless per request; everything it holds is read-only after startup
pub struct PredictionService {
    stations: Arc<StationDirectory>,
    engine: Arc<InferenceEngine>,
    cities: Vec<CityProfile>,
    sample_region: SampleRegion,
}

impl PredictionService {
    pub fn new(stations: Arc<StationDirectory>, engine: Arc<InferenceEngine>) -> Self {
        Self {
            stations,
            engine,
            cities: JAPAN_CITIES.to_vec(),
            sample_region: SampleRegion::JAPAN_PACIFIC,
        }
    }

    pub fn with_cities(mut self, cities: Vec<CityProfile>) -> Self {
        self.cities = cities;
        self
    }

    pub fn stations(&self) -> &StationDirectory {
        &self.stations
    }

    pub fn cities(&self) -> &[CityProfile] {
        &self.cities
    }

    pub fn engine_status(&self) -> EngineStatus {
        self.engine.status()
    }

    #[tracing::instrument(skip_all, fields(mode = tracing::field::Empty))]
    pub fn predict(&self, request: PredictRequest) -> Result<PredictionResponse, EewError> {
        let (mode, input) = validate(request)?;
        tracing::Span::current().record("mode", mode.as_str());

        let source = match mode {
            Mode::JapanSample => EpicenterSource::Sample(self.sample_region),
            Mode::Real => EpicenterSource::Model(ModelSource {
                engine: &self.engine,
                stations: &self.stations,
            }),
        };

        let estimate = source.estimate(&input)?;
        let warnings = compute_warnings(
            &estimate.epicenter,
            estimate.origin_time,
            estimate.now,
            &self.cities,
        );

        tracing::info!(
            lat = estimate.epicenter.latitude,
            lon = estimate.epicenter.longitude,
            earliest_station = %estimate.earliest_station,
            origin_time = estimate.origin_time,
            "Epicenter estimated"
        );

        Ok(PredictionResponse {
            mode: mode.as_str().to_string(),
            pred_lat: round_to(estimate.epicenter.latitude, 4),
            pred_lon: round_to(estimate.epicenter.longitude, 4),
            earliest_station: estimate.earliest_station,
            t0: round_to(estimate.origin_time, 2),
            s_wave_ring_max_km: round_to(warnings.max_distance_km(), 2),
            warnings,
        })
    }
}

/// Check the raw request before any model work happens
pub fn validate(request: PredictRequest) -> Result<(Mode, PredictionInput), EewError> {
    let mode = match request.mode.as_deref() {
        None => Mode::Real,
        Some(value) => Mode::parse(value).ok_or_else(|| {
            EewError::MalformedRequest(format!(
                "unknown mode '{}', expected 'real' or 'japan_sample'",
                value
            ))
        })?,
    };

    let codes = request
        .station_codes
        .ok_or_else(|| EewError::MalformedRequest("station_codes is required".to_string()))?;
    if codes.is_empty() {
        return Err(EewError::MalformedRequest(
            "station_codes must contain at least one code".to_string(),
        ));
    }

    let times = match (mode, request.arrival_times) {
        (Mode::Real, None) => {
            return Err(EewError::MalformedRequest(
                "arrival_times is required".to_string(),
            ))
        }
        (_, times) => times,
    };

    if let Some(times) = &times {
        if times.len() != codes.len() {
            return Err(EewError::MalformedRequest(format!(
                "station_codes has {} entries but arrival_times has {}",
                codes.len(),
                times.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(EewError::MalformedRequest(
                "arrival_times must be finite numbers".to_string(),
            ));
        }
    }

    if mode == Mode::Real && codes.len() > MAX_STATIONS {
        return Err(EewError::MalformedRequest(format!(
            "{} stations supplied, at most {} are supported",
            codes.len(),
            MAX_STATIONS
        )));
    }

    Ok((mode, PredictionInput::new(codes, times)))
}
