//! Epicenter sources
//!
//! Both variants produce the same [`EpicenterEstimate`]: a location, the
//! rupture origin time and the "now" reference that lead times are measured
//! from. The request mode picks the variant.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EewError;
use crate::logic::features::{encode, StationObservation};
use crate::logic::geo::GeoPoint;
use crate::logic::model::InferenceEngine;
use crate::logic::stations::StationDirectory;

/// Assumed P-wave velocity (km/s)
pub const P_WAVE_VELOCITY_KM_S: f64 = 6.0;

/// Validated request payload handed to a source
#[derive(Debug, Clone, Default)]
pub struct PredictionInput {
    pub station_codes: Vec<String>,
    /// Empty when no arrival times were supplied
    pub observations: Vec<StationObservation>,
}

impl PredictionInput {
    /// Pair codes with arrival times. Lengths must already match.
    pub fn new(station_codes: Vec<String>, arrival_times: Option<Vec<f64>>) -> Self {
        let observations = arrival_times
            .map(|times| {
                station_codes
                    .iter()
                    .zip(times)
                    .map(|(code, t)| StationObservation::new(code.clone(), t))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Self {
            station_codes,
            observations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpicenterEstimate {
    pub epicenter: GeoPoint,
    /// Rupture time, same clock as the arrival times
    pub origin_time: f64,
    /// Reference instant for lead-time computation
    pub now: f64,
    pub earliest_station: String,
}

// ============================================================================
// MODEL VARIANT
// ============================================================================

/// Regression model fed with encoded station arrivals
pub struct ModelSource<'a> {
    pub engine: &'a InferenceEngine,
    pub stations: &'a StationDirectory,
}

impl ModelSource<'_> {
    pub fn estimate(&self, observations: &[StationObservation]) -> Result<EpicenterEstimate, EewError> {
        // Encoding validates every code and the count before the model runs
        let features = encode(observations, self.stations)?;
        let epicenter = self.engine.predict(&features)?;

        let earliest = earliest_observation(observations).ok_or_else(|| {
            EewError::MalformedRequest("at least one station observation is required".to_string())
        })?;
        // Slot 0 holds the earliest arrival, same tie rule as above
        let (_, lat, lon) = features.slot(0).ok_or_else(|| {
            EewError::MalformedRequest("at least one station observation is required".to_string())
        })?;
        tracing::debug!(
            stations = features.used_slots(),
            earliest = %earliest.station_code,
            "Encoded station arrivals"
        );

        let travel_km = epicenter.distance_km(&GeoPoint::new(lat, lon));
        let origin_time = earliest.arrival_time - travel_km / P_WAVE_VELOCITY_KM_S;

        Ok(EpicenterEstimate {
            epicenter,
            origin_time,
            now: earliest.arrival_time,
            earliest_station: earliest.station_code.clone(),
        })
    }
}

/// Minimal arrival time; ties resolve to the first occurrence
pub fn earliest_observation(observations: &[StationObservation]) -> Option<&StationObservation> {
    observations.iter().fold(None, |best, obs| match best {
        Some(b) if b.arrival_time <= obs.arrival_time => Some(b),
        _ => Some(obs),
    })
}

// ============================================================================
// SAMPLE VARIANT
// ============================================================================

/// Rectangular region that demo epicenters are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRegion {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl SampleRegion {
    /// Japan's Pacific-side seismic belt
    pub const JAPAN_PACIFIC: SampleRegion = SampleRegion {
        lat_min: 32.0,
        lat_max: 41.5,
        lon_min: 135.0,
        lon_max: 145.5,
    };

    /// Uniform point inside the region
    pub fn sample<R: Rng>(&self, rng: &mut R) -> GeoPoint {
        GeoPoint::new(
            rng.gen_range(self.lat_min..=self.lat_max),
            rng.gen_range(self.lon_min..=self.lon_max),
        )
    }

    /// Demo estimate: random epicenter, rupture at t = 0, measured from t = 0.
    /// The first supplied code is reported as the earliest station.
    pub fn estimate(&self, station_codes: &[String]) -> Result<EpicenterEstimate, EewError> {
        let earliest_station = station_codes.first().cloned().ok_or_else(|| {
            EewError::MalformedRequest("station_codes must contain at least one code".to_string())
        })?;

        // Thread-local generator, independent per call
        let epicenter = self.sample(&mut rand::thread_rng());

        Ok(EpicenterEstimate {
            epicenter,
            origin_time: 0.0,
            now: 0.0,
            earliest_station,
        })
    }
}

impl Default for SampleRegion {
    fn default() -> Self {
        Self::JAPAN_PACIFIC
    }
}

// ============================================================================
// SOURCE SELECTION
// ============================================================================

pub enum EpicenterSource<'a> {
    Model(ModelSource<'a>),
    Sample(SampleRegion),
}

impl EpicenterSource<'_> {
    pub fn estimate(&self, input: &PredictionInput) -> Result<EpicenterEstimate, EewError> {
        match self {
            EpicenterSource::Model(source) => source.estimate(&input.observations),
            EpicenterSource::Sample(region) => region.estimate(&input.station_codes),
        }
    }
}
