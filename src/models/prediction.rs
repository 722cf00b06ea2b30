//! Prediction request/response model

use serde::{Deserialize, Serialize};

use crate::logic::warning::CityWarnings;

/// Request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Epicenter from the trained model
    #[default]
    Real,
    /// Random epicenter in the Japan sample region, no model call
    JapanSample,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Real => "real",
            Mode::JapanSample => "japan_sample",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "real" => Some(Mode::Real),
            "japan_sample" => Some(Mode::JapanSample),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub station_codes: Option<Vec<String>>,
    #[serde(default)]
    pub arrival_times: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub mode: String,
    pub pred_lat: f64,
    pub pred_lon: f64,
    pub earliest_station: String,
    /// Rupture origin time
    pub t0: f64,
    pub warnings: CityWarnings,
    pub s_wave_ring_max_km: f64,
}
