//! Feature Vector - fixed-width model input built from station observations
//!
//! Observations are sorted by arrival time (stable), normalized to the
//! earliest arrival, and laid out slot by slot. Unused slots stay zero.

use std::cmp::Ordering;

use ndarray::{aview1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::layout::{FEATURE_COUNT, MAX_STATIONS, SLOT_WIDTH};
use crate::error::EewError;
use crate::logic::stations::StationDirectory;

/// One P-wave first arrival reported by a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationObservation {
    pub station_code: String,
    /// Seconds, on whatever clock the caller uses
    pub arrival_time: f64,
}

impl StationObservation {
    pub fn new(station_code: impl Into<String>, arrival_time: f64) -> Self {
        Self {
            station_code: station_code.into(),
            arrival_time,
        }
    }
}

/// Model input: `MAX_STATIONS` triplets of (relative arrival, lat, lon)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
    /// Number of slots carrying real observations
    used_slots: usize,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn used_slots(&self) -> usize {
        self.used_slots
    }

    /// `(dt, lat, lon)` for a zero-based slot
    pub fn slot(&self, index: usize) -> Option<(f64, f64, f64)> {
        if index >= MAX_STATIONS {
            return None;
        }
        let base = index * SLOT_WIDTH;
        Some((self.values[base], self.values[base + 1], self.values[base + 2]))
    }

    /// Borrowed single-row view, as the model consumes it
    pub fn view(&self) -> ArrayView2<'_, f64> {
        aview1(&self.values[..]).insert_axis(Axis(0))
    }
}

/// Encode a batch of observations against the station directory.
///
/// Fails with `UnknownStation` listing every unknown code (input order,
/// deduplicated) and with `MalformedRequest` for an empty batch or more
/// than `MAX_STATIONS` observations. Nothing is evaluated until all codes
/// have been checked.
pub fn encode(
    observations: &[StationObservation],
    stations: &StationDirectory,
) -> Result<FeatureVector, EewError> {
    if observations.is_empty() {
        return Err(EewError::MalformedRequest(
            "at least one station observation is required".to_string(),
        ));
    }
    if observations.len() > MAX_STATIONS {
        return Err(EewError::MalformedRequest(format!(
            "{} observations supplied, at most {} are supported",
            observations.len(),
            MAX_STATIONS
        )));
    }

    if let Some(bad) = observations.iter().find(|o| !o.arrival_time.is_finite()) {
        return Err(EewError::MalformedRequest(format!(
            "arrival time for station {} is not a finite number",
            bad.station_code
        )));
    }

    let mut unknown: Vec<String> = Vec::new();
    for obs in observations {
        if !stations.contains(&obs.station_code) && !unknown.contains(&obs.station_code) {
            unknown.push(obs.station_code.clone());
        }
    }
    if !unknown.is_empty() {
        return Err(EewError::UnknownStation(unknown));
    }

    // Stable: ties (including -0.0 vs 0.0) keep input order. Times are finite here.
    let mut sorted: Vec<&StationObservation> = observations.iter().collect();
    sorted.sort_by(|a, b| {
        a.arrival_time
            .partial_cmp(&b.arrival_time)
            .unwrap_or(Ordering::Equal)
    });

    let t0 = sorted[0].arrival_time;
    let mut values = [0.0f64; FEATURE_COUNT];

    for (slot, obs) in sorted.iter().enumerate() {
        let Some(station) = stations.get(&obs.station_code) else {
            continue;
        };
        let base = slot * SLOT_WIDTH;
        values[base] = obs.arrival_time - t0;
        values[base + 1] = station.latitude;
        values[base + 2] = station.longitude;
    }

    Ok(FeatureVector {
        values,
        used_slots: sorted.len(),
    })
}
