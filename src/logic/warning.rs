//! Warning Engine - S-wave arrival, lead time and risk tier per city
//!
//! Records keep full precision. Rounding happens only when a record is
//! serialized, so nothing downstream ever computes on rounded values.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::logic::cities::CityProfile;
use crate::logic::geo::GeoPoint;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Assumed S-wave velocity (km/s)
pub const S_WAVE_VELOCITY_KM_S: f64 = 3.5;

/// Up to and including this distance a city is in danger
pub const DANGER_DISTANCE_KM: f64 = 300.0;

/// Up to and including this distance a city sees moderate shaking
pub const MODERATE_DISTANCE_KM: f64 = 700.0;

// ============================================================================
// RISK TIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Danger,
    Moderate,
    Safe,
}

impl RiskLevel {
    pub fn from_distance(distance_km: f64) -> Self {
        if distance_km <= DANGER_DISTANCE_KM {
            RiskLevel::Danger
        } else if distance_km <= MODERATE_DISTANCE_KM {
            RiskLevel::Moderate
        } else {
            RiskLevel::Safe
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 2))
}

fn round2_opt<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round_to(*v, 2)),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningRecord {
    #[serde(serialize_with = "round2")]
    pub distance_km: f64,
    /// Absent once the wave has notionally passed
    #[serde(rename = "s_arrival", serialize_with = "round2_opt")]
    pub s_wave_arrival_time: Option<f64>,
    #[serde(rename = "warning_seconds", serialize_with = "round2_opt")]
    pub lead_time_seconds: Option<f64>,
    pub risk_level: RiskLevel,
    #[serde(rename = "early_warning")]
    pub has_lead_time: bool,
}

/// Per-city records in roster order, serialized as a JSON object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityWarnings(Vec<(&'static str, WarningRecord)>);

impl CityWarnings {
    pub fn get(&self, city: &str) -> Option<&WarningRecord> {
        self.0.iter().find(|(name, _)| *name == city).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, WarningRecord)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest city distance, 0 for an empty roster
    pub fn max_distance_km(&self) -> f64 {
        self.0
            .iter()
            .map(|(_, r)| r.distance_km)
            .fold(0.0, f64::max)
    }
}

impl Serialize for CityWarnings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, record) in &self.0 {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub fn warning_for(epicenter: &GeoPoint, origin_time: f64, now: f64, city: &CityProfile) -> WarningRecord {
    let distance_km = epicenter.distance_km(&city.location);
    let s_arrival = origin_time + distance_km / S_WAVE_VELOCITY_KM_S;
    let lead = s_arrival - now;
    let has_lead_time = lead >= 0.0;

    WarningRecord {
        distance_km,
        s_wave_arrival_time: has_lead_time.then_some(s_arrival),
        lead_time_seconds: has_lead_time.then_some(lead),
        risk_level: RiskLevel::from_distance(distance_km),
        has_lead_time,
    }
}

/// Warning record for every city in the roster
pub fn compute_warnings(
    epicenter: &GeoPoint,
    origin_time: f64,
    now: f64,
    cities: &[CityProfile],
) -> CityWarnings {
    CityWarnings(
        cities
            .iter()
            .map(|city| (city.name, warning_for(epicenter, origin_time, now, city)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::cities::JAPAN_CITIES;
    use crate::logic::geo::EARTH_RADIUS_KM;

    /// Degrees of latitude spanning `km` along a meridian
    fn lat_offset(km: f64) -> f64 {
        (km / EARTH_RADIUS_KM).to_degrees()
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskLevel::from_distance(0.0), RiskLevel::Danger);
        assert_eq!(RiskLevel::from_distance(300.0), RiskLevel::Danger);
        assert_eq!(RiskLevel::from_distance(300.001), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_distance(700.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_distance(700.001), RiskLevel::Safe);
    }

    #[test]
    fn test_lead_time_positive() {
        let city = CityProfile::new("Here", 0.0, 0.0);
        let epicenter = GeoPoint::new(lat_offset(350.0), 0.0);

        let record = warning_for(&epicenter, -5.0, 20.0, &city);
        assert!((record.distance_km - 350.0).abs() < 1e-6);
        assert_eq!(record.risk_level, RiskLevel::Moderate);
        assert!(record.has_lead_time);
        assert!((record.s_wave_arrival_time.unwrap() - 95.0).abs() < 1e-6);
        assert!((record.lead_time_seconds.unwrap() - 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_lead_time_suppressed_when_negative() {
        let city = CityProfile::new("Near", 0.0, 0.0);
        let epicenter = GeoPoint::new(lat_offset(35.0), 0.0);

        // S-wave reaches the city at 10 s, reference is 30 s
        let record = warning_for(&epicenter, 0.0, 30.0, &city);
        assert_eq!(record.s_wave_arrival_time, None);
        assert_eq!(record.lead_time_seconds, None);
        assert!(!record.has_lead_time);
        assert_eq!(record.risk_level, RiskLevel::Danger);
    }

    #[test]
    fn test_zero_lead_time_counts_as_warning() {
        let city = CityProfile::new("Origin", 10.0, 10.0);
        let record = warning_for(&city.location, 0.0, 0.0, &city);
        assert_eq!(record.distance_km, 0.0);
        assert_eq!(record.lead_time_seconds, Some(0.0));
        assert!(record.has_lead_time);
    }

    #[test]
    fn test_roster_order_and_max() {
        let tokyo = JAPAN_CITIES[0].location;
        let warnings = compute_warnings(&tokyo, 0.0, 0.0, &JAPAN_CITIES);

        let names: Vec<&str> = warnings.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec!["Tokyo", "Osaka", "Sapporo", "Sendai", "Nagoya", "Fukuoka", "Kyoto"]
        );
        assert_eq!(warnings.get("Tokyo").unwrap().distance_km, 0.0);
        assert_eq!(warnings.get("Tokyo").unwrap().risk_level, RiskLevel::Danger);
        // Fukuoka is the farthest city from Tokyo
        assert_eq!(warnings.max_distance_km(), warnings.get("Fukuoka").unwrap().distance_km);
        assert_eq!(warnings.get("Fukuoka").unwrap().risk_level, RiskLevel::Safe);
    }

    #[test]
    fn test_serialized_rounding() {
        let record = WarningRecord {
            distance_km: 123.456789,
            s_wave_arrival_time: Some(35.27333),
            lead_time_seconds: None,
            risk_level: RiskLevel::Danger,
            has_lead_time: false,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["distance_km"], 123.46);
        assert_eq!(value["s_arrival"], 35.27);
        assert!(value["warning_seconds"].is_null());
        assert_eq!(value["risk_level"], "Danger");
        assert_eq!(value["early_warning"], false);

        // Raw value untouched
        assert_eq!(record.distance_km, 123.456789);
    }

    #[test]
    fn test_warnings_serialize_as_ordered_object() {
        let epicenter = GeoPoint::new(38.0, 142.0);
        let warnings = compute_warnings(&epicenter, 0.0, 0.0, &JAPAN_CITIES);
        let json = serde_json::to_string(&warnings).unwrap();

        let tokyo = json.find("\"Tokyo\"").unwrap();
        let kyoto = json.find("\"Kyoto\"").unwrap();
        assert!(tokyo < kyoto);
        assert_eq!(warnings.len(), 7);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(-2.345_6, 2), -2.35);
        assert_eq!(round_to(139.123_456, 4), 139.1235);
    }
}
