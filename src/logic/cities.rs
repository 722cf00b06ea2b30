//! Fixed city roster that warnings are issued for

use serde::Serialize;

use crate::logic::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityProfile {
    pub name: &'static str,
    #[serde(flatten)]
    pub location: GeoPoint,
}

impl CityProfile {
    pub const fn new(name: &'static str, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            location: GeoPoint::new(latitude, longitude),
        }
    }
}

/// Response order follows this array
pub const JAPAN_CITIES: [CityProfile; 7] = [
    CityProfile::new("Tokyo", 35.6762, 139.6503),
    CityProfile::new("Osaka", 34.6937, 135.5023),
    CityProfile::new("Sapporo", 43.0618, 141.3545),
    CityProfile::new("Sendai", 38.2682, 140.8694),
    CityProfile::new("Nagoya", 35.1815, 136.9066),
    CityProfile::new("Fukuoka", 33.5903, 130.4017),
    CityProfile::new("Kyoto", 35.0116, 135.7681),
];
