//! Station Directory - station code → coordinates
//!
//! Loaded once at startup, read-only afterwards. Shared across requests
//! behind an `Arc` without locking.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// A seismic station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "station_code")]
    pub code: String,
    #[serde(rename = "sta_lat")]
    pub latitude: f64,
    #[serde(rename = "sta_lon")]
    pub longitude: f64,
}

impl Station {
    pub fn new(code: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            code: code.into(),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    stations: HashMap<String, Station>,
}

impl StationDirectory {
    /// Build a directory from stations in memory. Later duplicates replace earlier ones.
    pub fn from_stations<I>(stations: I) -> Self
    where
        I: IntoIterator<Item = Station>,
    {
        let stations = stations
            .into_iter()
            .map(|s| (s.code.clone(), s))
            .collect();
        Self { stations }
    }

    /// Load the station table from a CSV file with a
    /// `station_code,sta_lat,sta_lon` header. Extra columns are ignored.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open station table {}", path.display()))?;

        let mut stations = HashMap::new();

        for (index, record) in reader.deserialize::<Station>().enumerate() {
            // Header is line 1
            let line = index + 2;
            let station = record
                .with_context(|| format!("Invalid station row at line {}", line))?;

            if !station.latitude.is_finite() || !station.longitude.is_finite() {
                bail!(
                    "Station {} at line {} has non-finite coordinates",
                    station.code,
                    line
                );
            }

            if let Some(previous) = stations.insert(station.code.clone(), station) {
                tracing::warn!(
                    code = %previous.code,
                    line,
                    "Duplicate station code, keeping the later row"
                );
            }
        }

        tracing::info!(
            path = %path.display(),
            count = stations.len(),
            "Station table loaded"
        );

        Ok(Self { stations })
    }

    pub fn get(&self, code: &str) -> Option<&Station> {
        self.stations.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.stations.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// All stations, sorted by code
    pub fn sorted(&self) -> Vec<&Station> {
        let mut all: Vec<&Station> = self.stations.values().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        all
    }
}
