//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the column contract with the epicenter model.**
//!
//! The vector is `MAX_STATIONS` triplets of
//! `(dt_k, sta_lat_k, sta_lon_k)`, slot 1 first. Changing the slot count or
//! the triplet order requires bumping `FEATURE_VERSION` and retraining.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Maximum station observations per request (K)
pub const MAX_STATIONS: usize = 15;

/// Values per station slot
pub const SLOT_WIDTH: usize = 3;

/// Total number of features (3K)
pub const FEATURE_COUNT: usize = MAX_STATIONS * SLOT_WIDTH;

/// Per-slot column prefixes, in triplet order
const SLOT_FIELDS: [&str; SLOT_WIDTH] = ["dt", "sta_lat", "sta_lon"];

/// Column names in exact vector order: `dt_1, sta_lat_1, sta_lon_1, dt_2, ...`
pub fn feature_names() -> Vec<String> {
    (1..=MAX_STATIONS)
        .flat_map(|k| SLOT_FIELDS.iter().map(move |field| format!("{}_{}", field, k)))
        .collect()
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of the version and the ordered column names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in feature_names() {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

/// Layout summary for status endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub max_stations: usize,
    pub feature_count: usize,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            max_stations: MAX_STATIONS,
            feature_count: FEATURE_COUNT,
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Column names declared by a model artifact do not match the current layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMismatchError {
    pub expected_hash: u32,
    pub actual_hash: u32,
    /// First position where the names diverge
    pub first_difference: Option<usize>,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected hash {:08x}, got {:08x}",
            self.expected_hash, self.actual_hash
        )?;
        if let Some(pos) = self.first_difference {
            write!(f, " (first difference at column {})", pos)?;
        }
        Ok(())
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate column names declared by a model against the current layout
pub fn validate_names(names: &[String]) -> Result<(), LayoutMismatchError> {
    let expected = feature_names();
    if names == expected.as_slice() {
        return Ok(());
    }

    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    let first_difference = expected
        .iter()
        .zip(names.iter())
        .position(|(a, b)| a != b)
        .or(Some(expected.len().min(names.len())));

    Err(LayoutMismatchError {
        expected_hash: layout_hash(),
        actual_hash: hasher.finalize(),
        first_difference,
    })
}
