//! Features Module - station observations → model input
//!
//! `layout` owns the column contract, `vector` builds the values.

pub mod layout;
pub mod vector;

pub use layout::{feature_names, layout_hash, LayoutInfo, FEATURE_COUNT, MAX_STATIONS};
pub use vector::{encode, FeatureVector, StationObservation};
