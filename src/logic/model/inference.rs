//! Inference Engine - epicenter regression
//!
//! The regression model is opaque: it maps an `n × FEATURE_COUNT` feature
//! matrix to `n × 2` rows of (lat, lon). The engine wraps whichever model
//! is loaded, validates its output and tracks call latency.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView2};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::EewError;
use crate::logic::features::layout::{self, LayoutInfo, FEATURE_COUNT};
use crate::logic::features::FeatureVector;
use crate::logic::geo::GeoPoint;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub struct InferenceError(pub String);

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InferenceError: {}", self.0)
    }
}

impl std::error::Error for InferenceError {}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// Epicenter regression model.
///
/// Implementations are shared across request tasks. A model that cannot be
/// called concurrently should be wrapped in [`Serialized`].
pub trait EpicenterModel: Send + Sync {
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError>;

    fn name(&self) -> &str;
}

/// Guards a model that is not safe for concurrent calls behind a mutex
pub struct Serialized<M> {
    inner: Mutex<M>,
    name: String,
}

impl<M> Serialized<M> {
    pub fn new(model: M, name: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(model),
            name: name.into(),
        }
    }
}

/// Models with per-call mutable state (scratch buffers, foreign handles)
pub trait StatefulModel: Send {
    fn predict_mut(&mut self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError>;
}

impl<M: StatefulModel> EpicenterModel for Serialized<M> {
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        self.inner.lock().predict_mut(features)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// LINEAR MODEL ARTIFACT
// ============================================================================

/// On-disk form of a linear epicenter model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelFile {
    /// Column names the model was trained on, if recorded
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// One row of `FEATURE_COUNT` weights per output (lat, lon)
    pub coefficients: Vec<Vec<f64>>,
    /// Bias per output (lat, lon)
    pub intercept: Vec<f64>,
}

/// `y = X · Wᵀ + b`
#[derive(Debug, Clone)]
pub struct LinearModel {
    coefficients: Array2<f64>,
    intercept: Array1<f64>,
    name: String,
}

impl LinearModel {
    pub fn from_file_contents(file: LinearModelFile, name: impl Into<String>) -> Result<Self, InferenceError> {
        if let Some(names) = &file.feature_names {
            layout::validate_names(names).map_err(|e| InferenceError(e.to_string()))?;
        }

        if file.coefficients.len() != 2 || file.intercept.len() != 2 {
            return Err(InferenceError(format!(
                "Expected 2 outputs, got {} coefficient rows and {} intercepts",
                file.coefficients.len(),
                file.intercept.len()
            )));
        }

        if let Some(row) = file.coefficients.iter().find(|r| r.len() != FEATURE_COUNT) {
            return Err(InferenceError(format!(
                "Coefficient row has {} weights, expected {}",
                row.len(),
                FEATURE_COUNT
            )));
        }

        let flat: Vec<f64> = file.coefficients.into_iter().flatten().collect();
        if flat.iter().chain(file.intercept.iter()).any(|v| !v.is_finite()) {
            return Err(InferenceError("Model parameters contain non-finite values".to_string()));
        }

        let coefficients = Array2::from_shape_vec((2, FEATURE_COUNT), flat)
            .map_err(|e| InferenceError(format!("Bad coefficient shape: {}", e)))?;

        Ok(Self {
            coefficients,
            intercept: Array1::from(file.intercept),
            name: name.into(),
        })
    }

    /// Load a JSON model artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        tracing::info!("Loading epicenter model from: {}", path.display());

        if !path.exists() {
            return Err(InferenceError(format!("Model not found: {}", path.display())));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| InferenceError(format!("Failed to read model: {}", e)))?;
        let file: LinearModelFile = serde_json::from_slice(&bytes)
            .map_err(|e| InferenceError(format!("Failed to parse model: {}", e)))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "linear".to_string());

        Self::from_file_contents(file, name)
    }
}

impl EpicenterModel for LinearModel {
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        if features.ncols() != FEATURE_COUNT {
            return Err(InferenceError(format!(
                "Expected {} feature columns, got {}",
                FEATURE_COUNT,
                features.ncols()
            )));
        }
        Ok(features.dot(&self.coefficients.t()) + &self.intercept)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Engine status for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub layout: LayoutInfo,
    pub inference_count: u64,
    pub avg_latency_ms: f64,
}

pub struct InferenceEngine {
    model: Arc<dyn EpicenterModel>,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl InferenceEngine {
    pub fn new(model: Arc<dyn EpicenterModel>) -> Self {
        Self {
            model,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Run the model on one feature vector and return a finite, in-range epicenter
    pub fn predict(&self, features: &FeatureVector) -> Result<GeoPoint, EewError> {
        let start = Instant::now();
        let result = self.model.predict(features.view());

        let elapsed = start.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        let output = result.map_err(|e| EewError::PredictionFailure(e.to_string()))?;

        if output.dim() != (1, 2) {
            return Err(EewError::PredictionFailure(format!(
                "Model returned shape {:?}, expected (1, 2)",
                output.dim()
            )));
        }

        let epicenter = GeoPoint::new(output[[0, 0]], output[[0, 1]]);
        if !epicenter.is_finite() {
            return Err(EewError::PredictionFailure(format!(
                "Model returned non-finite coordinates ({}, {})",
                epicenter.latitude, epicenter.longitude
            )));
        }
        if !epicenter.is_valid() {
            return Err(EewError::PredictionFailure(format!(
                "Model returned coordinates off the globe ({}, {})",
                epicenter.latitude, epicenter.longitude
            )));
        }

        tracing::debug!(
            model = self.model.name(),
            latency_us = elapsed,
            lat = epicenter.latitude,
            lon = epicenter.longitude,
            "Model inference complete"
        );

        Ok(epicenter)
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_name: self.model.name().to_string(),
            layout: LayoutInfo::current(),
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{encode, feature_names, StationObservation};
    use crate::logic::stations::{Station, StationDirectory};
    use std::io::Write;

    /// Returns a fixed row regardless of input
    struct FixedModel(f64, f64);

    impl EpicenterModel for FixedModel {
        fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
            let mut out = Array2::zeros((features.nrows(), 2));
            for mut row in out.rows_mut() {
                row[0] = self.0;
                row[1] = self.1;
            }
            Ok(out)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct CountingModel {
        calls: usize,
    }

    impl StatefulModel for CountingModel {
        fn predict_mut(&mut self, features: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
            self.calls += 1;
            Ok(Array2::from_elem((features.nrows(), 2), self.calls as f64))
        }
    }

    fn features() -> FeatureVector {
        let dir = StationDirectory::from_stations([
            Station::new("A", 35.0, 139.0),
            Station::new("B", 36.0, 140.0),
        ]);
        encode(
            &[StationObservation::new("A", 10.0), StationObservation::new("B", 12.0)],
            &dir,
        )
        .unwrap()
    }

    fn identity_like() -> LinearModelFile {
        // lat = sta_lat_1, lon = sta_lon_1 + 0.5
        let mut lat = vec![0.0; FEATURE_COUNT];
        let mut lon = vec![0.0; FEATURE_COUNT];
        lat[1] = 1.0;
        lon[2] = 1.0;
        LinearModelFile {
            feature_names: Some(feature_names()),
            coefficients: vec![lat, lon],
            intercept: vec![0.0, 0.5],
        }
    }

    #[test]
    fn test_linear_model_predict() {
        let model = LinearModel::from_file_contents(identity_like(), "test").unwrap();
        let engine = InferenceEngine::new(Arc::new(model));

        let epicenter = engine.predict(&features()).unwrap();
        assert!((epicenter.latitude - 35.0).abs() < 1e-12);
        assert!((epicenter.longitude - 139.5).abs() < 1e-12);
        assert_eq!(engine.status().inference_count, 1);
    }

    #[test]
    fn test_linear_model_rejects_bad_shapes() {
        let mut file = identity_like();
        file.coefficients[0].pop();
        assert!(LinearModel::from_file_contents(file, "bad").is_err());

        let mut file = identity_like();
        file.intercept.push(1.0);
        assert!(LinearModel::from_file_contents(file, "bad").is_err());
    }

    #[test]
    fn test_linear_model_rejects_layout_mismatch() {
        let mut file = identity_like();
        if let Some(names) = file.feature_names.as_mut() {
            names.swap(0, 3);
        }
        let err = LinearModel::from_file_contents(file, "bad").unwrap_err();
        assert!(err.to_string().contains("layout mismatch"));
    }

    #[test]
    fn test_load_from_disk() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(serde_json::to_string(&identity_like()).unwrap().as_bytes())
            .unwrap();
        tmp.flush().unwrap();

        let model = LinearModel::load(tmp.path()).unwrap();
        let out = model.predict(features().view()).unwrap();
        assert_eq!(out.dim(), (1, 2));

        assert!(LinearModel::load("/nonexistent/model.json").is_err());
    }

    #[test]
    fn test_non_finite_output_is_failure() {
        let engine = InferenceEngine::new(Arc::new(FixedModel(f64::NAN, 139.0)));
        let err = engine.predict(&features()).unwrap_err();
        assert!(matches!(err, EewError::PredictionFailure(_)));

        let engine = InferenceEngine::new(Arc::new(FixedModel(35.0, f64::INFINITY)));
        assert!(engine.predict(&features()).is_err());
    }

    #[test]
    fn test_out_of_range_output_is_failure() {
        let engine = InferenceEngine::new(Arc::new(FixedModel(1e306, 139.0)));
        let err = engine.predict(&features()).unwrap_err();
        assert!(matches!(err, EewError::PredictionFailure(_)));

        let engine = InferenceEngine::new(Arc::new(FixedModel(-90.5, 139.0)));
        assert!(engine.predict(&features()).is_err());

        let engine = InferenceEngine::new(Arc::new(FixedModel(35.0, 181.0)));
        assert!(engine.predict(&features()).is_err());

        let engine = InferenceEngine::new(Arc::new(FixedModel(90.0, -180.0)));
        assert!(engine.predict(&features()).is_ok());
    }

    #[test]
    fn test_serialized_model() {
        let model = Serialized::new(CountingModel { calls: 0 }, "counting");
        let engine = InferenceEngine::new(Arc::new(model));

        assert_eq!(engine.predict(&features()).unwrap().latitude, 1.0);
        assert_eq!(engine.predict(&features()).unwrap().latitude, 2.0);
        assert_eq!(engine.status().model_name, "counting");
        assert_eq!(engine.status().inference_count, 2);
    }
}
