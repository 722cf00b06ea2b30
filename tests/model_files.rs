use std::path::Path;
use std::sync::Arc;

use eew_backend::logic::model::{InferenceEngine, LinearModel};
use eew_backend::logic::service::PredictionService;
use eew_backend::logic::stations::StationDirectory;
use eew_backend::models::PredictRequest;

fn artifact(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("model_files").join(name)
}

#[test]
fn test_shipped_artifacts_serve_a_prediction() {
    let stations = StationDirectory::load_csv(artifact("stations.csv")).expect("station table");
    let model = LinearModel::load(artifact("japan_eew_model.json")).expect("model artifact");
    let service = PredictionService::new(
        Arc::new(stations),
        Arc::new(InferenceEngine::new(Arc::new(model))),
    );

    let response = service
        .predict(PredictRequest {
            mode: None,
            station_codes: Some(vec!["SND01".into(), "FKS01".into(), "MRK01".into()]),
            arrival_times: Some(vec![3.1, 4.4, 5.0]),
        })
        .expect("prediction");

    assert_eq!(response.earliest_station, "SND01");
    assert_eq!(response.warnings.len(), 7);
    assert!(response.pred_lat.is_finite() && response.pred_lon.is_finite());
}
