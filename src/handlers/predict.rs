//! Prediction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::EewError;
use crate::models::{PredictRequest, PredictionResponse};
use crate::{AppError, AppResult, AppState};

/// Estimate the epicenter and per-city warnings
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let Json(req) = payload?;

    let response = state.service.predict(req).map_err(|e| {
        // Model failures are logged when converted into a response
        if !matches!(e, EewError::PredictionFailure(_)) {
            tracing::warn!("Prediction request rejected: {}", e);
        }
        AppError::from(e)
    })?;

    Ok(Json(response))
}
