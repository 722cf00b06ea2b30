//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the prediction core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EewError {
    /// One or more station codes have no entry in the directory
    #[error("Unknown station(s): {}", .0.join(", "))]
    UnknownStation(Vec<String>),

    /// Missing fields, mismatched lengths, too many stations, bad values
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The model call failed or produced an unusable epicenter
    #[error("Prediction failed: {0}")]
    PredictionFailure(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Domain errors
    Eew(EewError),

    // Body could not be decoded
    InvalidBody(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, unknown) = match &self {
            AppError::Eew(err) => match err {
                EewError::UnknownStation(codes) => {
                    (StatusCode::BAD_REQUEST, err.to_string(), Some(codes.clone()))
                }
                EewError::MalformedRequest(_) => (StatusCode::BAD_REQUEST, err.to_string(), None),
                EewError::PredictionFailure(msg) => {
                    tracing::error!("Prediction failure: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed".to_string(), None)
                }
            },
            AppError::InvalidBody(msg) => {
                (StatusCode::BAD_REQUEST, format!("Malformed request: {}", msg), None)
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let Some(codes) = unknown {
            body["unknown_stations"] = json!(codes);
        }

        (status, Json(body)).into_response()
    }
}

impl From<EewError> for AppError {
    fn from(err: EewError) -> Self {
        AppError::Eew(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}
