//! Earthquake Early Warning Backend
//!
//! Estimates an epicenter from sparse P-wave first arrivals and computes,
//! for a fixed roster of cities, the S-wave lead time and a risk tier.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        EEW BACKEND                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────────────────────────────┐    │
//! │  │  API      │──▶│  PredictionService                   │    │
//! │  │  (Axum)   │   │   FeatureEncoder → InferenceEngine   │    │
//! │  └───────────┘   │   or SampleRegion → WarningEngine    │    │
//! │                  └──────────────────┬───────────────────┘    │
//! │                                     ▼                        │
//! │              StationDirectory · City roster (read-only)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult, EewError};

use logic::service::PredictionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub config: config::Config,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/stations", get(handlers::reference::stations))
        .route("/api/v1/cities", get(handlers::reference::cities))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
