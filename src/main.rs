//! EEW Backend Server
//!
//! Loads the station table and the epicenter model once, then serves
//! prediction requests over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eew_backend::config::Config;
use eew_backend::logic::model::{InferenceEngine, LinearModel};
use eew_backend::logic::service::PredictionService;
use eew_backend::logic::stations::StationDirectory;
use eew_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging: JSON lines in production, human-readable otherwise
    let (json_layer, text_layer) = if config.is_production() {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eew_backend=debug,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("EEW Backend starting ({})", config.environment);

    let stations = StationDirectory::load_csv(&config.stations_path)
        .context("Failed to load station table")?;
    if stations.is_empty() {
        tracing::warn!("Station table is empty; real-mode predictions will all be rejected");
    }

    let model = LinearModel::load(&config.model_path)
        .with_context(|| format!("Model file missing or invalid at: {}", config.model_path.display()))?;
    let engine = InferenceEngine::new(Arc::new(model));

    let service = PredictionService::new(Arc::new(stations), Arc::new(engine));

    // Build application state
    let state = AppState {
        service: Arc::new(service),
        config: config.clone(),
    };

    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
