//! Fraud Detection API - Main Entry Point
//!
//! Serves fraud predictions over HTTP from a pre-trained classifier artifact.
//! The process starts even when the artifact is missing; health checks report
//! the degraded state instead.

use anyhow::Result;
use fraud_detection_api::{
    config::AppConfig,
    metrics::ServiceMetrics,
    models::adapter::ModelAdapter,
    server::{self, AppState},
    service::PredictionService,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("fraud_detection_api={}", config.logging.level).parse()?);
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Starting Fraud Detection API");
    info!(
        port = config.server.port,
        model_path = %config.model.path,
        threshold = config.model.threshold,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics = Arc::new(ServiceMetrics::new());

    // Load the classifier artifact; a failed load degrades instead of aborting
    let adapter = Arc::new(ModelAdapter::load(&config.model));
    if adapter.is_loaded() {
        info!("Model loaded, predictions enabled");
    } else {
        warn!("No model available, /predict will answer 503 until one is provided");
    }

    let service = Arc::new(PredictionService::new(
        adapter.clone(),
        metrics.clone(),
        config.model.threshold,
    ));

    let state = AppState {
        service,
        adapter,
        metrics,
    };

    server::serve(&config, state).await
}
