//! Employee Attrition Predictor - Main Entry Point
//!
//! Serves `POST /predict` and the dashboard backend over HTTP.

use anyhow::{Context, Result};
use attrition_predictor::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    dataset::DatasetLoader,
    metrics::{MetricsReporter, ServiceMetrics},
    models::{ModelHandle, ModelLoader},
    server::{build_router, AppState},
    service::PredictionService,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (first argument overrides the default path)
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_from_path(&config_path)?;

    init_logging(&config.logging)?;
    info!(path = %config_path, "Configuration loaded");

    let metrics = Arc::new(ServiceMetrics::new());

    let loader = ModelLoader::with_threads(config.model.onnx_threads);
    let handle = Arc::new(ModelHandle::new(&config.model.artifact_path, loader));
    if config.model.preload {
        let artifact = handle
            .get()
            .await
            .with_context(|| format!("Failed to preload model from {}", config.model.artifact_path))?;
        info!(
            model = %artifact.name(),
            features = artifact.schema().len(),
            "Model preloaded"
        );
    } else {
        info!(path = %config.model.artifact_path, "Model will be loaded on first request");
    }

    let state = Arc::new(AppState {
        service: PredictionService::new(handle, metrics.clone()),
        dataset: DatasetLoader::new(config.dataset.source.clone()),
    });

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let app = build_router(state);
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "Attrition prediction service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!(
            "attrition_predictor={level},tower_http={level}",
            level = logging.level
        )),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if logging.format == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
