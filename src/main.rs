use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod config;
mod predictor;
mod web;

use config::Config;
use predictor::{LogisticPipeline, Predictor, WinClassifier};
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // The classifier is loaded exactly once; without it there is nothing to serve.
    let model = LogisticPipeline::from_path(&config.model_path)
        .with_context(|| format!("Failed to load classifier from {}", config.model_path))?;
    info!("Classifier '{}' loaded from {}", model.name(), config.model_path);

    let classifier: Arc<dyn WinClassifier> = Arc::new(model);
    let state = AppState {
        predictor: Predictor::new(classifier),
        loaded_at: Utc::now(),
    };

    let app = web::router(state);
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("IPL win predictor listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
