mod config;
mod cv;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cv::extract::DocumentTextExtractor;
use crate::llm_client::{CvProducer, GeminiClient, MockProducer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed or missing values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV parser v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload_dir.display()
            )
        })?;

    let producer = build_producer(&config)?;
    info!("JSON producer initialized ({})", producer.name());
    info!("Parse worker pool size: {}", config.parse_workers);

    // Build app state
    let state = AppState {
        config: config.clone(),
        extractor: Arc::new(DocumentTextExtractor),
        producer,
        parse_permits: Arc::new(Semaphore::new(config.parse_workers)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the backend's origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

/// Picks the JSON producer: the mock when MOCK_GEMINI=1, Gemini otherwise.
fn build_producer(config: &Config) -> Result<Arc<dyn CvProducer>> {
    if config.mock_llm {
        warn!("MOCK_GEMINI=1: resumes will be answered with a fixed mock document");
        return Ok(Arc::new(MockProducer));
    }
    let api_key = config
        .gemini_api_key
        .clone()
        .context("GEMINI_API_KEY is required when not mocking")?;
    let client = GeminiClient::new(api_key, config.gemini_model.clone())
        .context("Failed to build HTTP client")?;
    info!("LLM client initialized (model: {})", client.model());
    Ok(Arc::new(client))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining in-flight requests");
}
