use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::cv::extract::TextExtractor;
use crate::llm_client::CvProducer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Text producer. Default: `DocumentTextExtractor` (pdf-extract + tesseract).
    pub extractor: Arc<dyn TextExtractor>,
    /// JSON producer. `GeminiClient`, or `MockProducer` when MOCK_GEMINI=1.
    pub producer: Arc<dyn CvProducer>,
    /// Bounds concurrent parse pipelines to `config.parse_workers`.
    pub parse_permits: Arc<Semaphore>,
}
