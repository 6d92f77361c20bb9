use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::cv::extract::{ExtractError, TextExtractor};
use crate::cv::normalize::normalize;
use crate::cv::schema::Cv;
use crate::llm_client::{CvProducer, LlmError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("LLM extraction failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Extraction task failed: {0}")]
    Join(#[from] JoinError),
}

/// Text extraction → JSON production → normalization for one stored upload.
///
/// Extraction is blocking and runs on the blocking pool; normalization is
/// pure and cheap, so it stays on the calling task.
pub async fn parse_resume(
    path: PathBuf,
    extractor: Arc<dyn TextExtractor>,
    producer: &dyn CvProducer,
) -> Result<Cv, PipelineError> {
    let text = tokio::task::spawn_blocking(move || extractor.extract(&path)).await??;
    debug!("Extracted {} chars of resume text", text.chars().count());

    let raw = producer.produce(&text).await?;
    info!("Producer '{}' returned a document", producer.name());

    Ok(normalize(&raw))
}
