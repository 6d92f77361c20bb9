//! LLM Client: the JSON producer behind the CV parser.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! Everything that needs structured output from a model goes through a
//! [`CvProducer`], which is constructed once at startup and carried in
//! `AppState`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cv::prompts::{render_extract_prompt, CV_EXTRACT_SYSTEM};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT_SECS: u64 = 120;
/// How much of an unparseable answer is kept in the log.
const RAW_LOG_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Turns resume text into an (untrusted) JSON value shaped like a `Cv`.
#[async_trait]
pub trait CvProducer: Send + Sync {
    async fn produce(&self, resume_text: &str) -> Result<Value, LlmError>;

    /// Backend name, for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a single call to the Gemini API, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<GenerateResponse, LlmError> {
        let request_body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        if let Some(usage) = &generated.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        Ok(generated)
    }

    /// Calls the model and parses the text answer as JSON.
    pub async fn call_json(&self, prompt: &str, system: &str) -> Result<Value, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        parse_json_answer(text)
    }
}

#[async_trait]
impl CvProducer for GeminiClient {
    async fn produce(&self, resume_text: &str) -> Result<Value, LlmError> {
        let prompt = render_extract_prompt(resume_text);
        match self.call_json(&prompt, CV_EXTRACT_SYSTEM).await {
            Err(LlmError::Parse(e)) => {
                // An unreadable answer still yields a (default) document downstream.
                warn!("LLM answer is not valid JSON, using empty object: {e}");
                Ok(Value::Object(Default::default()))
            }
            other => other,
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Deterministic producer for development and tests. Makes no network calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProducer;

#[async_trait]
impl CvProducer for MockProducer {
    async fn produce(&self, _resume_text: &str) -> Result<Value, LlmError> {
        Ok(json!({
            "avatarUrl": "", "fullname": "Mock User", "preferredName": "",
            "email": "", "phone": "", "location": {"city": "", "state": "", "country": ""},
            "headline": "", "summary": "Mocked resume", "targetRole": "",
            "employmentType": [], "salaryExpectation": "", "availability": "",
            "skills": [], "experiences": [], "education": [], "projects": [],
            "certifications": [], "languages": [], "portfolio": [], "references": [],
            "status": "draft", "tags": [], "version": 0
        }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

fn parse_json_answer(text: &str) -> Result<Value, LlmError> {
    let text = strip_json_fences(text);
    serde_json::from_str(text).map_err(|e| {
        let head: String = text.chars().take(RAW_LOG_LIMIT).collect();
        warn!("Raw LLM output (first {RAW_LOG_LIMIT} chars): {head}");
        LlmError::Parse(e)
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
