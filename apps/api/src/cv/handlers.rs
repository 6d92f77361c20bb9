use std::io::Write;
use std::path::Path;

use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tempfile::TempPath;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cv::extract::{extension_of, ALLOWED_EXTENSIONS};
use crate::cv::ingest::parse_resume;
use crate::cv::normalize::normalize;
use crate::cv::schema::Cv;
use crate::errors::AppError;
use crate::state::AppState;

/// Multipart field carrying the resume.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub cv_id: Uuid,
    pub status: &'static str,
    pub result: Cv,
}

struct Upload {
    filename: String,
    data: Bytes,
}

/// POST /upload
///
/// Accepts a PDF or image resume, runs extraction → LLM → normalization and
/// returns the canonical CV. The uploaded bytes only live on disk for the
/// duration of the request, including a request the client abandons.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_upload(&mut multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    if upload.data.len() > state.config.max_upload_bytes {
        return Err(AppError::Validation("File too large".to_string()));
    }

    let ext = extension_of(Path::new(&upload.filename));
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::Validation(format!("Unsupported file type: {ext}")));
    }

    let cv_id = Uuid::new_v4();
    info!(%cv_id, filename = %upload.filename, bytes = upload.data.len(), "Resume uploaded");

    let stored = save_upload(&state.config.upload_dir, cv_id, &upload).await?;

    let result = {
        let _permit = state
            .parse_permits
            .acquire()
            .await
            .context("parse worker pool is closed")?;
        parse_resume(stored.to_path_buf(), state.extractor.clone(), state.producer.as_ref()).await
    };
    remove_upload(stored);

    let cv = result.map_err(|source| AppError::Parse { cv_id, source })?;
    info!(%cv_id, "Resume parsed");

    Ok(Json(UploadResponse {
        cv_id,
        status: "done",
        result: cv,
    }))
}

/// POST /normalize
///
/// Normalizes an already-produced JSON value. Never fails on shape.
pub async fn handle_normalize(Json(raw): Json<Value>) -> Json<Cv> {
    Json(normalize(&raw))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(Upload { filename, data }));
    }
    Ok(None)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation("File too large".to_string())
    } else {
        AppError::Validation(format!("Invalid multipart body: {e}"))
    }
}

/// Writes the upload to `<upload_dir>/<cv_id>_<filename>`.
///
/// The file is deleted when the returned [`TempPath`] is dropped, so a
/// cancelled request does not leave it behind.
async fn save_upload(dir: &Path, cv_id: Uuid, upload: &Upload) -> Result<TempPath, AppError> {
    // drop any client-supplied directory components
    let name = Path::new(&upload.filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let prefix = format!("{cv_id}_");
    let target = dir.join(format!("{prefix}{name}"));
    let dir = dir.to_path_buf();
    let data = upload.data.clone();

    let stored = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&name)
            .rand_bytes(0)
            .tempfile_in(&dir)?;
        file.write_all(&data)?;
        Ok(file.into_temp_path())
    })
    .await
    .context("upload writer task failed")?
    .with_context(|| format!("failed to store upload at {}", target.display()))?;
    Ok(stored)
}

fn remove_upload(stored: TempPath) {
    let shown = stored.display().to_string();
    if let Err(e) = stored.close() {
        warn!("Failed to remove upload {shown}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::Router;
    use pretty_assertions::assert_eq;
    use tokio::sync::Semaphore;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::cv::extract::{ExtractError, TextExtractor};
    use crate::llm_client::{CvProducer, LlmError, MockProducer};
    use crate::routes::build_router;

    const BOUNDARY: &str = "cvparserboundary";

    struct FixedText;

    impl TextExtractor for FixedText {
        fn extract(&self, path: &Path) -> Result<String, ExtractError> {
            assert!(path.exists(), "upload must be on disk during extraction");
            Ok("Jane Doe\nSoftware Engineer".to_string())
        }
    }

    struct NoOcr;

    impl TextExtractor for NoOcr {
        fn extract(&self, _path: &Path) -> Result<String, ExtractError> {
            Err(ExtractError::BackendUnavailable("tesseract not installed".into()))
        }
    }

    /// Answers like the mock, but only after a long pause.
    struct Slow;

    #[async_trait]
    impl CvProducer for Slow {
        async fn produce(&self, resume_text: &str) -> Result<Value, LlmError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            MockProducer.produce(resume_text).await
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn app(dir: &Path, extractor: Arc<dyn TextExtractor>, max_upload_bytes: usize) -> Router {
        app_with_producer(dir, extractor, Arc::new(MockProducer), max_upload_bytes)
    }

    fn app_with_producer(
        dir: &Path,
        extractor: Arc<dyn TextExtractor>,
        producer: Arc<dyn CvProducer>,
        max_upload_bytes: usize,
    ) -> Router {
        let config = Config {
            port: 0,
            rust_log: "info".into(),
            gemini_api_key: None,
            gemini_model: "test".into(),
            mock_llm: true,
            upload_dir: dir.to_path_buf(),
            max_upload_bytes,
            parse_workers: 2,
        };
        build_router(AppState {
            config,
            extractor,
            producer,
            parse_permits: Arc::new(Semaphore::new(2)),
        })
    }

    fn multipart_request(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_upload_pdf_returns_canonical_cv() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FixedText), 1024);

        let (status, body) = send(app, multipart_request("file", "resume.PDF", b"%PDF-1.4")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "done");
        assert!(Uuid::parse_str(body["cv_id"].as_str().unwrap()).is_ok());
        assert_eq!(body["result"]["fullname"], "Mock User");
        assert_eq!(body["result"]["skills"], serde_json::json!([]));
        assert!(dir_is_empty(dir.path()), "upload must be removed");
    }

    #[tokio::test]
    async fn test_upload_image_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FixedText), 1024);
        let (status, _) = send(app, multipart_request("file", "scan.jpeg", b"\xff\xd8")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FixedText), 1024);

        let (status, body) = send(app, multipart_request("file", "resume.docx", b"PK")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Unsupported file type: .docx");
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FixedText), 8);

        let (status, body) = send(app, multipart_request("file", "resume.pdf", &[b'x'; 9])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "File too large");
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_file_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FixedText), 8);

        let oversized = vec![b'x'; 128 * 1024];
        let (status, body) = send(app, multipart_request("file", "resume.pdf", &oversized)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "File too large");
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_cancelled_upload_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with_producer(dir.path(), Arc::new(FixedText), Arc::new(Slow), 1024);

        let pending = app.oneshot(multipart_request("file", "cv.pdf", b"%PDF"));
        let outcome = tokio::time::timeout(Duration::from_millis(200), pending).await;

        assert!(outcome.is_err(), "request should still be waiting on the producer");
        assert!(dir_is_empty(dir.path()), "abandoned upload must be removed");
    }

    #[tokio::test]
    async fn test_stored_upload_is_named_after_cv_id() {
        let dir = tempfile::tempdir().unwrap();
        let cv_id = Uuid::new_v4();
        let upload = Upload {
            filename: "../nested/cv.pdf".to_string(),
            data: Bytes::from_static(b"%PDF"),
        };

        let stored = save_upload(dir.path(), cv_id, &upload).await.unwrap();
        assert_eq!(stored.to_path_buf(), dir.path().join(format!("{cv_id}_cv.pdf")));
        assert_eq!(std::fs::read(&stored).unwrap(), b"%PDF");

        remove_upload(stored);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FixedText), 1024);

        let (status, body) = send(app, multipart_request("attachment", "resume.pdf", b"x")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_extraction_failure_is_structured_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(NoOcr), 1024);

        let (status, body) = send(app, multipart_request("file", "scan.png", b"\x89PNG")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert!(body["cv_id"].is_string());
        assert_eq!(
            body["error"],
            "Extraction backend unavailable: tesseract not installed"
        );
        assert!(body["traceback"].is_array());
        assert!(dir_is_empty(dir.path()), "upload must be removed on failure");
    }

    #[tokio::test]
    async fn test_upload_strips_client_directories() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FixedText), 1024);
        let (status, _) =
            send(app, multipart_request("file", "../../etc/resume.pdf", b"%PDF")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_normalize_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FixedText), 1024);
        let request = Request::builder()
            .method("POST")
            .uri("/normalize")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"fullname": "Jane", "skills": {"name": "Go"}, "bogus": 1}"#,
            ))
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fullname"], "Jane");
        assert_eq!(body["skills"][0]["name"], "Go");
        assert!(body.get("bogus").is_none());
    }
}
