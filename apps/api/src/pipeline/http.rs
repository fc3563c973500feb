use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::intake::form::Submission;
use crate::models::analysis::AnalysisResult;
use crate::models::upload::UploadReceipt;
use crate::pipeline::{BackendError, MatchBackend};
use crate::upload::form::{JOB_DESCRIPTION_FIELD, RESUME_FIELD};

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`MatchBackend`] that talks to a running `resumematch serve` instance.
#[derive(Clone)]
pub struct HttpMatchBackend {
    client: Client,
    base_url: String,
}

impl HttpMatchBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl MatchBackend for HttpMatchBackend {
    async fn upload(&self, submission: &Submission) -> Result<UploadReceipt, BackendError> {
        let data = tokio::fs::read(&submission.resume_path).await?;
        let mut part = Part::bytes(data).file_name(submission.file_name.clone());
        if let Some(mime) = &submission.mime {
            part = part.mime_str(mime)?;
        }
        let form = Form::new()
            .part(RESUME_FIELD, part)
            .text(JOB_DESCRIPTION_FIELD, submission.job_description.clone());

        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn analyze(&self, upload_id: Uuid) -> Result<AnalysisResult, BackendError> {
        let response = self
            .client
            .post(self.url("/api/analyze"))
            .json(&json!({ "uploadId": upload_id }))
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }
}

/// Turns a non-2xx response into [`BackendError::Status`], preferring the server's
/// `{"error": {"message"}}` text over the raw body.
async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisError, AnalysisService};
    use crate::models::analysis::fixtures::sample_result;
    use crate::pipeline::{AnalysisPipeline, CancelToken, PipelineError};
    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::storage::{StoredUpload, UploadStore};
    use crate::test_support::{spawn_local, test_config};
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Reads the stored job description back, proving the upload id points at the right slot.
    #[derive(Default)]
    struct EchoJobService {
        seen_jobs: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AnalysisService for EchoJobService {
        async fn analyze(&self, upload: &StoredUpload) -> Result<AnalysisResult, AnalysisError> {
            let job = tokio::fs::read_to_string(&upload.job_path)
                .await
                .map_err(|e| AnalysisError::Service(e.to_string()))?;
            self.seen_jobs.lock().unwrap().push(job);
            Ok(sample_result())
        }
    }

    async fn spawn_server(root: &Path, service: Arc<EchoJobService>) -> String {
        let state = AppState {
            config: test_config(root),
            store: UploadStore::new(root),
            analysis: service,
        };
        spawn_local(build_router(state)).await
    }

    #[tokio::test]
    async fn test_end_to_end_against_local_server() {
        let storage = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let resume_path = inputs.path().join("Jane CV.pdf");
        tokio::fs::write(&resume_path, b"%PDF-1.7 jane").await.unwrap();

        let service = Arc::new(EchoJobService::default());
        let base = spawn_server(storage.path(), service.clone()).await;
        let pipeline =
            AnalysisPipeline::new(HttpMatchBackend::new(base).unwrap(), Duration::from_secs(5));

        let submission = Submission {
            resume_path,
            file_name: "Jane CV.pdf".to_string(),
            mime: Some("application/pdf".to_string()),
            job_description: "Staff data engineer".to_string(),
        };
        let result = pipeline
            .run(&submission, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(result, sample_result());
        assert_eq!(
            service.seen_jobs.lock().unwrap().as_slice(),
            ["Staff data engineer".to_string()]
        );
    }

    #[tokio::test]
    async fn test_server_validation_error_surfaces_message() {
        let storage = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let resume_path = inputs.path().join("cv.pdf");
        tokio::fs::write(&resume_path, b"%PDF").await.unwrap();

        let base = spawn_server(storage.path(), Arc::default()).await;
        let backend = HttpMatchBackend::new(format!("{base}/")).unwrap();

        let submission = Submission {
            resume_path,
            file_name: "cv.pdf".to_string(),
            mime: None,
            job_description: "  ".to_string(),
        };
        let err = backend.upload(&submission).await.unwrap_err();
        match err {
            BackendError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Resume file and job description are required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_resume_file_fails_before_any_request() {
        let pipeline = AnalysisPipeline::new(
            HttpMatchBackend::new("http://127.0.0.1:9").unwrap(),
            Duration::from_secs(5),
        );
        let submission = Submission {
            resume_path: "/nonexistent/cv.pdf".into(),
            file_name: "cv.pdf".to_string(),
            mime: None,
            job_description: "anything".to_string(),
        };

        let err = pipeline
            .run(&submission, &CancelToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Upload(BackendError::Io(_))));
    }
}
