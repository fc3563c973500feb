//! Client for the external analysis service.
//!
//! The service owns all matching logic (keyword extraction, similarity, ATS scoring);
//! this module only ships it a reference to an uploaded slot and decodes the
//! [`AnalysisResult`] it answers with. No other module talks to the service directly.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::storage::StoredUpload;

pub mod handlers;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Analysis service reported an error: {0}")]
    Service(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Analysis service did not answer within {0:?}")]
    Timeout(Duration),
}

/// Seam between the HTTP layer and whatever performs the analysis.
///
/// Carried in `AppState` as `Arc<dyn AnalysisService>`.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, upload: &StoredUpload) -> Result<AnalysisResult, AnalysisError>;
}

/// Body posted to the analysis service.
///
/// `use_assets` keeps the service on its file-reading code path; the slot paths and
/// upload id tell it exactly which files to read.
#[derive(Debug, Serialize)]
struct ServiceRequest<'a> {
    use_assets: bool,
    upload_id: Uuid,
    resume_path: &'a Path,
    job_path: &'a Path,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    error: String,
}

/// reqwest-backed [`AnalysisService`]. Every call is bounded by `timeout`; there are no retries.
#[derive(Clone)]
pub struct HttpAnalysisService {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnalysisService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, upload: &StoredUpload) -> Result<AnalysisResult, AnalysisError> {
        let body = ServiceRequest {
            use_assets: true,
            upload_id: upload.upload_id,
            resume_path: &upload.resume_path,
            job_path: &upload.job_path,
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ServiceError>(&bytes)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            warn!(upload_id = %upload.upload_id, "Analysis service returned {status}: {message}");
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                message,
            });
        }

        decode_result(&bytes)
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, upload: &StoredUpload) -> Result<AnalysisResult, AnalysisError> {
        debug!(upload_id = %upload.upload_id, endpoint = %self.endpoint, "Calling analysis service");
        tokio::time::timeout(self.timeout, self.send(upload))
            .await
            .map_err(|_| AnalysisError::Timeout(self.timeout))?
    }
}

/// Decodes a 2xx body. The service can answer 200 with `{"error": ...}` when its
/// own file lookup fails, which is reported as [`AnalysisError::Service`].
fn decode_result(bytes: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    match serde_json::from_slice::<AnalysisResult>(bytes) {
        Ok(result) => Ok(result),
        Err(parse_err) => match serde_json::from_slice::<ServiceError>(bytes) {
            Ok(service_err) => Err(AnalysisError::Service(service_err.error)),
            Err(_) => Err(AnalysisError::Parse(parse_err)),
        },
    }
}
