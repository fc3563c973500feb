//! Two-step request orchestration: upload, then analyze.
//!
//! Each step runs under its own timeout and can be abandoned through a
//! [`CancelToken`]. A failed upload means no analysis request is ever sent.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use crate::intake::form::Submission;
use crate::models::analysis::AnalysisResult;
use crate::models::upload::UploadReceipt;

pub mod http;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    Analyze,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Upload => f.write_str("upload"),
            Step::Analyze => f.write_str("analyze"),
        }
    }
}

/// Failure reported by a [`MatchBackend`] for a single request.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read resume: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server returned status {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Upload failed: {0}")]
    Upload(#[source] BackendError),

    #[error("Analysis failed: {0}")]
    Analyze(#[source] BackendError),

    #[error("The {step} step timed out after {after:?}")]
    Timeout { step: Step, after: Duration },

    #[error("Cancelled during the {step} step")]
    Cancelled { step: Step },
}

impl PipelineError {
    /// The step that ended the attempt.
    pub fn step(&self) -> Step {
        match self {
            PipelineError::Upload(_) => Step::Upload,
            PipelineError::Analyze(_) => Step::Analyze,
            PipelineError::Timeout { step, .. } | PipelineError::Cancelled { step } => *step,
        }
    }
}

/// The two calls the pipeline makes. `HttpMatchBackend` talks to `resumematch serve`.
#[async_trait]
pub trait MatchBackend: Send + Sync {
    async fn upload(&self, submission: &Submission) -> Result<UploadReceipt, BackendError>;

    async fn analyze(&self, upload_id: Uuid) -> Result<AnalysisResult, BackendError>;
}

/// Cloneable cancellation handle. Cancelling is sticky: once set, every current and
/// future wait resolves immediately.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once cancelled.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

pub struct AnalysisPipeline<B> {
    backend: B,
    step_timeout: Duration,
}

impl<B: MatchBackend> AnalysisPipeline<B> {
    pub fn new(backend: B, step_timeout: Duration) -> Self {
        Self {
            backend,
            step_timeout,
        }
    }

    /// Uploads the submission, then requests its analysis with the returned upload id.
    pub async fn run(
        &self,
        submission: &Submission,
        cancel: &CancelToken,
    ) -> Result<AnalysisResult, PipelineError> {
        let receipt = self
            .step(Step::Upload, cancel, self.backend.upload(submission))
            .await?
            .map_err(PipelineError::Upload)?;
        info!(
            upload_id = %receipt.upload_id,
            resume_file = %receipt.resume_file,
            expires_at = %receipt.expires_at,
            "Upload accepted"
        );

        let result = self
            .step(Step::Analyze, cancel, self.backend.analyze(receipt.upload_id))
            .await?
            .map_err(PipelineError::Analyze)?;
        debug!(upload_id = %receipt.upload_id, "Analysis received");

        Ok(result)
    }

    async fn step<T>(
        &self,
        step: Step,
        cancel: &CancelToken,
        call: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<Result<T, BackendError>, PipelineError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled { step }),
            outcome = tokio::time::timeout(self.step_timeout, call) => {
                outcome.map_err(|_| PipelineError::Timeout { step, after: self.step_timeout })
            }
        }
    }
}
