use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::upload::UploadReceipt;
use crate::state::AppState;
use crate::upload::form::read_upload_form;

/// POST /api/upload
///
/// Stores the resume and job description in a fresh slot and returns its id.
/// File type and size are not checked here; the input form validates them before sending.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadReceipt>, AppError> {
    let form = read_upload_form(multipart).await?;

    let retention = chrono::Duration::from_std(state.config.upload_retention)
        .map_err(|e| AppError::Internal(e.into()))?;
    let upload_id = Uuid::new_v4();
    let stored = state
        .store
        .replace_slot(
            upload_id,
            &form.file_name,
            &form.resume,
            &form.job_description,
        )
        .await?;

    info!(
        %upload_id,
        resume_bytes = form.resume.len(),
        job_chars = form.job_description.chars().count(),
        "Stored upload"
    );

    Ok(Json(UploadReceipt {
        message: "Files uploaded successfully".to_string(),
        resume_file: stored.resume_file_name(),
        job_desc_file: stored.job_file_name(),
        upload_id,
        expires_at: Utc::now() + retention,
    }))
}
