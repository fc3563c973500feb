use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

pub const RESUME_FIELD: &str = "resume";
pub const JOB_DESCRIPTION_FIELD: &str = "jobDescription";
pub const MISSING_FIELDS_MESSAGE: &str = "Resume file and job description are required";

/// The two fields of an upload request, fully read into memory.
#[derive(Debug)]
pub struct UploadForm {
    /// Name the client gave the file; only its extension is kept on disk.
    pub file_name: String,
    pub resume: Bytes,
    pub job_description: String,
}

/// Drains the multipart body. Unknown fields are skipped.
///
/// Fails with a validation error when the resume is absent or empty, or when the job
/// description is absent or blank.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            RESUME_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read resume: {e}")))?;
                resume = Some((file_name, data));
            }
            JOB_DESCRIPTION_FIELD => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    match (resume, job_description) {
        (Some((file_name, resume)), Some(job_description))
            if !resume.is_empty() && !job_description.trim().is_empty() =>
        {
            Ok(UploadForm {
                file_name,
                resume,
                job_description,
            })
        }
        _ => Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())),
    }
}
