use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response body of `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub message: String,
    pub resume_file: String,
    pub job_desc_file: String,
    /// Handle for the stored files; pass it to `POST /api/analyze`.
    pub upload_id: Uuid,
    /// When the sweeper may reclaim the slot.
    pub expires_at: DateTime<Utc>,
}

/// Request body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub upload_id: String,
}
