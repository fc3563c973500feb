use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::models::upload::AnalyzeRequest;
use crate::state::AppState;

/// POST /api/analyze
///
/// Resolves the upload slot named by `uploadId` and asks the analysis service to score it.
/// A body that fails to parse is answered with the usual error envelope.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let upload_id = Uuid::parse_str(request.upload_id.trim())
        .map_err(|_| AppError::Validation("uploadId must be a valid UUID".to_string()))?;

    let upload = state
        .store
        .locate(upload_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Upload {upload_id} not found")))?;

    info!(%upload_id, "Requesting analysis");
    let result = state.analysis.analyze(&upload).await?;
    info!(
        %upload_id,
        overall = result.overall_match_percent,
        "Analysis complete"
    );

    Ok(Json(result))
}
