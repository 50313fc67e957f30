//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::models::AnalysisOutcome;
use crate::errors::AppError;
use crate::extraction::extract_upload;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub entries: usize,
}

/// Completed analyses are 200; failed ones keep their `{error: true, ...}`
/// body and map to 502 since the upstream model is what failed.
impl IntoResponse for AnalysisOutcome {
    fn into_response(self) -> Response {
        let status = if self.is_error() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::OK
        };
        (status, Json(self)).into_response()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// Multipart upload: `file` (PDF, DOCX or TXT) and an optional `job_description`.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<AnalysisOutcome, AppError> {
    let request_id = Uuid::new_v4();

    let mut upload: Option<(String, Bytes)> = None;
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
                upload = Some((file_name, data));
            }
            Some("job_description") => {
                job_description = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read job_description: {e}"))
                })?;
            }
            _ => {}
        }
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::Validation("A 'file' field is required".to_string()))?;
    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Upload is {} bytes; the limit is {} bytes",
            data.len(),
            state.config.max_upload_bytes
        )));
    }

    let span = info_span!("analyze", %request_id, file = %file_name);
    async move {
        let resume_text = extract_upload(&file_name, &data).await?;
        info!("Extracted {} chars; starting analysis", resume_text.len());
        Ok::<_, AppError>(state.analyzer.analyze(&resume_text, &job_description).await)
    }
    .instrument(span)
    .await
}

/// POST /api/v1/analysis/text
///
/// Same analysis for callers that already have the resume as text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<AnalysisOutcome, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let request_id = Uuid::new_v4();
    let outcome = state
        .analyzer
        .analyze(&request.resume_text, &request.job_description)
        .instrument(info_span!("analyze", %request_id))
        .await;
    Ok(outcome)
}

/// GET /api/v1/analysis/cache
pub async fn handle_cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        entries: state.analyzer.cache().len().await,
    })
}
