//! Axum route handler for resume rewrites.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::models::ImprovementSuggestion;
use crate::errors::AppError;
use crate::state::AppState;

const DOCUMENT_TITLE: &str = "Improved Resume";

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub resume_text: String,
    pub improvement_suggestions: Vec<ImprovementSuggestion>,
    #[serde(default)]
    pub job_description: String,
}

/// POST /api/v1/resumes/improve
///
/// Rewrites the resume from the given suggestions and returns the rendered
/// document as a download.
pub async fn handle_improve(
    State(state): State<AppState>,
    Json(request): Json<ImproveRequest>,
) -> Result<Response, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("improve", %request_id);

    async move {
        let sections = state
            .rewriter
            .improve(
                &request.resume_text,
                &request.improvement_suggestions,
                &request.job_description,
            )
            .await?;

        let document = state.renderer.render(DOCUMENT_TITLE, &sections)?;
        info!(
            "Rendered {} ({} bytes)",
            document.file_name,
            document.bytes.len()
        );

        let disposition = format!("attachment; filename=\"{}\"", document.file_name);
        Ok::<Response, AppError>((
            [
                (header::CONTENT_TYPE, document.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            document.bytes,
        )
            .into_response())
    }
    .instrument(span)
    .await
}
