//! Resume analysis: orchestrates one critique request.
//!
//! Flow: fingerprint → cache check → prompt (general or job-targeted) →
//!       governed LLM call → JSON recovery → one reduced-schema fallback if
//!       recovery failed → normalize → cache store → return.
//!
//! Every failure is converted to an `ErrorResult` here; nothing escapes
//! `analyze` as an error.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::analysis::cache::{fingerprint, AnalysisCache};
use crate::analysis::models::{AnalysisOutcome, AnalysisResult, ErrorResult};
use crate::analysis::normalize::{normalize, upconvert_fallback};
use crate::analysis::prompts::{
    build_fallback_prompt, build_general_prompt, build_job_match_prompt,
};
use crate::llm_client::recovery::recover_json;
use crate::llm_client::{GovernorError, RequestGovernor};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Governor(#[from] GovernorError),

    #[error("Model output could not be parsed as JSON, even with the simplified schema. Output began: {preview:?}")]
    Unrecoverable { preview: String },
}

impl AnalysisError {
    pub fn to_error_result(&self) -> ErrorResult {
        let message = match self {
            AnalysisError::Governor(_) => {
                "The AI service could not complete the analysis. Please try again in a moment."
            }
            AnalysisError::Unrecoverable { .. } => {
                "Failed to parse analysis results. Please try again."
            }
        };
        ErrorResult::new(message, self.to_string())
    }
}

pub struct Analyzer {
    governor: Arc<RequestGovernor>,
    cache: AnalysisCache,
}

impl Analyzer {
    pub fn new(governor: Arc<RequestGovernor>) -> Self {
        Self {
            governor,
            cache: AnalysisCache::default(),
        }
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Analyzes a resume, optionally against a job description.
    /// A blank `job_description` selects the general critique.
    pub async fn analyze(&self, resume_text: &str, job_description: &str) -> AnalysisOutcome {
        if resume_text.trim().is_empty() {
            return AnalysisOutcome::Failed(ErrorResult::new(
                "No resume text to analyze.",
                "The document produced no text. Upload a PDF with selectable text or a TXT file.",
            ));
        }
        let job_description = job_description.trim();

        let key = fingerprint(resume_text, job_description);
        if let Some(cached) = self.cache.get(&key).await {
            info!("Analysis cache hit ({})", &key[..12]);
            return AnalysisOutcome::Completed(cached);
        }
        info!(
            "Analysis cache miss ({}); calling {}",
            &key[..12],
            self.governor.provider_name()
        );

        match self.run(resume_text, job_description).await {
            Ok(result) => AnalysisOutcome::Completed(self.cache.put(key, result).await),
            Err(e) => {
                error!("Resume analysis failed: {e}");
                AnalysisOutcome::Failed(e.to_error_result())
            }
        }
    }

    async fn run(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let job_targeted = !job_description.is_empty();
        let prompt = if job_targeted {
            build_job_match_prompt(resume_text, job_description)
        } else {
            build_general_prompt(resume_text)
        };

        let raw = self.governor.call(&prompt).await?;

        let recovered = match recover_object(&raw) {
            Some(object) => object,
            None => {
                warn!(
                    "Could not recover JSON from {} chars of model output; retrying with simplified schema",
                    raw.len()
                );
                self.fallback(resume_text, job_description).await?
            }
        };

        Ok(normalize(recovered, job_targeted))
    }

    /// Exactly one reduced-schema attempt.
    async fn fallback(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<Map<String, Value>, AnalysisError> {
        let prompt = build_fallback_prompt(resume_text, job_description);
        let raw = self.governor.call(&prompt).await?;

        recover_object(&raw)
            .map(upconvert_fallback)
            .ok_or_else(|| AnalysisError::Unrecoverable {
                preview: raw.chars().take(120).collect(),
            })
    }
}

fn recover_object(raw: &str) -> Option<Map<String, Value>> {
    match recover_json(raw)? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
