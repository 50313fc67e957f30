use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A strength or weakness called out by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub suggested_improvement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillToDevelop {
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecommendation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub match_reason: String,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingKeyword {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub importance: String,
}

/// Fields that depend on whether a job description was supplied.
/// Flattened into the result, so only one group of keys is ever emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisTarget {
    JobMatch {
        job_match_score: String,
        job_match_summary: String,
        missing_keywords: Vec<MissingKeyword>,
    },
    General {
        job_recommendations: Vec<JobRecommendation>,
    },
}

/// A normalized critique. Every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub strengths: Vec<Finding>,
    pub weaknesses: Vec<Finding>,
    pub improvement_suggestions: Vec<ImprovementSuggestion>,
    pub skills_to_develop: Vec<SkillToDevelop>,
    /// "<0-10> out of 10"
    pub overall_score: String,
    pub summary_feedback: String,
    #[serde(flatten)]
    pub target: AnalysisTarget,
}

impl AnalysisResult {
    pub fn job_recommendations(&self) -> Option<&[JobRecommendation]> {
        match &self.target {
            AnalysisTarget::General {
                job_recommendations,
            } => Some(job_recommendations),
            AnalysisTarget::JobMatch { .. } => None,
        }
    }
}

/// Terminal failure shown to the caller. Serializes as
/// `{"error": true, "message": ..., "details": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    error: bool,
    pub message: String,
    pub details: String,
}

impl ErrorResult {
    pub fn new(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            details: details.into(),
        }
    }
}

/// What `Analyzer::analyze` hands back. Callers branch on this before
/// reading any analysis field.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Completed(Arc<AnalysisResult>),
    Failed(ErrorResult),
}

impl AnalysisOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisOutcome::Failed(_))
    }

    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        match self {
            AnalysisOutcome::Completed(result) => Some(result),
            AnalysisOutcome::Failed(_) => None,
        }
    }
}
