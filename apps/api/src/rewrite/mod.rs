//! Resume rewrite: asks the model to apply improvement suggestions, splits
//! the reply into resume sections, and hands them to a `DocumentRenderer`.
//!
//! Rewrites share the analysis quota: they go through the same
//! `RequestGovernor`, with a plain-text system instruction.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::analysis::models::ImprovementSuggestion;
use crate::llm_client::prompts::PLAIN_TEXT_SYSTEM;
use crate::llm_client::{GenerationParams, GovernorError, RequestGovernor};
use crate::text::{fill_template, truncate_chars};

pub mod handlers;
pub mod pdf;
pub mod renderer;
mod sections;

pub use sections::{split_sections, ResumeSection};

const REWRITE_RESUME_CHARS: usize = 6000;

pub const REWRITE_PROMPT: &str = r#"Rewrite the following resume by implementing the improvements listed below.

ORIGINAL RESUME:
{resume_text}

IMPROVEMENTS TO IMPLEMENT:
{improvements}
{target_role}
Rewrite the entire resume with these improvements while keeping the same core information.
Structure it in standard sections: Contact Information, Summary, Experience, Education, Skills.
Put each section header on its own line.
Use bullet points for accomplishments and make them quantifiable where the original supports it.
Return ONLY the improved resume text with section headers, no additional explanations."#;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("resume_text cannot be empty")]
    EmptyResume,

    #[error("improvement_suggestions cannot be empty")]
    NoSuggestions,

    #[error(transparent)]
    Governor(#[from] GovernorError),

    #[error("The model returned an empty rewrite")]
    EmptyRewrite,
}

pub struct ResumeRewriter {
    governor: Arc<RequestGovernor>,
}

impl ResumeRewriter {
    pub fn new(governor: Arc<RequestGovernor>) -> Self {
        Self { governor }
    }

    /// Returns the rewritten resume as ordered, non-empty sections.
    pub async fn improve(
        &self,
        resume_text: &str,
        suggestions: &[ImprovementSuggestion],
        job_description: &str,
    ) -> Result<Vec<ResumeSection>, RewriteError> {
        if resume_text.trim().is_empty() {
            return Err(RewriteError::EmptyResume);
        }
        if suggestions.is_empty() {
            return Err(RewriteError::NoSuggestions);
        }

        let prompt = build_rewrite_prompt(resume_text, suggestions, job_description.trim());
        let reply = self
            .governor
            .call_with(PLAIN_TEXT_SYSTEM, &prompt, GenerationParams::REWRITE)
            .await?;

        let sections = split_sections(&reply);
        if sections.is_empty() {
            return Err(RewriteError::EmptyRewrite);
        }
        info!(
            "Rewrote resume into {} sections from {} suggestions",
            sections.len(),
            suggestions.len()
        );
        Ok(sections)
    }
}

pub fn build_rewrite_prompt(
    resume_text: &str,
    suggestions: &[ImprovementSuggestion],
    job_description: &str,
) -> String {
    let improvements = suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{}. [{}] Current: {} | Suggested: {}",
                i + 1,
                s.category,
                s.current,
                s.suggested_improvement
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let target_role = if job_description.is_empty() {
        String::new()
    } else {
        format!(
            "\nTARGET ROLE (tailor wording toward it):\n{}\n",
            truncate_chars(job_description, 2000)
        )
    };

    fill_template(
        REWRITE_PROMPT,
        &[
            (
                "resume_text",
                truncate_chars(resume_text, REWRITE_RESUME_CHARS),
            ),
            ("improvements", improvements.as_str()),
            ("target_role", target_role.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::governor::DEFAULT_MAX_RETRIES;
    use crate::llm_client::rate_limiter::RateLimiter;
    use crate::llm_client::testing::ScriptedProvider;

    fn suggestion() -> ImprovementSuggestion {
        ImprovementSuggestion {
            category: "Summary".to_string(),
            current: "Hard worker".to_string(),
            suggested_improvement: "Backend engineer who cut p99 latency by 40%".to_string(),
        }
    }

    fn rewriter(provider: &Arc<ScriptedProvider>) -> ResumeRewriter {
        ResumeRewriter::new(Arc::new(RequestGovernor::new(
            provider.clone(),
            RateLimiter::default(),
            DEFAULT_MAX_RETRIES,
        )))
    }

    #[test]
    fn test_prompt_numbers_suggestions_and_adds_target_role() {
        let prompt = build_rewrite_prompt("Jane Doe", &[suggestion(), suggestion()], "Staff SRE");
        assert!(prompt.contains("1. [Summary] Current: Hard worker"));
        assert!(prompt.contains("2. [Summary]"));
        assert!(prompt.contains("TARGET ROLE"));
        assert!(prompt.contains("Staff SRE"));

        let general = build_rewrite_prompt("Jane Doe", &[suggestion()], "");
        assert!(!general.contains("TARGET ROLE"));
        assert!(!general.contains("{target_role}"));
    }

    #[test]
    fn test_suggestion_text_is_not_expanded() {
        let mut tricky = suggestion();
        tricky.suggested_improvement = "Mention {target_role} and {resume_text}".to_string();

        let prompt = build_rewrite_prompt("Jane Doe, SRE", &[tricky], "Staff SRE");
        assert!(prompt.contains("Mention {target_role} and {resume_text}"));
        assert_eq!(prompt.matches("Jane Doe, SRE").count(), 1);
        assert_eq!(prompt.matches("TARGET ROLE").count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_improve_returns_sections() {
        let provider = Arc::new(ScriptedProvider::replying(&[
            "Jane Doe\njane@example.com\n\nSUMMARY\nBackend engineer who cut p99 latency by 40%\n\nSKILLS\nRust, Go",
        ]));
        let rewriter = rewriter(&provider);

        let sections = rewriter
            .improve("Jane Doe\nHard worker", &[suggestion()], "")
            .await
            .unwrap();

        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Header", "SUMMARY", "SKILLS"]);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_improve_validates_inputs_before_calling() {
        let provider = Arc::new(ScriptedProvider::replying(&[]));
        let rewriter = rewriter(&provider);

        assert!(matches!(
            rewriter.improve(" ", &[suggestion()], "").await,
            Err(RewriteError::EmptyResume)
        ));
        assert!(matches!(
            rewriter.improve("Jane Doe", &[], "").await,
            Err(RewriteError::NoSuggestions)
        ));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_reply_is_empty_rewrite() {
        let provider = Arc::new(ScriptedProvider::replying(&["\n\n   \n"]));
        let rewriter = rewriter(&provider);

        assert!(matches!(
            rewriter.improve("Jane Doe", &[suggestion()], "").await,
            Err(RewriteError::EmptyRewrite)
        ));
    }
}
