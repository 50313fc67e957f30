// Resume analysis prompt templates.
// Placeholders are filled with `str::replace`; inputs are truncated first to
// keep requests inside the provider's context and cost limits.

use crate::text::{fill_template, truncate_chars};

pub const GENERAL_RESUME_CHARS: usize = 4000;
pub const TARGETED_RESUME_CHARS: usize = 3000;
pub const JOB_DESCRIPTION_CHARS: usize = 2000;
pub const FALLBACK_RESUME_CHARS: usize = 3000;

pub const GENERAL_ANALYSIS_PROMPT: &str = r#"You are an expert resume analyzer and career coach. Analyze the following resume and provide detailed, constructive feedback.

RESUME:
{resume_text}

Respond with a single JSON object in exactly this format:
{
  "strengths": [{"category": "string", "details": "string"}],
  "weaknesses": [{"category": "string", "details": "string"}],
  "improvement_suggestions": [{"category": "string", "current": "string", "suggested_improvement": "string"}],
  "job_recommendations": [{"title": "string", "match_reason": "string", "required_skills": ["string"]}],
  "skills_to_develop": [{"skill": "string", "reason": "string"}],
  "overall_score": "<0-10> out of 10",
  "summary_feedback": "string"
}

Make the analysis specific, actionable, and tailored to the candidate's field and experience level.
Cover both content and formatting issues. Return ONLY the JSON object."#;

pub const JOB_MATCH_ANALYSIS_PROMPT: &str = r#"You are an expert resume analyzer and recruiter. Compare the following resume against the job description and provide detailed, constructive feedback.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Respond with a single JSON object in exactly this format:
{
  "strengths": [{"category": "string", "details": "string"}],
  "weaknesses": [{"category": "string", "details": "string"}],
  "improvement_suggestions": [{"category": "string", "current": "string", "suggested_improvement": "string"}],
  "skills_to_develop": [{"skill": "string", "reason": "string"}],
  "job_match_score": "<0-10> out of 10",
  "job_match_summary": "string",
  "missing_keywords": [{"keyword": "string", "importance": "High | Medium | Low"}],
  "overall_score": "<0-10> out of 10",
  "summary_feedback": "string"
}

Judge the resume against THIS role: call out missing keywords and experience the job asks for.
Return ONLY the JSON object."#;

/// Reduced schema used once when the primary reply could not be recovered.
pub const FALLBACK_ANALYSIS_PROMPT: &str = r#"Review this resume{job_clause}.

RESUME:
{resume_text}

Respond with ONLY this JSON object, using plain strings in the lists:
{"strengths": ["string"], "weaknesses": ["string"], "overall_score": "<0-10> out of 10", "summary_feedback": "string"}"#;

pub fn build_general_prompt(resume_text: &str) -> String {
    fill_template(
        GENERAL_ANALYSIS_PROMPT,
        &[(
            "resume_text",
            truncate_chars(resume_text, GENERAL_RESUME_CHARS),
        )],
    )
}

pub fn build_job_match_prompt(resume_text: &str, job_description: &str) -> String {
    fill_template(
        JOB_MATCH_ANALYSIS_PROMPT,
        &[
            (
                "job_description",
                truncate_chars(job_description, JOB_DESCRIPTION_CHARS),
            ),
            (
                "resume_text",
                truncate_chars(resume_text, TARGETED_RESUME_CHARS),
            ),
        ],
    )
}

pub fn build_fallback_prompt(resume_text: &str, job_description: &str) -> String {
    let job_clause = if job_description.is_empty() {
        String::new()
    } else {
        format!(
            " for this role: {}",
            truncate_chars(job_description, JOB_DESCRIPTION_CHARS)
        )
    };
    fill_template(
        FALLBACK_ANALYSIS_PROMPT,
        &[
            ("job_clause", job_clause.as_str()),
            (
                "resume_text",
                truncate_chars(resume_text, FALLBACK_RESUME_CHARS),
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_prompt_requests_recommendations() {
        let prompt = build_general_prompt("Experienced engineer");
        assert!(prompt.contains("Experienced engineer"));
        assert!(prompt.contains("\"job_recommendations\""));
        assert!(!prompt.contains("missing_keywords"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_job_match_prompt_requests_match_fields() {
        let prompt = build_job_match_prompt("Experienced engineer", "Rust backend role");
        assert!(prompt.contains("Rust backend role"));
        assert!(prompt.contains("\"job_match_score\""));
        assert!(prompt.contains("\"missing_keywords\""));
        assert!(!prompt.contains("\"job_recommendations\""));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_placeholders_in_inputs_stay_literal() {
        let prompt = build_job_match_prompt("Jane Doe, SRE", "Paste {resume_text} below");
        assert!(prompt.contains("Paste {resume_text} below"));
        assert_eq!(prompt.matches("Jane Doe, SRE").count(), 1);

        let fallback = build_fallback_prompt("Jane Doe, SRE", "Role {resume_text}");
        assert!(fallback.contains("Role {resume_text}"));
        assert_eq!(fallback.matches("Jane Doe, SRE").count(), 1);
    }

    #[test]
    fn test_inputs_are_truncated_per_template() {
        let resume = "r".repeat(10_000);
        let jd = "j".repeat(5_000);

        let general = build_general_prompt(&resume);
        assert!(general.contains(&"r".repeat(GENERAL_RESUME_CHARS)));
        assert!(!general.contains(&"r".repeat(GENERAL_RESUME_CHARS + 1)));

        let targeted = build_job_match_prompt(&resume, &jd);
        assert!(targeted.contains(&"r".repeat(TARGETED_RESUME_CHARS)));
        assert!(!targeted.contains(&"r".repeat(TARGETED_RESUME_CHARS + 1)));
        assert!(!targeted.contains(&"j".repeat(JOB_DESCRIPTION_CHARS + 1)));
    }

    #[test]
    fn test_fallback_prompt_uses_plain_string_lists() {
        let prompt = build_fallback_prompt("Experienced engineer", "");
        assert!(prompt.starts_with("Review this resume."));
        assert!(prompt.contains(r#""strengths": ["string"]"#));
        assert!(!prompt.contains("improvement_suggestions"));

        let targeted = build_fallback_prompt("Experienced engineer", "Rust backend role");
        assert!(targeted.contains("for this role: Rust backend role"));
    }
}
