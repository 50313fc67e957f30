//! Normalization: turns whatever JSON object the model produced into a
//! complete `AnalysisResult`.
//!
//! Missing or malformed fields are healed with defaults and never surfaced
//! to the caller; each gap is logged at `debug`. List items may arrive as
//! objects or, from weaker replies, as bare strings; both are accepted.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::analysis::models::{
    AnalysisResult, AnalysisTarget, Finding, ImprovementSuggestion, JobRecommendation,
    MissingKeyword, SkillToDevelop,
};

pub const DEFAULT_OVERALL_SCORE: &str = "5 out of 10";
pub const DEFAULT_SUMMARY: &str =
    "Analysis completed. Review the strengths and areas for improvement below.";
pub const DEFAULT_JOB_MATCH_SCORE: &str = "Not available";
pub const DEFAULT_JOB_MATCH_SUMMARY: &str =
    "The analysis did not include a job match summary for this role.";
pub const PLACEHOLDER_JOB_TITLE: &str = "Consider various relevant roles";

const STRENGTH_CATEGORY: &str = "Strength";
const WEAKNESS_CATEGORY: &str = "Weakness";
const DEFAULT_KEYWORD_IMPORTANCE: &str = "Medium";

/// Builds the final result. `job_targeted` selects which group of
/// job-specific fields is filled.
pub fn normalize(mut raw: Map<String, Value>, job_targeted: bool) -> AnalysisResult {
    let target = if job_targeted {
        AnalysisTarget::JobMatch {
            job_match_score: score_text(raw.get("job_match_score"))
                .unwrap_or_else(|| gap("job_match_score", DEFAULT_JOB_MATCH_SCORE)),
            job_match_summary: non_empty_string(raw.get("job_match_summary"))
                .unwrap_or_else(|| gap("job_match_summary", DEFAULT_JOB_MATCH_SUMMARY)),
            missing_keywords: missing_keywords(raw.remove("missing_keywords")),
        }
    } else {
        let job_recommendations = match raw.remove("job_recommendations") {
            // An explicit empty list (degraded fallback) stays empty
            Some(value) if !value.is_null() => list_of("job_recommendations", Some(value)),
            _ => {
                debug!("Schema gap: job_recommendations absent, using placeholder");
                vec![placeholder_recommendation()]
            }
        };
        AnalysisTarget::General {
            job_recommendations,
        }
    };

    AnalysisResult {
        strengths: findings(raw.remove("strengths"), STRENGTH_CATEGORY),
        weaknesses: findings(raw.remove("weaknesses"), WEAKNESS_CATEGORY),
        improvement_suggestions: list_of::<ImprovementSuggestion>(
            "improvement_suggestions",
            raw.remove("improvement_suggestions"),
        ),
        skills_to_develop: list_of::<SkillToDevelop>(
            "skills_to_develop",
            raw.remove("skills_to_develop"),
        ),
        overall_score: score_text(raw.get("overall_score"))
            .unwrap_or_else(|| gap("overall_score", DEFAULT_OVERALL_SCORE)),
        summary_feedback: non_empty_string(raw.get("summary_feedback"))
            .unwrap_or_else(|| gap("summary_feedback", DEFAULT_SUMMARY)),
        target,
    }
}

/// Lifts a reduced-schema reply (`strengths`/`weaknesses` as plain strings)
/// to the full shape and blanks the fields that schema cannot supply.
pub fn upconvert_fallback(mut raw: Map<String, Value>) -> Map<String, Value> {
    for (key, category) in [
        ("strengths", STRENGTH_CATEGORY),
        ("weaknesses", WEAKNESS_CATEGORY),
    ] {
        let lifted = findings(raw.remove(key), category);
        raw.insert(
            key.to_string(),
            serde_json::to_value(lifted).unwrap_or_else(|_| Value::Array(Vec::new())),
        );
    }
    for key in [
        "improvement_suggestions",
        "job_recommendations",
        "skills_to_develop",
    ] {
        raw.insert(key.to_string(), Value::Array(Vec::new()));
    }
    raw
}

pub fn placeholder_recommendation() -> JobRecommendation {
    JobRecommendation {
        title: PLACEHOLDER_JOB_TITLE.to_string(),
        match_reason: "Your experience transfers to several roles. Add a target job description \
            for tailored matches."
            .to_string(),
        required_skills: ["Communication", "Problem solving", "Teamwork"]
            .into_iter()
            .map(String::from)
            .collect::<BTreeSet<_>>(),
    }
}

fn gap(field: &str, default: &str) -> String {
    debug!("Schema gap: {field} missing or invalid, using default");
    default.to_string()
}

fn items(field: &str, value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => {
            debug!("Schema gap: {field} absent");
            Vec::new()
        }
        Some(other) => {
            debug!("Schema gap: {field} is not a list ({other})");
            Vec::new()
        }
    }
}

fn list_of<T: DeserializeOwned>(field: &str, value: Option<Value>) -> Vec<T> {
    items(field, value)
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Dropping malformed {field} item: {e}");
                None
            }
        })
        .collect()
}

fn findings(value: Option<Value>, default_category: &str) -> Vec<Finding> {
    let field = if default_category == STRENGTH_CATEGORY {
        "strengths"
    } else {
        "weaknesses"
    };
    items(field, value)
        .into_iter()
        .filter_map(|item| match item {
            Value::String(details) if !details.trim().is_empty() => Some(Finding {
                category: default_category.to_string(),
                details,
            }),
            Value::Object(_) => serde_json::from_value(item).ok(),
            _ => None,
        })
        .collect()
}

fn missing_keywords(value: Option<Value>) -> Vec<MissingKeyword> {
    items("missing_keywords", value)
        .into_iter()
        .filter_map(|item| match item {
            Value::String(keyword) if !keyword.trim().is_empty() => Some(MissingKeyword {
                keyword,
                importance: DEFAULT_KEYWORD_IMPORTANCE.to_string(),
            }),
            Value::Object(_) => serde_json::from_value(item).ok(),
            _ => None,
        })
        .collect()
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Accepts `7`, `7.5`, `"7"`, `"7 out of 10"` or `"7/10"`; numbers are
/// clamped to 0–10. Prose, non-finite values and other scales are gaps
/// and get the field's default.
fn score_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()).map(format_score),
        Value::String(s) => parse_score(s).map(format_score),
        _ => None,
    }
}

fn parse_score(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, rest) = text.split_at(end);
    let score = number.parse::<f64>().ok().filter(|n| n.is_finite())?;

    let rest: String = rest
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    match rest.trim_end_matches('.') {
        "" | "outof10" | "/10" => Some(score),
        _ => None,
    }
}

fn format_score(score: f64) -> String {
    let score = score.clamp(0.0, 10.0);
    if score.fract() == 0.0 {
        format!("{} out of 10", score as i64)
    } else {
        format!("{:.1} out of 10", score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_missing_skills_to_develop_becomes_empty_list() {
        let raw = object(json!({
            "strengths": [{"category": "Impact", "details": "Quantified results"}],
            "overall_score": "8 out of 10",
            "summary_feedback": "Strong resume"
        }));
        let result = normalize(raw, false);

        assert!(result.skills_to_develop.is_empty());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["skills_to_develop"], json!([]));
        assert_eq!(value["weaknesses"], json!([]));
        assert_eq!(value["improvement_suggestions"], json!([]));
    }

    #[test]
    fn test_empty_object_gets_every_default() {
        let result = normalize(Map::new(), false);
        assert_eq!(result.overall_score, DEFAULT_OVERALL_SCORE);
        assert_eq!(result.summary_feedback, DEFAULT_SUMMARY);
        let recs = result.job_recommendations().unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, PLACEHOLDER_JOB_TITLE);
        assert!(!recs[0].required_skills.is_empty());
    }

    #[test]
    fn test_present_recommendations_are_kept() {
        let raw = object(json!({
            "job_recommendations": [{
                "title": "Platform Engineer",
                "match_reason": "Infra background",
                "required_skills": ["Kubernetes", "Terraform"]
            }]
        }));
        let result = normalize(raw, false);
        let recs = result.job_recommendations().unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "Platform Engineer");
    }

    #[test]
    fn test_explicit_empty_recommendations_stay_empty() {
        let raw = object(json!({"job_recommendations": []}));
        let result = normalize(raw, false);
        assert!(result.job_recommendations().unwrap().is_empty());
    }

    #[test]
    fn test_job_targeted_fills_match_fields() {
        let raw = object(json!({
            "job_match_score": 6,
            "missing_keywords": ["Kafka", {"keyword": "gRPC", "importance": "High"}],
            "job_recommendations": [{"title": "ignored"}]
        }));
        let result = normalize(raw, true);
        match &result.target {
            AnalysisTarget::JobMatch {
                job_match_score,
                job_match_summary,
                missing_keywords,
            } => {
                assert_eq!(job_match_score, "6 out of 10");
                assert_eq!(job_match_summary, DEFAULT_JOB_MATCH_SUMMARY);
                assert_eq!(missing_keywords.len(), 2);
                assert_eq!(missing_keywords[0].keyword, "Kafka");
                assert_eq!(missing_keywords[0].importance, DEFAULT_KEYWORD_IMPORTANCE);
                assert_eq!(missing_keywords[1].importance, "High");
            }
            other => panic!("expected JobMatch, got {other:?}"),
        }
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("job_recommendations").is_none());
    }

    #[test]
    fn test_unusable_scores_fall_back_to_defaults() {
        let raw = object(json!({
            "overall_score": "Excellent",
            "job_match_score": "NaN"
        }));
        let result = normalize(raw, true);
        assert_eq!(result.overall_score, DEFAULT_OVERALL_SCORE);
        match result.target {
            AnalysisTarget::JobMatch {
                job_match_score, ..
            } => assert_eq!(job_match_score, DEFAULT_JOB_MATCH_SCORE),
            other => panic!("expected job match target, got {other:?}"),
        }
    }

    #[test]
    fn test_score_formats() {
        assert_eq!(score_text(Some(&json!(7))).unwrap(), "7 out of 10");
        assert_eq!(score_text(Some(&json!(7.5))).unwrap(), "7.5 out of 10");
        assert_eq!(score_text(Some(&json!("8"))).unwrap(), "8 out of 10");
        assert_eq!(score_text(Some(&json!(14))).unwrap(), "10 out of 10");
        assert_eq!(
            score_text(Some(&json!("6 out of 10"))).unwrap(),
            "6 out of 10"
        );
        assert_eq!(score_text(Some(&json!("7/10"))).unwrap(), "7 out of 10");
        assert_eq!(score_text(Some(&json!("8.5 / 10"))).unwrap(), "8.5 out of 10");
        assert_eq!(
            score_text(Some(&json!("12 out of 10"))).unwrap(),
            "10 out of 10"
        );
        assert_eq!(score_text(Some(&json!("NaN"))), None);
        assert_eq!(score_text(Some(&json!("inf"))), None);
        assert_eq!(score_text(Some(&json!("Excellent"))), None);
        assert_eq!(score_text(Some(&json!("7 out of 100"))), None);
        assert_eq!(score_text(Some(&json!(""))), None);
        assert_eq!(score_text(Some(&json!(null))), None);
        assert_eq!(score_text(None), None);
    }

    #[test]
    fn test_malformed_items_are_dropped_not_fatal() {
        let raw = object(json!({
            "skills_to_develop": [{"skill": "Rust", "reason": "Systems roles"}, 42, "Go"],
            "improvement_suggestions": "not a list",
            "strengths": [null, "Clear layout"]
        }));
        let result = normalize(raw, false);
        assert_eq!(result.skills_to_develop.len(), 1);
        assert!(result.improvement_suggestions.is_empty());
        assert_eq!(
            result.strengths,
            vec![Finding {
                category: STRENGTH_CATEGORY.to_string(),
                details: "Clear layout".to_string()
            }]
        );
    }

    #[test]
    fn test_fallback_upconversion() {
        let raw = object(json!({
            "strengths": ["Good formatting"],
            "weaknesses": ["Too long"],
            "overall_score": "6 out of 10",
            "summary_feedback": "ok"
        }));
        let result = normalize(upconvert_fallback(raw), false);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value["strengths"],
            json!([{"category": "Strength", "details": "Good formatting"}])
        );
        assert_eq!(
            value["weaknesses"],
            json!([{"category": "Weakness", "details": "Too long"}])
        );
        assert_eq!(value["improvement_suggestions"], json!([]));
        assert_eq!(value["job_recommendations"], json!([]));
        assert_eq!(value["skills_to_develop"], json!([]));
        assert_eq!(value["overall_score"], "6 out of 10");
        assert_eq!(value["summary_feedback"], "ok");
    }
}
