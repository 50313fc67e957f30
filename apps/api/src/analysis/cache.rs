//! Process-lifetime memoization of analysis results.
//!
//! Keys are SHA-256 fingerprints over bounded prefixes of the inputs, so two
//! long resumes sharing their first 500 characters (and the same first 200
//! characters of job description) share an entry. Entries are never evicted.

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::analysis::models::AnalysisResult;
use crate::text::truncate_chars;

pub const RESUME_PREFIX_CHARS: usize = 500;
pub const JOB_PREFIX_CHARS: usize = 200;

/// Hex SHA-256 of the resume prefix and job description prefix.
pub fn fingerprint(resume_text: &str, job_description: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(truncate_chars(resume_text, RESUME_PREFIX_CHARS).as_bytes());
    // unit separator keeps ("ab", "c") and ("a", "bc") apart
    hasher.update(b"\x1f");
    hasher.update(truncate_chars(job_description, JOB_PREFIX_CHARS).as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Default)]
pub struct AnalysisCache {
    entries: Mutex<HashMap<String, Arc<AnalysisResult>>>,
}

impl AnalysisCache {
    pub async fn get(&self, key: &str) -> Option<Arc<AnalysisResult>> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Stores `value` unless the key is already present; returns whichever
    /// result the key now maps to (the first one stored wins).
    pub async fn put(&self, key: String, value: AnalysisResult) -> Arc<AnalysisResult> {
        self.entries
            .lock()
            .await
            .entry(key)
            .or_insert_with(|| Arc::new(value))
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::AnalysisTarget;

    fn result(summary: &str) -> AnalysisResult {
        AnalysisResult {
            strengths: vec![],
            weaknesses: vec![],
            improvement_suggestions: vec![],
            skills_to_develop: vec![],
            overall_score: "5 out of 10".to_string(),
            summary_feedback: summary.to_string(),
            target: AnalysisTarget::General {
                job_recommendations: vec![],
            },
        }
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = fingerprint("resume", "job");
        assert_eq!(a, fingerprint("resume", "job"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_sensitive_within_resume_prefix() {
        let base = "a".repeat(1000);
        let mut changed = base.clone();
        changed.replace_range(499..500, "b");
        assert_ne!(fingerprint(&base, ""), fingerprint(&changed, ""));

        let mut changed = base.clone();
        changed.replace_range(0..1, "z");
        assert_ne!(fingerprint(&base, ""), fingerprint(&changed, ""));
    }

    #[test]
    fn test_fingerprint_ignores_resume_beyond_prefix() {
        let base = "a".repeat(1000);
        let mut changed = base.clone();
        changed.replace_range(600..601, "b");
        assert_eq!(fingerprint(&base, ""), fingerprint(&changed, ""));
    }

    #[test]
    fn test_fingerprint_job_description_prefix() {
        let resume = "Experienced engineer";
        let jd = "j".repeat(400);
        let mut early = jd.clone();
        early.replace_range(150..151, "x");
        let mut late = jd.clone();
        late.replace_range(300..301, "x");

        assert_ne!(fingerprint(resume, &jd), fingerprint(resume, &early));
        assert_eq!(fingerprint(resume, &jd), fingerprint(resume, &late));
        assert_ne!(fingerprint(resume, ""), fingerprint(resume, &jd));
    }

    #[test]
    fn test_fingerprint_separates_fields() {
        assert_ne!(fingerprint("ab", "c"), fingerprint("a", "bc"));
    }

    #[tokio::test]
    async fn test_first_stored_result_wins() {
        let cache = AnalysisCache::default();
        let key = fingerprint("resume", "");
        assert!(cache.get(&key).await.is_none());

        let first = cache.put(key.clone(), result("first")).await;
        let second = cache.put(key.clone(), result("second")).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.summary_feedback, "first");
        assert_eq!(cache.get(&key).await.unwrap().summary_feedback, "first");
        assert_eq!(cache.len().await, 1);
    }
}
