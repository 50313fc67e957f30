//! Request governor: rate limiting, retry with backoff, and quota detection
//! around a single provider call.
//!
//! Retry policy per attempt (`max_retries` attempts in total):
//! - wait for the rolling-window limiter if it is exhausted (+1 s margin),
//!   then record the dispatch before calling the provider;
//! - success → return the raw text;
//! - quota error → back off `2^attempt` seconds and retry;
//! - other error on the last attempt → return it;
//! - other error otherwise → wait 1 s and retry.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::prompts::JSON_ONLY_SYSTEM;
use super::rate_limiter::RateLimiter;
use super::{GenerationParams, GenerationRequest, ModelProvider, ProviderError};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
const LIMITER_MARGIN: Duration = Duration::from_secs(1);
const TRANSIENT_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum GovernorError {
    #[error("LLM request failed: {0}")]
    Provider(#[source] ProviderError),

    #[error("LLM request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: ProviderError,
    },
}

/// How a provider failure should be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Provider-side quota or rate limit; exponential backoff.
    Quota,
    /// Anything else; fixed short backoff until the budget runs out.
    Transient,
}

/// Tells quota errors apart from everything else.
///
/// Apart from HTTP 429, providers only expose quota exhaustion through error
/// text, so this is a case-insensitive substring match. Swap the markers per provider here;
/// the retry loop only sees `FailureKind`.
#[derive(Debug, Clone)]
pub struct QuotaClassifier {
    markers: Vec<String>,
}

impl Default for QuotaClassifier {
    fn default() -> Self {
        Self::with_markers(["rate limit", "quota", "resource_exhausted"])
    }
}

impl QuotaClassifier {
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.into().to_lowercase())
                .collect(),
        }
    }

    /// HTTP 429 is always a quota error, whatever its body says.
    pub fn classify(&self, error: &ProviderError) -> FailureKind {
        if let ProviderError::Api { status: 429, .. } = error {
            return FailureKind::Quota;
        }
        let text = error.to_string().to_lowercase();
        if self.markers.iter().any(|m| text.contains(m.as_str())) {
            FailureKind::Quota
        } else {
            FailureKind::Transient
        }
    }
}

/// Wraps a `ModelProvider` with the shared quota budget and retry policy.
/// Built once at startup and shared by analysis and rewrite.
pub struct RequestGovernor {
    provider: Arc<dyn ModelProvider>,
    limiter: Mutex<RateLimiter>,
    classifier: QuotaClassifier,
    max_retries: u32,
}

impl RequestGovernor {
    pub fn new(provider: Arc<dyn ModelProvider>, limiter: RateLimiter, max_retries: u32) -> Self {
        Self {
            provider,
            limiter: Mutex::new(limiter),
            classifier: QuotaClassifier::default(),
            max_retries: max_retries.max(1),
        }
    }

    pub fn with_classifier(mut self, classifier: QuotaClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Structured call: JSON-only system instruction, low temperature.
    pub async fn call(&self, prompt: &str) -> Result<String, GovernorError> {
        self.call_with(JSON_ONLY_SYSTEM, prompt, GenerationParams::STRUCTURED)
            .await
    }

    pub async fn call_with(
        &self,
        system: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, GovernorError> {
        let request = GenerationRequest {
            system,
            prompt,
            params,
        };
        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..self.max_retries {
            self.wait_for_slot().await;

            let error = match self.provider.generate(&request).await {
                Ok(text) => {
                    debug!(
                        "LLM call via {} succeeded on attempt {} ({} chars)",
                        self.provider.name(),
                        attempt + 1,
                        text.len()
                    );
                    return Ok(text);
                }
                Err(e) => e,
            };

            let is_last = attempt + 1 == self.max_retries;
            match self.classifier.classify(&error) {
                FailureKind::Quota => {
                    let delay = Duration::from_secs(1u64 << attempt.min(16));
                    warn!(
                        "LLM quota hit on attempt {}/{}: {}",
                        attempt + 1,
                        self.max_retries,
                        error
                    );
                    if !is_last {
                        info!("Backing off {}s before retrying", delay.as_secs());
                        sleep(delay).await;
                    }
                }
                FailureKind::Transient if is_last => {
                    return Err(GovernorError::Provider(error));
                }
                FailureKind::Transient => {
                    warn!(
                        "LLM call attempt {}/{} failed, retrying after {}ms: {}",
                        attempt + 1,
                        self.max_retries,
                        TRANSIENT_BACKOFF.as_millis(),
                        error
                    );
                    sleep(TRANSIENT_BACKOFF).await;
                }
            }
            last_error = Some(error);
        }

        Err(GovernorError::RetriesExhausted {
            attempts: self.max_retries,
            last: last_error.unwrap_or(ProviderError::EmptyContent),
        })
    }

    /// Blocks this task until the limiter has room, then reserves the slot.
    ///
    /// Check and record happen under one lock, so concurrent callers can
    /// never dispatch more than `quota` calls per window. The lock is
    /// released while sleeping and the window is re-checked on wake.
    async fn wait_for_slot(&self) {
        loop {
            let wait = {
                let mut limiter = self.limiter.lock().await;
                let now = Instant::now();
                let wait = limiter.time_until_allowed(now);
                if wait.is_zero() {
                    limiter.record(now);
                    return;
                }
                wait
            };

            let wait = wait + LIMITER_MARGIN;
            info!(
                "Rate limit window full; waiting {:.1}s before the next LLM call",
                wait.as_secs_f32()
            );
            sleep(wait).await;
        }
    }

    #[cfg(test)]
    pub async fn calls_in_window(&self) -> usize {
        self.limiter.lock().await.in_window(Instant::now())
    }
}
