/// LLM Client: the single point of entry for all model calls in the critic.
///
/// ARCHITECTURAL RULE: No other module may talk to a model provider directly.
/// Analysis and rewrite both go through `RequestGovernor`, which owns the
/// shared quota, the retry policy and the provider handle.
use async_trait::async_trait;
use thiserror::Error;

pub mod anthropic;
pub mod gemini;
pub mod governor;
pub mod prompts;
pub mod rate_limiter;
pub mod recovery;

pub use governor::{GovernorError, RequestGovernor};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response blocked by provider: {0}")]
    Blocked(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    /// Low temperature: structured critique favours determinism over creativity.
    pub const STRUCTURED: GenerationParams = GenerationParams {
        temperature: 0.2,
        top_p: 0.8,
        max_output_tokens: 4096,
    };

    /// Rewrites get a little more room to rephrase.
    pub const REWRITE: GenerationParams = GenerationParams {
        temperature: 0.4,
        top_p: 0.9,
        max_output_tokens: 8192,
    };
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::STRUCTURED
    }
}

/// One outbound model request: system instruction, user prompt, sampling params.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub params: GenerationParams,
}

/// A model backend. Implementations perform exactly one HTTP round trip per
/// call; retries and throttling live in `RequestGovernor`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider and model identifier, for logs.
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, ProviderError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted provider used by governor, analysis, rewrite and router tests.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedProvider {
        pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        /// Each reply takes `delay` of (tokio) time to arrive.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn replying(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    pub fn api_error(status: u16, message: &str) -> ProviderError {
        ProviderError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            request: &GenerationRequest<'_>,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyContent))
        }
    }
}
