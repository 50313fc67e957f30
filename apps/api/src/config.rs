use anyhow::{bail, Context, Result};

use crate::llm_client::governor::DEFAULT_MAX_RETRIES;
use crate::llm_client::rate_limiter::DEFAULT_QUOTA;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Anthropic,
}

impl ProviderKind {
    fn key_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Output format of `/api/v1/resumes/improve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
}

/// Application configuration loaded from environment variables.
/// Startup fails if the selected provider's API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub api_key: String,
    /// Overrides the provider's default model when set.
    pub model: Option<String>,
    pub rate_limit_per_minute: usize,
    pub max_retries: u32,
    pub max_upload_bytes: usize,
    pub document_format: DocumentFormat,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match lookup("LLM_PROVIDER")
            .unwrap_or_else(|| "gemini".to_string())
            .to_lowercase()
            .as_str()
        {
            "gemini" => ProviderKind::Gemini,
            "anthropic" => ProviderKind::Anthropic,
            other => bail!("LLM_PROVIDER must be 'gemini' or 'anthropic', got '{other}'"),
        };

        let document_format = match lookup("REWRITE_FORMAT")
            .unwrap_or_else(|| "pdf".to_string())
            .to_lowercase()
            .as_str()
        {
            "pdf" => DocumentFormat::Pdf,
            "text" | "txt" => DocumentFormat::Text,
            other => bail!("REWRITE_FORMAT must be 'pdf' or 'text', got '{other}'"),
        };

        let api_key = lookup(provider.key_var())
            .filter(|k| !k.trim().is_empty())
            .with_context(|| {
                format!(
                    "Required environment variable '{}' is not set",
                    provider.key_var()
                )
            })?;

        Ok(Config {
            provider,
            api_key,
            model: lookup("LLM_MODEL").filter(|m| !m.trim().is_empty()),
            rate_limit_per_minute: parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", DEFAULT_QUOTA)?,
            max_retries: parse_or(&lookup, "LLM_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            document_format,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
