mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod rewrite;
mod routes;
mod state;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::Analyzer;
use crate::config::{Config, DocumentFormat, ProviderKind};
use crate::llm_client::anthropic::AnthropicClient;
use crate::llm_client::gemini::GeminiClient;
use crate::llm_client::governor::QuotaClassifier;
use crate::llm_client::rate_limiter::RateLimiter;
use crate::llm_client::{ModelProvider, RequestGovernor};
use crate::rewrite::pdf::PdfRenderer;
use crate::rewrite::renderer::{DocumentRenderer, PlainTextRenderer};
use crate::rewrite::ResumeRewriter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing provider key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Critic API v{}", env!("CARGO_PKG_VERSION"));

    let provider = build_provider(&config)?;
    info!("LLM provider initialized ({})", provider.name());

    // One governor for every model call, so analysis and rewrites share the quota
    let limiter = RateLimiter::new(config.rate_limit_per_minute);
    info!(
        "Request governor: {} calls/min, {} attempts per call",
        limiter.quota(),
        config.max_retries
    );
    let governor = Arc::new(
        RequestGovernor::new(provider, limiter, config.max_retries)
            .with_classifier(quota_classifier(config.provider)),
    );

    let state = AppState {
        analyzer: Arc::new(Analyzer::new(governor.clone())),
        rewriter: Arc::new(ResumeRewriter::new(governor)),
        renderer: build_renderer(config.document_format),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_provider(config: &Config) -> Result<Arc<dyn ModelProvider>> {
    let provider: Arc<dyn ModelProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiClient::new(
            config.api_key.clone(),
            config.model.clone(),
        )?),
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(
            config.api_key.clone(),
            config.model.clone(),
        )?),
    };
    Ok(provider)
}

fn build_renderer(format: DocumentFormat) -> Arc<dyn DocumentRenderer> {
    match format {
        DocumentFormat::Pdf => Arc::new(PdfRenderer),
        DocumentFormat::Text => Arc::new(PlainTextRenderer),
    }
}

/// Anthropic reports throttling as `rate_limit_error` and `overloaded_error`.
fn quota_classifier(provider: ProviderKind) -> QuotaClassifier {
    match provider {
        ProviderKind::Gemini => QuotaClassifier::default(),
        ProviderKind::Anthropic => {
            QuotaClassifier::with_markers(["rate limit", "rate_limit", "quota", "overloaded"])
        }
    }
}
