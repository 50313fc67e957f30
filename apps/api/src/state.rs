use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::rewrite::renderer::DocumentRenderer;
use crate::rewrite::ResumeRewriter;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// `analyzer` and `rewriter` share one `RequestGovernor`, so both count
/// against the same per-minute quota.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub rewriter: Arc<ResumeRewriter>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub config: Config,
}
