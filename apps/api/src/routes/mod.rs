pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::rewrite::handlers as rewrite;
use crate::state::AppState;

/// Room for multipart boundaries and the job description on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analysis", post(analysis::handle_analyze_upload))
        .route("/api/v1/analysis/text", post(analysis::handle_analyze_text))
        .route("/api/v1/analysis/cache", get(analysis::handle_cache_stats))
        // Rewrite API
        .route("/api/v1/resumes/improve", post(rewrite::handle_improve))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
