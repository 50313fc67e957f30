// Resume analysis: prompt construction, governed LLM call, JSON recovery,
// degraded fallback, normalization and result caching.
// All LLM calls go through llm_client::RequestGovernor.

pub mod analyzer;
pub mod cache;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod prompts;

pub use analyzer::Analyzer;
