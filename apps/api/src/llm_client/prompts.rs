// Shared system instructions for model calls.
// Feature-specific prompt templates live next to the feature (analysis/prompts.rs).

/// System instruction for every structured call. Providers do not guarantee
/// structure anyway; `recovery::recover_json` handles what slips through.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System instruction for free-text resume rewrites.
pub const PLAIN_TEXT_SYSTEM: &str = "You are an expert resume writer. \
    Respond with the resume text only, using plain section headers. \
    Do NOT add commentary before or after the resume. \
    Do NOT invent employers, dates, degrees, or metrics.";
