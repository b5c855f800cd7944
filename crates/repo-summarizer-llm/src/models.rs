//! Per-call request option overrides, grounded on
//! `original_source/app/llm_gate/models.py::LlmRequestOptions`.

#[derive(Debug, Clone, Default)]
pub struct LlmRequestOptions {
    pub model_id: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub attempt_timeout_seconds: Option<f64>,
}
