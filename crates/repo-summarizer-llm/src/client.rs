//! LLM gateway: builds the chat-completions payload, calls the provider
//! with retry, extracts and normalizes the response.
//!
//! Grounded on `original_source/app/llm_gate/client.py::LlmGate` (`summarize`,
//! `_post_chat_completions`, `_extract_output_json`, `_extract_status`).

use std::time::Duration;

use regex::Regex;
use repo_summarizer_core::config::LlmGateConfig;
use repo_summarizer_core::markdown::parse_repo_digest_markdown;
use repo_summarizer_core::model::SummaryResult;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::error::{LlmError, LlmResult};
use crate::models::LlmRequestOptions;
use crate::normalize::normalize_and_validate;
use crate::prompt_loader::{render_user_prompt, PromptContract};
use crate::retry::run_with_retry;

const NON_RETRYABLE_STATUSES: [u16; 4] = [400, 401, 403, 404];

pub struct LlmGateway {
    client: reqwest::Client,
    cfg: LlmGateConfig,
    contract: PromptContract,
}

impl LlmGateway {
    pub fn new(cfg: LlmGateConfig, contract: PromptContract) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs_f64(cfg.connect_timeout_seconds))
            .timeout(Duration::from_secs_f64(cfg.read_timeout_seconds))
            .user_agent("repo-summarizer")
            .build()
            .map_err(|e| LlmError::config(format!("failed to build http client: {e}")))?;
        Ok(Self { client, cfg, contract })
    }

    pub async fn summarize(
        &self,
        processed_markdown: &str,
        options: &LlmRequestOptions,
    ) -> LlmResult<SummaryResult> {
        let api_key = std::env::var("NEBIUS_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| LlmError::config("NEBIUS_API_KEY must be set and non-blank"))?;

        let digest = parse_repo_digest_markdown(processed_markdown).map_err(|e| LlmError::digest_parse(e.to_string()))?;
        let user_prompt = render_user_prompt(&self.contract.user_prompt_template, &digest);

        let model_id = options.model_id.clone().unwrap_or_else(|| self.cfg.model_id.clone());
        let temperature = options.temperature.unwrap_or(self.cfg.temperature);
        let top_p = options.top_p.unwrap_or(self.cfg.top_p);
        let max_output_tokens = options.max_output_tokens.unwrap_or(self.cfg.max_output_tokens);
        let attempt_timeout_seconds = options.attempt_timeout_seconds.unwrap_or(self.cfg.attempt_timeout_seconds);

        let payload = json!({
            "model": model_id,
            "temperature": temperature,
            "top_p": top_p,
            "max_tokens": max_output_tokens,
            "stream": false,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "repo_summary",
                    "schema": self.contract.json_schema,
                    "strict": true,
                }
            },
            "messages": [
                {"role": "system", "content": self.contract.system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });

        let url = format!("{}/chat/completions", self.cfg.base_url);
        let body = run_with_retry(&self.cfg, attempt_timeout_seconds, || async {
            let resp = self
                .client
                .post(&url)
                .bearer_auth(&api_key)
                .json(&payload)
                .send()
                .await
                .map_err(map_reqwest_error)?;
            classify_response(resp).await
        })
        .await?;

        let raw_output = extract_output_json(&body)?;
        normalize_and_validate(&raw_output)
    }
}

fn extract_output_json(body: &Value) -> LlmResult<Value> {
    let content = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .ok_or_else(|| LlmError::output_validation("response missing choices[0].message.content"))?;

    let text = match content {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| {
                let is_output_text = part.get("type").and_then(Value::as_str) == Some("output_text");
                let text_field = part.get("text").and_then(Value::as_str);
                if is_output_text || text_field.is_some() {
                    text_field.map(str::to_string)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => return Err(LlmError::output_validation("message.content had an unsupported shape")),
    };

    serde_json::from_str(&text).map_err(|e| LlmError::output_validation(format!("model output was not valid JSON: {e}")))
}

fn map_reqwest_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::timeout(e.to_string())
    } else {
        LlmError::upstream(e.to_string(), e.status().map(|s| s.as_u16()))
    }
}

async fn classify_response(resp: reqwest::Response) -> LlmResult<Value> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<Value>()
            .await
            .map_err(|e| LlmError::output_validation(format!("invalid json body: {e}")));
    }
    let text = resp.text().await.unwrap_or_default();
    if status == StatusCode::BAD_REQUEST {
        if let Some((context_tokens, input_tokens)) = parse_context_overflow(&text) {
            return Err(LlmError::ContextOverflow {
                message: text,
                context_tokens: Some(context_tokens),
                input_tokens: Some(input_tokens),
            });
        }
    }
    Err(classify_status(status, &text))
}

fn classify_status(status: StatusCode, message: &str) -> LlmError {
    let code = status.as_u16();
    if NON_RETRYABLE_STATUSES.contains(&code) {
        return LlmError::upstream(format!("{code}: {message}"), Some(code));
    }
    if matches!(code, 429 | 502 | 503 | 504) {
        return if code == 429 {
            LlmError::rate_limited(format!("{code}: {message}"))
        } else {
            LlmError::upstream(format!("{code}: {message}"), Some(code))
        };
    }
    LlmError::upstream(format!("{code}: {message}"), Some(code))
}

/// Parses `maximum context length is <N> tokens ... request has <M> input
/// tokens` out of a provider error message, for the orchestrator's
/// adaptive retry. Grounded on `SPEC_FULL.md` §4.8.
pub fn parse_context_overflow(message: &str) -> Option<(u64, u64)> {
    let re = Regex::new(r"(?is)maximum context length is (\d+) tokens.*?request has (\d+) input tokens").ok()?;
    let caps = re.captures(message)?;
    let context_tokens: u64 = caps.get(1)?.as_str().parse().ok()?;
    let input_tokens: u64 = caps.get(2)?.as_str().parse().ok()?;
    Some((context_tokens, input_tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_context_overflow_message() {
        let msg = "This model's maximum context length is 1000 tokens. However, your request has 2000 input tokens.";
        let (n, m) = parse_context_overflow(msg).unwrap();
        assert_eq!(n, 1000);
        assert_eq!(m, 2000);
    }

    #[test]
    fn returns_none_for_unrelated_message() {
        assert!(parse_context_overflow("internal server error").is_none());
    }

    #[test]
    fn extracts_string_content() {
        let body = json!({"choices": [{"message": {"content": "{\"summary\":\"s\",\"structure\":\"st\",\"technologies\":[]}"}}]});
        let out = extract_output_json(&body).unwrap();
        assert_eq!(out["summary"], "s");
    }

    #[test]
    fn extracts_list_of_parts_content() {
        let body = json!({"choices": [{"message": {"content": [
            {"type": "output_text", "text": "{\"summary\":\"s\","},
            {"type": "output_text", "text": "\"structure\":\"st\",\"technologies\":[]}"}
        ]}}]});
        let out = extract_output_json(&body).unwrap();
        assert_eq!(out["summary"], "s");
    }
}
