//! Retry loop mirroring `repo_summarizer_extract::adapter::retry`, tailored
//! to the LLM gateway's own status set. Grounded on
//! `original_source/app/llm_gate/client.py::_call_with_retry`.

use std::time::Duration;

use repo_summarizer_core::config::LlmGateConfig;

use crate::error::LlmError;

fn backoff_duration(attempt: u32, schedule: &[f64]) -> Duration {
    let idx = ((attempt.saturating_sub(1)) as usize).min(schedule.len().saturating_sub(1));
    let base = schedule.get(idx).copied().unwrap_or(0.5);
    let jitter = ((attempt as u64 * 41) % 150) as f64 / 1000.0;
    Duration::from_secs_f64((base + jitter).max(0.0))
}

pub async fn run_with_retry<T, F, Fut>(cfg: &LlmGateConfig, attempt_timeout_seconds: f64, mut op: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LlmError>>,
{
    let attempt_timeout = Duration::from_secs_f64(attempt_timeout_seconds);
    let mut last_err: Option<LlmError> = None;

    for attempt in 1..=(cfg.max_retries + 1) {
        match tokio::time::timeout(attempt_timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => {
                if !err.is_retryable() {
                    return Err(err);
                }
                last_err = Some(err);
            }
            Err(_elapsed) => {
                last_err = Some(LlmError::timeout(format!(
                    "attempt {attempt} exceeded {attempt_timeout_seconds:.1}s"
                )));
            }
        }
        if attempt <= cfg.max_retries {
            tokio::time::sleep(backoff_duration(attempt, &cfg.retry_backoff_seconds)).await;
        }
    }

    Err(last_err.unwrap_or_else(|| LlmError::upstream("retry loop exhausted with no error", None)))
}
