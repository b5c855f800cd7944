//! Off-thread-deadline retry loop, grounded on
//! `original_source/app/github_gate/client.py::_run_with_retry`/`_retry_sleep`.
//!
//! The original gives each attempt a true wall-clock deadline by running it
//! in a worker thread and calling `future.result(timeout=...)`. The async
//! equivalent is `tokio::time::timeout` wrapping the attempt's future: the
//! in-flight request is dropped (not merely ignored) once the deadline
//! passes.

use std::time::Duration;

use repo_summarizer_core::config::GithubGateConfig;

use crate::error::ExtractError;

/// Deterministic per-attempt backoff indexed by `min(attempt - 1, len - 1)`,
/// plus additive jitter in `[0, 150ms)`. The jitter source is the attempt
/// index itself (no RNG dependency needed at this scale): it varies the
/// sleep without requiring a crate this codebase doesn't otherwise need.
fn backoff_duration(attempt: u32, schedule: &[f64]) -> Duration {
    let idx = ((attempt.saturating_sub(1)) as usize).min(schedule.len().saturating_sub(1));
    let base = schedule.get(idx).copied().unwrap_or(0.5);
    let jitter = ((attempt as u64 * 37) % 150) as f64 / 1000.0;
    Duration::from_secs_f64((base + jitter).max(0.0))
}

pub async fn run_with_retry<T, F, Fut>(cfg: &GithubGateConfig, mut op: F) -> Result<T, ExtractError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ExtractError>>,
{
    let attempt_timeout = Duration::from_secs_f64(cfg.attempt_timeout_seconds);
    let mut last_err: Option<ExtractError> = None;

    for attempt in 1..=(cfg.max_retries + 1) {
        let result = tokio::time::timeout(attempt_timeout, op()).await;
        match result {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => {
                if !err.is_retryable() {
                    return Err(err);
                }
                last_err = Some(err);
            }
            Err(_elapsed) => {
                last_err = Some(ExtractError::timeout(format!(
                    "attempt {attempt} exceeded {:.1}s",
                    cfg.attempt_timeout_seconds
                )));
            }
        }
        if attempt <= cfg.max_retries {
            tokio::time::sleep(backoff_duration(attempt, &cfg.retry_backoff_seconds)).await;
        }
    }

    Err(last_err.unwrap_or_else(|| ExtractError::upstream("retry loop exhausted with no error", None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn succeeds_without_retry() {
        let cfg = GithubGateConfig::default();
        let result: Result<u32, ExtractError> = run_with_retry(&cfg, || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn terminal_error_does_not_retry() {
        let cfg = GithubGateConfig::default();
        let mut calls = 0;
        let result: Result<u32, ExtractError> = run_with_retry(&cfg, || {
            calls += 1;
            async { Err(ExtractError::repository_inaccessible("404")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn retryable_error_retries_up_to_max() {
        let mut cfg = GithubGateConfig::default();
        cfg.max_retries = 2;
        cfg.retry_backoff_seconds = vec![0.0, 0.0];
        let mut calls = 0;
        let result: Result<u32, ExtractError> = run_with_retry(&cfg, || {
            calls += 1;
            async { Err(ExtractError::rate_limited("429")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
