//! Summarization Orchestrator: sequences the URL parser, extractor,
//! markdown renderer, context-budget processor, and LLM gateway into one
//! request pipeline, with adaptive retry on context-window overflow.
//!
//! Grounded on `original_source/app/orchestrator.py::summarize_repository`.

#![forbid(unsafe_code)]

pub mod debug_log;
pub mod error;

use repo_summarizer_core::config::RuntimeConfig;
use repo_summarizer_core::markdown::render_extraction_markdown;
use repo_summarizer_core::model::{RepoRef, SummaryResult};
use repo_summarizer_extract::{parse_repo_url, Extractor, RemoteAdapter};
use repo_summarizer_llm::{LlmGateway, LlmRequestOptions};
use repo_summarizer_process::process_markdown;

use debug_log::DebugLog;
use error::{OrchestratorError, OrchestratorResult};

const MIN_RATIO: f64 = 0.05;
const SHRINK_FACTOR: f64 = 0.90;

pub struct Orchestrator {
    adapter: RemoteAdapter,
    gateway: LlmGateway,
    config: RuntimeConfig,
    ignore: repo_summarizer_core::config::IgnoreRules,
}

impl Orchestrator {
    pub fn new(
        config: RuntimeConfig,
        ignore: repo_summarizer_core::config::IgnoreRules,
        code_host_token: Option<String>,
        contract: repo_summarizer_llm::PromptContract,
    ) -> OrchestratorResult<Self> {
        let adapter = RemoteAdapter::new(config.github_gate.clone(), code_host_token)
            .map_err(OrchestratorError::from)?;
        let gateway = LlmGateway::new(config.llm_gate.clone(), contract)
            .map_err(OrchestratorError::from)?;
        Ok(Self { adapter, gateway, config, ignore })
    }

    pub async fn summarize(&self, github_url: &str, request_id: &str, logs_dir: &std::path::Path) -> OrchestratorResult<SummaryResult> {
        let repo = parse_repo_url(github_url, &self.config.github_gate.code_host_hostname)?;
        let mut log = DebugLog::new(repo.clone(), request_id);
        log.record(format!("github_url={github_url} repo={}/{}", repo.owner, repo.repo));

        let result = self.run_pipeline(&repo, &mut log).await;
        log.flush(logs_dir);
        result
    }

    async fn run_pipeline(&self, repo: &RepoRef, log: &mut DebugLog) -> OrchestratorResult<SummaryResult> {
        self.adapter.verify_repo_access(repo).await?;

        let extractor = Extractor::new(&self.adapter, &self.config.github_gate, &self.ignore);
        let (snapshot, diagnostics) = extractor.extract(repo).await?;
        let warning_lines = diagnostics.lines();
        for line in &warning_lines {
            log.record(line.clone());
        }
        log.record(format!("warnings={}", diagnostics.count()));

        let extraction_markdown = render_extraction_markdown(&snapshot, &warning_lines);
        log.record(format!("extraction_markdown_bytes={}", extraction_markdown.len()));

        let mut ratio = self.config.repo_processor.max_repo_data_ratio_in_prompt;
        let digest_markdown = self.process_with_fallback(&extraction_markdown, ratio, log)?;

        let first_attempt = self.gateway.summarize(&digest_markdown, &LlmRequestOptions::default()).await;

        match first_attempt {
            Ok(result) => Ok(result),
            Err(repo_summarizer_llm::LlmError::ContextOverflow { context_tokens: Some(n), input_tokens: Some(m), .. }) => {
                let scale_by_ratio = ratio * (n as f64 * SHRINK_FACTOR / m as f64);
                let shrunk = (ratio * SHRINK_FACTOR).min(scale_by_ratio);
                ratio = shrunk.clamp(MIN_RATIO, ratio);
                log.record(format!("context_overflow: context_tokens={n} input_tokens={m} retry_ratio={ratio:.4}"));

                let retried_digest = self.process_with_fallback(&extraction_markdown, ratio, log)?;
                let second_attempt = self.gateway.summarize(&retried_digest, &LlmRequestOptions::default()).await;
                second_attempt.map_err(OrchestratorError::from)
            }
            Err(other) => Err(OrchestratorError::from(other)),
        }
    }

    /// Processes the extraction markdown at the given ratio, falling back
    /// to the carried partial result (or the raw extraction markdown) when
    /// the budget cannot be met — see `DESIGN.md` decision 3.
    fn process_with_fallback(&self, extraction_markdown: &str, ratio: f64, log: &mut DebugLog) -> OrchestratorResult<String> {
        let mut cfg = self.config.repo_processor.clone();
        cfg.max_repo_data_ratio_in_prompt = ratio;

        match process_markdown(extraction_markdown, &cfg, self.config.llm_gate.model_context_window_tokens) {
            Ok(processed) => {
                log.record(format!(
                    "processed: output_bytes={} estimated_input_tokens={} truncation_notes={}",
                    processed.output_total_utf8_bytes,
                    processed.estimated_input_tokens,
                    processed.truncation_notes.len()
                ));
                Ok(repo_summarizer_core::markdown::render_processed_markdown(&processed))
            }
            Err(repo_summarizer_process::ProcessError::Budget { message, processed: Some(partial) }) => {
                log.record(format!("budget error (carrying partial result): {message}"));
                Ok(repo_summarizer_core::markdown::render_processed_markdown(&partial))
            }
            Err(repo_summarizer_process::ProcessError::Budget { message, processed: None }) => {
                log.record(format!("budget error (falling back to raw extraction markdown): {message}"));
                Ok(extraction_markdown.to_string())
            }
            Err(other) => Err(OrchestratorError::from(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_retry_ratio_is_clamped_and_shrinks() {
        let current = 0.65;
        let n = 1000u64;
        let m = 2000u64;
        let scale_by_ratio = current * (n as f64 * SHRINK_FACTOR / m as f64);
        let shrunk = (current * SHRINK_FACTOR).min(scale_by_ratio);
        let clamped = shrunk.clamp(MIN_RATIO, current);
        assert!(clamped < current);
        assert!(clamped >= MIN_RATIO);
    }

    #[test]
    fn adaptive_retry_never_increases_ratio() {
        let current = 0.10;
        let n = 900u64;
        let m = 910u64;
        let scale_by_ratio = current * (n as f64 * SHRINK_FACTOR / m as f64);
        let shrunk = (current * SHRINK_FACTOR).min(scale_by_ratio);
        let clamped = shrunk.clamp(MIN_RATIO, current);
        assert!(clamped <= current);
    }
}
