//! Shared, request-scoped-immutable app state. Grounded on
//! `signia-api::state::AppState`.

use std::sync::Arc;

use anyhow::Result;
use repo_summarizer_core::config::{IgnoreRules, RuntimeConfig};
use repo_summarizer_llm::{parse_prompt_contract, PromptContract};
use repo_summarizer_orchestrator::Orchestrator;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<AppConfig>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(cfg: AppConfig, runtime_config: RuntimeConfig, ignore: IgnoreRules) -> Result<Self> {
        let contract = load_prompt_contract(&cfg.prompt_contract_path)?;
        let code_host_token = std::env::var("GITHUB_TOKEN").ok().filter(|v| !v.trim().is_empty());
        let orchestrator = Orchestrator::new(runtime_config, ignore, code_host_token, contract)
            .map_err(|e| anyhow::anyhow!("failed to build orchestrator: {e}"))?;
        Ok(Self { cfg: Arc::new(cfg), orchestrator: Arc::new(orchestrator) })
    }
}

fn load_prompt_contract(path: &str) -> Result<PromptContract> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read prompt contract at {path}: {e}"))?;
    parse_prompt_contract(&raw).map_err(|e| anyhow::anyhow!("invalid prompt contract at {path}: {e}"))
}
