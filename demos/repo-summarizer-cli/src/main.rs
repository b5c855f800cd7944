//! One-shot CLI runner for manual pipeline testing: summarizes a single
//! repository against the same runtime config and prompt contract the
//! HTTP edge uses, printing the result to stdout. Mirrors the teacher
//! stack's CLI-as-thin-host convention; not a replacement for the HTTP
//! edge in `repo-summarizer-api`.
//!
//! Usage: `repo-summarizer-cli <github_url> [--config path] [--ignore path] [--prompt path]`

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use repo_summarizer_core::config::{load_ignore_rules, RuntimeConfig};
use repo_summarizer_llm::parse_prompt_contract;
use repo_summarizer_orchestrator::Orchestrator;

struct Args {
    github_url: String,
    runtime_config_path: PathBuf,
    ignore_rules_path: PathBuf,
    prompt_contract_path: PathBuf,
    logs_dir: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut it = std::env::args().skip(1);
    let github_url = it.next().ok_or_else(|| anyhow!("usage: repo-summarizer-cli <github_url> [--config path] [--ignore path] [--prompt path]"))?;

    let mut runtime_config_path = PathBuf::from("config/runtime.json");
    let mut ignore_rules_path = PathBuf::from("config/non-informative-files.json");
    let mut prompt_contract_path = PathBuf::from("config/prompt_contract.md");
    let logs_dir = PathBuf::from("logs");

    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--config" => runtime_config_path = PathBuf::from(it.next().ok_or_else(|| anyhow!("--config requires a path"))?),
            "--ignore" => ignore_rules_path = PathBuf::from(it.next().ok_or_else(|| anyhow!("--ignore requires a path"))?),
            "--prompt" => prompt_contract_path = PathBuf::from(it.next().ok_or_else(|| anyhow!("--prompt requires a path"))?),
            other => return Err(anyhow!("unrecognized flag: {other}")),
        }
    }

    Ok(Args { github_url, runtime_config_path, ignore_rules_path, prompt_contract_path, logs_dir })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    ).init();

    let args = parse_args()?;

    let runtime_config = RuntimeConfig::load_from_path(&args.runtime_config_path)?;
    runtime_config
        .validate_startup()
        .map_err(|e| anyhow!("startup config validation failed: {e}"))?;
    let ignore = load_ignore_rules(&args.ignore_rules_path)?;

    let contract_raw = std::fs::read_to_string(&args.prompt_contract_path)
        .map_err(|e| anyhow!("cannot read prompt contract at {}: {e}", args.prompt_contract_path.display()))?;
    let contract = parse_prompt_contract(&contract_raw).map_err(|e| anyhow!("invalid prompt contract: {e}"))?;

    let code_host_token = std::env::var("GITHUB_TOKEN").ok().filter(|v| !v.trim().is_empty());
    let orchestrator = Orchestrator::new(runtime_config, ignore, code_host_token, contract)
        .map_err(|e| anyhow!("failed to build orchestrator: {e}"))?;

    let request_id = "cli-run";
    let result = orchestrator
        .summarize(&args.github_url, request_id, Path::new(&args.logs_dir))
        .await
        .map_err(|e| anyhow!("summarize failed: {e}"))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
