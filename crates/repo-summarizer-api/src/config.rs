//! Process-level config: where to find `config/runtime.json` and
//! `config/non-informative-files.json`, listen address, and telemetry
//! format. Grounded on `signia-api::config::AppConfig`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub listen_addr: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default = "AppConfig::default_runtime_config_path")]
    pub runtime_config_path: String,
    #[serde(default = "AppConfig::default_ignore_rules_path")]
    pub ignore_rules_path: String,
    #[serde(default = "AppConfig::default_prompt_contract_path")]
    pub prompt_contract_path: String,
    #[serde(default = "AppConfig::default_logs_dir")]
    pub logs_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            telemetry: TelemetryConfig::default(),
            runtime_config_path: Self::default_runtime_config_path(),
            ignore_rules_path: Self::default_ignore_rules_path(),
            prompt_contract_path: Self::default_prompt_contract_path(),
            logs_dir: Self::default_logs_dir(),
        }
    }
}

impl AppConfig {
    fn default_runtime_config_path() -> String {
        "config/runtime.json".to_string()
    }
    fn default_ignore_rules_path() -> String {
        "config/non-informative-files.json".to_string()
    }
    fn default_prompt_contract_path() -> String {
        "config/prompt_contract.md".to_string()
    }
    fn default_logs_dir() -> String {
        "logs".to_string()
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.logs_dir)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "TelemetryConfig::default_format")]
    pub format: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { format: Self::default_format(), json: false }
    }
}

impl TelemetryConfig {
    fn default_format() -> String {
        "pretty".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Args {
    pub config: Option<String>,
}

impl Args {
    pub fn parse() -> Self {
        let mut config: Option<String> = None;
        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            if arg == "--config" {
                config = it.next();
            }
        }
        Self { config }
    }
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let mut cfg = match path {
        None => AppConfig::default(),
        Some(p) => {
            let raw = fs::read_to_string(Path::new(p))?;
            let mut cfg: AppConfig =
                serde_json::from_str(&raw).map_err(|e| anyhow!("invalid config json: {e}"))?;
            if cfg.listen_addr.trim().is_empty() {
                cfg.listen_addr = AppConfig::default().listen_addr;
            }
            cfg
        }
    };
    if let Ok(bind_addr) = std::env::var("REPO_SUMMARIZER_BIND_ADDR") {
        if !bind_addr.trim().is_empty() {
            cfg.listen_addr = bind_addr;
        }
    }
    Ok(cfg)
}
