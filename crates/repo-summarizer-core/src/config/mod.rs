//! Configuration structs, JSON loading, and startup validation.
//!
//! Loaded once at process startup from `config/runtime.json` (sections
//! `github_gate`, `llm_gate`, `repo_processor`) and
//! `config/non-informative-files.json` (ignore rules), matching the
//! original's two-file layout. Held behind `Arc` by callers and passed
//! explicitly — no globals, matching `signia-api::config`'s `AppConfig`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Per-category and per-file byte/time/count budgets for the repository
/// extractor. Defaults recovered from
/// `original_source/app/github_gate/models.py::GithubGateLimits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubGateLimits {
    pub max_docs_total_bytes: u64,
    pub max_tests_total_bytes: u64,
    pub max_code_total_bytes: u64,
    pub max_build_package_total_bytes: u64,
    pub max_single_file_bytes: u64,
    pub max_build_package_files: u32,
    pub max_code_files: u32,
    pub max_build_package_depth: u32,
    pub max_code_depth: u32,
    pub max_build_package_duration_seconds: f64,
    pub max_code_duration_seconds: f64,
    pub max_total_fetch_duration_seconds: f64,
}

impl Default for GithubGateLimits {
    fn default() -> Self {
        Self {
            max_docs_total_bytes: 250_000,
            max_tests_total_bytes: 250_000,
            max_code_total_bytes: 400_000,
            max_build_package_total_bytes: 200_000,
            max_single_file_bytes: 100_000,
            max_build_package_files: 80,
            max_code_files: 120,
            max_build_package_depth: 2,
            max_code_depth: 4,
            max_build_package_duration_seconds: 30.0,
            max_code_duration_seconds: 45.0,
            max_total_fetch_duration_seconds: 120.0,
        }
    }
}

impl GithubGateLimits {
    /// Only the five byte-cap fields are validated in the original
    /// (`config_validator.py`); everything else is trusted as given.
    pub fn validate(&self) -> CoreResult<()> {
        let fields: [(&str, u64); 5] = [
            ("max_docs_total_bytes", self.max_docs_total_bytes),
            ("max_tests_total_bytes", self.max_tests_total_bytes),
            ("max_code_total_bytes", self.max_code_total_bytes),
            (
                "max_build_package_total_bytes",
                self.max_build_package_total_bytes,
            ),
            ("max_single_file_bytes", self.max_single_file_bytes),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(CoreError::config(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

/// Request-level timeout/retry knobs for the code-host adapter, distinct
/// from the per-category `GithubGateLimits`. The original hardcodes these
/// in `GithubGate.__init__` rather than loading them from config; this
/// version exposes them as an optional config section defaulting to the
/// original's hardcoded values (see `DESIGN.md` decision 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubGateConfig {
    pub connect_timeout_seconds: f64,
    pub read_timeout_seconds: f64,
    pub attempt_timeout_seconds: f64,
    pub max_retries: u32,
    pub retry_backoff_seconds: Vec<f64>,
    pub limits: GithubGateLimits,
    pub code_host_hostname: String,
    pub api_base_url: String,
    pub raw_content_base_url: String,
}

impl Default for GithubGateConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 2.0,
            read_timeout_seconds: 8.0,
            attempt_timeout_seconds: 10.0,
            max_retries: 2,
            retry_backoff_seconds: vec![0.5, 1.0],
            limits: GithubGateLimits::default(),
            code_host_hostname: "github.com".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            raw_content_base_url: "https://raw.githubusercontent.com".to_string(),
        }
    }
}

/// Defaults recovered from `original_source/app/llm_gate/models.py::LlmGateConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmGateConfig {
    pub model_id: String,
    pub model_context_window_tokens: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: f64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_seconds: f64,
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_seconds: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_seconds: Vec<f64>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_temperature() -> f64 {
    0.1
}
fn default_top_p() -> f64 {
    1.0
}
fn default_max_output_tokens() -> u32 {
    2000
}
fn default_connect_timeout() -> f64 {
    2.0
}
fn default_read_timeout() -> f64 {
    45.0
}
fn default_attempt_timeout() -> f64 {
    50.0
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff() -> Vec<f64> {
    vec![0.5, 1.0]
}
fn default_base_url() -> String {
    "https://api.studio.nebius.ai/v1".to_string()
}

impl LlmGateConfig {
    /// Applies `NEBIUS_MODEL_ID`/`NEBIUS_BASE_URL` overrides if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model_id) = std::env::var("NEBIUS_MODEL_ID") {
            if !model_id.trim().is_empty() {
                self.model_id = model_id;
            }
        }
        if let Ok(base_url) = std::env::var("NEBIUS_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.base_url = base_url;
            }
        }
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.model_id.trim().is_empty() {
            return Err(CoreError::config("llm_gate.model_id must not be empty"));
        }
        if self.model_context_window_tokens == 0 {
            return Err(CoreError::config(
                "llm_gate.model_context_window_tokens must be positive",
            ));
        }
        Ok(())
    }
}

/// Defaults recovered from `original_source/app/repo_processor/models.py::RepoProcessorConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoProcessorConfig {
    pub max_repo_data_ratio_in_prompt: f64,
    pub bytes_per_token_estimate: f64,
    pub documentation_weight: f64,
    pub tests_weight: f64,
    pub build_package_weight: f64,
    pub code_weight: f64,
}

impl Default for RepoProcessorConfig {
    fn default() -> Self {
        Self {
            max_repo_data_ratio_in_prompt: 0.65,
            bytes_per_token_estimate: 4.0,
            documentation_weight: 0.40,
            tests_weight: 0.20,
            build_package_weight: 0.20,
            code_weight: 0.20,
        }
    }
}

impl RepoProcessorConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..1.0).contains(&self.max_repo_data_ratio_in_prompt)
            || self.max_repo_data_ratio_in_prompt <= 0.0
        {
            return Err(CoreError::config(
                "repo_processor.max_repo_data_ratio_in_prompt must be in (0, 1)",
            ));
        }
        if self.bytes_per_token_estimate <= 0.0 {
            return Err(CoreError::config(
                "repo_processor.bytes_per_token_estimate must be positive",
            ));
        }
        let weights = [
            self.documentation_weight,
            self.tests_weight,
            self.build_package_weight,
            self.code_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(CoreError::config("repo_processor weights must be >= 0"));
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(CoreError::config(
                "repo_processor weights must have at least one positive entry",
            ));
        }
        Ok(())
    }

    /// Returns `(name, weight)` pairs in the fixed category order used by
    /// the allocator.
    pub fn weight_map(&self) -> [(&'static str, f64); 4] {
        [
            ("documentation", self.documentation_weight),
            ("tests", self.tests_weight),
            ("build_and_package_data", self.build_package_weight),
            ("code", self.code_weight),
        ]
    }
}

/// Case-insensitive ignore rules loaded from `config/non-informative-files.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreRules {
    pub directories: Vec<String>,
    pub extensions: Vec<String>,
    pub filenames: Vec<String>,
    pub globs: Vec<String>,
    pub path_contains: Vec<String>,
}

impl IgnoreRules {
    pub fn is_ignored(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        let segments: Vec<&str> = lower.split('/').collect();
        if let Some((_, filename)) = lower.rsplit_once('/') {
            if self.filenames.iter().any(|f| f.to_ascii_lowercase() == filename) {
                return true;
            }
        } else if self
            .filenames
            .iter()
            .any(|f| f.to_ascii_lowercase() == lower)
        {
            return true;
        }
        if self
            .directories
            .iter()
            .any(|d| segments.contains(&d.to_ascii_lowercase().as_str()))
        {
            return true;
        }
        if self
            .extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext.trim_start_matches('.').to_ascii_lowercase())))
        {
            return true;
        }
        if self
            .path_contains
            .iter()
            .any(|needle| lower.contains(&needle.to_ascii_lowercase()))
        {
            return true;
        }
        self.globs.iter().any(|g| glob_match(&g.to_ascii_lowercase(), &lower))
    }
}

/// Minimal `*`/`?` glob matcher, no external crate needed for this scale.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn inner(p: &[u8], t: &[u8]) -> bool {
        match (p.first(), t.first()) {
            (None, None) => true,
            (Some(b'*'), _) => inner(&p[1..], t) || (!t.is_empty() && inner(p, &t[1..])),
            (Some(b'?'), Some(_)) => inner(&p[1..], &t[1..]),
            (Some(pc), Some(tc)) if pc == tc => inner(&p[1..], &t[1..]),
            _ => false,
        }
    }
    inner(pattern.as_bytes(), text.as_bytes())
}

/// The three `config/runtime.json` sections, held together as the single
/// configuration object passed around the service after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub github_gate: GithubGateConfig,
    pub llm_gate: LlmGateConfig,
    pub repo_processor: RepoProcessorConfig,
}

impl RuntimeConfig {
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| CoreError::config(format!("invalid config/runtime.json: {e}")))
    }

    pub fn load_from_path(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::config(format!("cannot read {}: {e}", path.display())))?;
        let mut cfg = Self::from_json_str(&raw)?;
        cfg.llm_gate = cfg.llm_gate.with_env_overrides();
        Ok(cfg)
    }

    /// Mirrors `config_validator.py::ConfigValidator.validate_startup`:
    /// validates every section and the required secret, failing fast
    /// before the HTTP listener binds.
    pub fn validate_startup(&self) -> CoreResult<()> {
        self.llm_gate.validate()?;
        self.repo_processor.validate()?;
        self.github_gate.limits.validate()?;
        match std::env::var("NEBIUS_API_KEY") {
            Ok(v) if !v.trim().is_empty() => Ok(()),
            _ => Err(CoreError::config("NEBIUS_API_KEY must be set and non-blank")),
        }
    }
}

pub fn load_ignore_rules(path: &Path) -> CoreResult<IgnoreRules> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CoreError::config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| CoreError::config(format!("invalid config/non-informative-files.json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_gate_limits_default_matches_original() {
        let l = GithubGateLimits::default();
        assert_eq!(l.max_docs_total_bytes, 250_000);
        assert_eq!(l.max_code_total_bytes, 400_000);
        assert_eq!(l.max_build_package_depth, 2);
    }

    #[test]
    fn repo_processor_config_rejects_all_zero_weights() {
        let cfg = RepoProcessorConfig {
            documentation_weight: 0.0,
            tests_weight: 0.0,
            build_package_weight: 0.0,
            code_weight: 0.0,
            ..RepoProcessorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn llm_gate_config_env_override() {
        std::env::set_var("NEBIUS_MODEL_ID", "override-model");
        let cfg = LlmGateConfig {
            model_id: "base".to_string(),
            model_context_window_tokens: 8192,
            temperature: 0.1,
            top_p: 1.0,
            max_output_tokens: 2000,
            connect_timeout_seconds: 2.0,
            read_timeout_seconds: 45.0,
            attempt_timeout_seconds: 50.0,
            max_retries: 2,
            retry_backoff_seconds: vec![0.5, 1.0],
            base_url: "https://example.invalid".to_string(),
        }
        .with_env_overrides();
        assert_eq!(cfg.model_id, "override-model");
        std::env::remove_var("NEBIUS_MODEL_ID");
    }

    #[test]
    fn ignore_rules_match_directory_and_extension() {
        let rules = IgnoreRules {
            directories: vec!["node_modules".into()],
            extensions: vec!["lock".into()],
            ..IgnoreRules::default()
        };
        assert!(rules.is_ignored("node_modules/foo/bar.js"));
        assert!(rules.is_ignored("Cargo.lock"));
        assert!(!rules.is_ignored("src/main.rs"));
    }

    #[test]
    fn glob_rule_matches() {
        let rules = IgnoreRules {
            globs: vec!["*.min.js".into()],
            ..IgnoreRules::default()
        };
        assert!(rules.is_ignored("dist/app.min.js"));
        assert!(!rules.is_ignored("dist/app.js"));
    }
}
