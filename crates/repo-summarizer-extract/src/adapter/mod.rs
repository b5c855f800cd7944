//! Remote adapter: authenticated-or-anonymous HTTP calls to the code host.
//!
//! Grounded on `original_source/app/github_gate/client.py`'s `GithubGate`
//! class (`verify_repo_access`, `get_repo_metadata`, `get_languages`,
//! `get_tree`, `get_readme`, `get_file_content`, `_http_get_bytes`,
//! `_extract_status`, `_is_rate_limit_signal`, `_decode_github_base64`).
//! No ambient authority: every call takes an explicit `reqwest::Client` and
//! `GithubGateConfig`, matching the capability-injection idiom in
//! `signia_plugins::context::PluginContext`.

pub mod retry;
pub mod tree_shape;

use std::sync::Mutex;
use std::time::Duration;

use repo_summarizer_core::config::GithubGateConfig;
use repo_summarizer_core::model::{RepoMetadata, RepoRef, TreeEntry, TreeEntryType};
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{ExtractError, ExtractResult};
use retry::run_with_retry;

const NON_RETRYABLE_STATUSES: [u16; 2] = [400, 401];

pub struct RemoteAdapter {
    client: reqwest::Client,
    cfg: GithubGateConfig,
    token: Option<String>,
    metadata_cache: Mutex<Option<RepoMetadata>>,
}

impl RemoteAdapter {
    pub fn new(cfg: GithubGateConfig, token: Option<String>) -> ExtractResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs_f64(cfg.connect_timeout_seconds))
            .timeout(Duration::from_secs_f64(cfg.read_timeout_seconds))
            .user_agent("repo-summarizer")
            .build()
            .map_err(|e| ExtractError::upstream(format!("failed to build http client: {e}"), None))?;
        Ok(Self {
            client,
            cfg,
            token,
            metadata_cache: Mutex::new(None),
        })
    }

    fn auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(t) if !t.is_empty() => builder.bearer_auth(t),
            _ => builder,
        }
    }

    async fn get_json(&self, url: &str) -> ExtractResult<Value> {
        run_with_retry(&self.cfg, || async {
            let resp = self
                .auth(self.client.get(url))
                .send()
                .await
                .map_err(map_reqwest_error)?;
            classify_response(resp).await
        })
        .await
    }

    pub async fn verify_repo_access(&self, repo: &RepoRef) -> ExtractResult<()> {
        let url = format!("{}/repos/{}/{}", self.cfg.api_base_url, repo.owner, repo.repo);
        let body = self.get_json(&url).await?;
        if body.get("private").and_then(Value::as_bool).unwrap_or(false) {
            return Err(ExtractError::repository_inaccessible("repository is private"));
        }
        Ok(())
    }

    pub async fn get_repo_metadata(&self, repo: &RepoRef) -> ExtractResult<RepoMetadata> {
        if let Some(cached) = self.metadata_cache.lock().unwrap().clone() {
            return Ok(cached);
        }
        let url = format!("{}/repos/{}/{}", self.cfg.api_base_url, repo.owner, repo.repo);
        let body = self.get_json(&url).await?;
        let metadata = RepoMetadata {
            owner: repo.owner.clone(),
            repo: repo.repo.clone(),
            default_branch: body
                .get("default_branch")
                .and_then(Value::as_str)
                .unwrap_or("main")
                .to_string(),
            description: body.get("description").and_then(Value::as_str).map(str::to_string),
            topics: body
                .get("topics")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
            homepage: body
                .get("homepage")
                .and_then(Value::as_str)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
        };
        *self.metadata_cache.lock().unwrap() = Some(metadata.clone());
        Ok(metadata)
    }

    pub async fn get_languages(&self, repo: &RepoRef) -> ExtractResult<Vec<(String, u64)>> {
        let url = format!("{}/repos/{}/{}/languages", self.cfg.api_base_url, repo.owner, repo.repo);
        let body = self.get_json(&url).await?;
        let Value::Object(map) = body else {
            return Err(ExtractError::response_shape("languages response was not an object"));
        };
        Ok(map
            .into_iter()
            .map(|(k, v)| (k, v.as_u64().unwrap_or(0)))
            .collect())
    }

    pub async fn get_tree(&self, repo: &RepoRef, default_branch: &str) -> ExtractResult<Vec<TreeEntry>> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.cfg.api_base_url, repo.owner, repo.repo, default_branch
        );
        let body = self.get_json(&url).await?;
        let items = tree_shape::extract_tree_items(&body)?;
        Ok(items
            .iter()
            .filter_map(|item| {
                let path = item.get("path").and_then(Value::as_str)?.to_string();
                let entry_type = match item.get("type").and_then(Value::as_str) {
                    Some("blob") => TreeEntryType::Blob,
                    Some("tree") => TreeEntryType::Tree,
                    _ => return None,
                };
                let download_url = matches!(entry_type, TreeEntryType::Blob).then(|| {
                    format!(
                        "{}/{}/{}/{}/{}",
                        self.cfg.raw_content_base_url, repo.owner, repo.repo, default_branch, path
                    )
                });
                Some(TreeEntry {
                    size_bytes: tree_shape::tree_entry_size(item),
                    api_url: item.get("url").and_then(Value::as_str).map(str::to_string),
                    download_url,
                    path,
                    entry_type,
                })
            })
            .collect())
    }

    pub async fn get_readme(&self, repo: &RepoRef) -> ExtractResult<Option<(String, String)>> {
        let url = format!("{}/repos/{}/{}/readme", self.cfg.api_base_url, repo.owner, repo.repo);
        match self.get_json(&url).await {
            Ok(body) => {
                let path = body.get("path").and_then(Value::as_str).unwrap_or("README.md").to_string();
                let content = decode_content_field(&body)?;
                Ok(Some((path, content)))
            }
            Err(ExtractError::RepositoryInaccessible { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_file_content(&self, repo: &RepoRef, path: &str, default_branch: &str) -> ExtractResult<String> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.cfg.api_base_url, repo.owner, repo.repo, path, default_branch
        );
        let body = self.get_json(&url).await?;
        decode_content_field(&body)
    }

    pub async fn http_get_bytes(&self, url: &str) -> ExtractResult<Vec<u8>> {
        run_with_retry(&self.cfg, || async {
            let resp = self.client.get(url).send().await.map_err(map_reqwest_error)?;
            let status = resp.status();
            if !status.is_success() {
                return Err(classify_status(status, ""));
            }
            resp.bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(map_reqwest_error)
        })
        .await
    }
}

fn decode_content_field(body: &Value) -> ExtractResult<String> {
    let encoded = body
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| ExtractError::response_shape("content field missing from response"))?;
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    use base64::Engine;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| ExtractError::response_shape(format!("invalid base64 content: {e}")))?;
    if decoded.contains(&0u8) {
        return Err(ExtractError::response_shape("content looked binary (contains NUL byte)"));
    }
    Ok(String::from_utf8_lossy(&decoded).to_string())
}

fn map_reqwest_error(e: reqwest::Error) -> ExtractError {
    if e.is_timeout() {
        ExtractError::timeout(e.to_string())
    } else {
        ExtractError::upstream(e.to_string(), e.status().map(|s| s.as_u16()))
    }
}

async fn classify_response(resp: reqwest::Response) -> ExtractResult<Value> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<Value>()
            .await
            .map_err(|e| ExtractError::response_shape(format!("invalid json body: {e}")));
    }
    let text = resp.text().await.unwrap_or_default();
    Err(classify_status(status, &text))
}

fn classify_status(status: StatusCode, message: &str) -> ExtractError {
    let code = status.as_u16();
    if code == 404 {
        return ExtractError::repository_inaccessible(format!("404 not found: {message}"));
    }
    if code == 403 {
        return if is_rate_limit_signal(message) {
            ExtractError::rate_limited(format!("403 rate limited: {message}"))
        } else {
            ExtractError::repository_inaccessible(format!("403 forbidden: {message}"))
        };
    }
    if NON_RETRYABLE_STATUSES.contains(&code) {
        return ExtractError::upstream(format!("{code}: {message}"), Some(code));
    }
    ExtractError::upstream(format!("{code}: {message}"), Some(code))
}

fn is_rate_limit_signal(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("rate limit") || lower.contains("abuse detection")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_signal_detection() {
        assert!(is_rate_limit_signal("API rate limit exceeded"));
        assert!(!is_rate_limit_signal("forbidden resource"));
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, ""),
            ExtractError::RepositoryInaccessible { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ExtractError::Upstream { status: Some(429), .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "rate limit exceeded"),
            ExtractError::RateLimited { .. }
        ));
    }
}
