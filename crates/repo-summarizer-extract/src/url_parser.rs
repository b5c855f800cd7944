//! Accepts only `https://<host>/<owner>/<repo>` root URLs, where `<host>`
//! matches the configured code-host hostname (case-insensitive). Grounded
//! on `original_source/app/github_gate/client.py::parse_repo_url`.

use repo_summarizer_core::model::RepoRef;
use url::Url;

use crate::error::{ExtractError, ExtractResult};

pub fn parse_repo_url(raw: &str, expected_hostname: &str) -> ExtractResult<RepoRef> {
    if raw.trim().is_empty() {
        return Err(ExtractError::invalid_url("URL must not be empty"));
    }
    let parsed = Url::parse(raw).map_err(|e| ExtractError::invalid_url(format!("{e}")))?;
    if parsed.scheme() != "https" {
        return Err(ExtractError::invalid_url("only https URLs are accepted"));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| ExtractError::invalid_url("URL must have a host"))?;
    if !host.eq_ignore_ascii_case(expected_hostname) {
        return Err(ExtractError::invalid_url(format!(
            "unexpected host '{host}', expected '{expected_hostname}'"
        )));
    }
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    if segments.len() != 2 {
        return Err(ExtractError::invalid_url(
            "URL must have exactly two path segments: owner and repo",
        ));
    }
    let owner = segments[0];
    let repo = segments[1].trim_end_matches(".git");
    RepoRef::new(owner, repo).ok_or_else(|| ExtractError::invalid_url("owner and repo must be non-empty"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_url() {
        let r = parse_repo_url("https://github.com/acme/widgets", "github.com").unwrap();
        assert_eq!(r.owner, "acme");
        assert_eq!(r.repo, "widgets");
    }

    #[test]
    fn rejects_non_https_scheme() {
        assert!(parse_repo_url("http://github.com/acme/widgets", "github.com").is_err());
    }

    #[test]
    fn rejects_wrong_host() {
        assert!(parse_repo_url("https://gitlab.com/acme/widgets", "github.com").is_err());
    }

    #[test]
    fn rejects_extra_path_segments() {
        assert!(parse_repo_url("https://github.com/acme/widgets/tree/main", "github.com").is_err());
    }

    #[test]
    fn rejects_missing_repo() {
        assert!(parse_repo_url("https://github.com/acme", "github.com").is_err());
    }

    #[test]
    fn strips_dot_git_suffix() {
        let r = parse_repo_url("https://github.com/acme/widgets.git", "github.com").unwrap();
        assert_eq!(r.repo, "widgets");
    }

    #[test]
    fn rejects_empty_url() {
        assert!(parse_repo_url("", "github.com").is_err());
    }
}
