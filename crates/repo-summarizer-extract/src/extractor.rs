//! Repository Extractor: orchestrates the selector library and the remote
//! adapter under the multi-axis budgets from `GithubGateLimits`, producing
//! an in-memory `RepoSnapshot` and a warnings buffer.
//!
//! Grounded on `original_source/app/github_gate/client.py`'s
//! `get_documentation`, `get_tests`, `get_code`, `get_build_and_package_data`,
//! and the shared `_collect_files_from_tree_paths` guard loop.

use std::time::{Duration, Instant};

use repo_summarizer_core::config::{GithubGateConfig, IgnoreRules};
use repo_summarizer_core::diagnostics::{codes, Diagnostics};
use repo_summarizer_core::markdown::text::truncate_utf8_prefix;
use repo_summarizer_core::model::{
    DocumentationData, FileContent, ReadmeData, RepoMetadata, RepoRef, RepoSnapshot, TreeEntry,
    TreeEntryType,
};
use repo_summarizer_core::selectors;

use crate::adapter::RemoteAdapter;
use crate::error::{ExtractError, ExtractResult};

pub struct Extractor<'a> {
    adapter: &'a RemoteAdapter,
    cfg: &'a GithubGateConfig,
    ignore: &'a IgnoreRules,
}

impl<'a> Extractor<'a> {
    pub fn new(adapter: &'a RemoteAdapter, cfg: &'a GithubGateConfig, ignore: &'a IgnoreRules) -> Self {
        Self { adapter, cfg, ignore }
    }

    pub async fn extract(&self, repo: &RepoRef) -> ExtractResult<(RepoSnapshot, Diagnostics)> {
        let mut diags = Diagnostics::new();
        let total_deadline =
            Instant::now() + Duration::from_secs_f64(self.cfg.limits.max_total_fetch_duration_seconds);

        let metadata = self.adapter.get_repo_metadata(repo).await?;
        let default_branch = metadata.default_branch.clone();

        let tree = self.stage("tree", total_deadline, &mut diags, || {
            self.adapter.get_tree(repo, &default_branch)
        })
        .await
        .unwrap_or_default();

        let languages = self.stage("languages", total_deadline, &mut diags, || {
            self.adapter.get_languages(repo)
        })
        .await
        .unwrap_or_default();

        let readme = self
            .stage("readme", total_deadline, &mut diags, || self.adapter.get_readme(repo))
            .await
            .flatten()
            .map(|(path, content)| ReadmeData { file: FileContent::new(path, None, content) });

        let documentation = if Instant::now() > total_deadline {
            diags.push(codes::total_deadline_exceeded("documentation"));
            None
        } else {
            let stage_deadline =
                Instant::now() + Duration::from_secs_f64(self.cfg.limits.max_build_package_duration_seconds);
            Some(
                self.collect_documentation(repo, &default_branch, &tree, &metadata, stage_deadline, &mut diags)
                    .await,
            )
        };

        let build_and_package = if Instant::now() > total_deadline {
            diags.push(codes::total_deadline_exceeded("build_and_package_data"));
            Vec::new()
        } else {
            let stage_deadline =
                Instant::now() + Duration::from_secs_f64(self.cfg.limits.max_build_package_duration_seconds);
            let candidates = build_package_candidates(&tree, self.ignore);
            self.collect_category(
                repo,
                &default_branch,
                candidates,
                "build_and_package_data",
                self.cfg.limits.max_build_package_total_bytes,
                self.cfg.limits.max_build_package_files,
                stage_deadline,
                &mut diags,
            )
            .await
        };

        let tests = if Instant::now() > total_deadline {
            diags.push(codes::total_deadline_exceeded("tests"));
            Vec::new()
        } else {
            let stage_deadline = Instant::now() + Duration::from_secs_f64(self.cfg.limits.max_code_duration_seconds);
            let candidates = test_candidates(&tree, self.ignore);
            self.collect_category(
                repo,
                &default_branch,
                candidates,
                "tests",
                self.cfg.limits.max_tests_total_bytes,
                self.cfg.limits.max_code_files,
                stage_deadline,
                &mut diags,
            )
            .await
        };

        let code = if Instant::now() > total_deadline {
            diags.push(codes::total_deadline_exceeded("code"));
            Vec::new()
        } else {
            let stage_deadline = Instant::now() + Duration::from_secs_f64(self.cfg.limits.max_code_duration_seconds);
            let candidates = code_candidates(&tree, self.ignore, self.cfg.limits.max_code_depth);
            self.collect_category(
                repo,
                &default_branch,
                candidates,
                "code",
                self.cfg.limits.max_code_total_bytes,
                self.cfg.limits.max_code_files,
                stage_deadline,
                &mut diags,
            )
            .await
        };

        let snapshot = RepoSnapshot {
            metadata,
            languages: languages.into_iter().collect(),
            tree,
            readme,
            documentation,
            build_and_package,
            tests,
            code,
            requested: Default::default(),
        };

        Ok((snapshot, diags))
    }

    /// Runs a best-effort stage: on error, records a warning and yields
    /// `None` rather than aborting the whole extraction.
    async fn stage<T, F, Fut>(
        &self,
        name: &str,
        total_deadline: Instant,
        diags: &mut Diagnostics,
        op: F,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ExtractResult<T>>,
    {
        if Instant::now() > total_deadline {
            diags.push(codes::total_deadline_exceeded(name));
            return None;
        }
        match op().await {
            Ok(v) => Some(v),
            Err(e) => {
                diags.push(codes::skipped_file(name, &e.to_string()));
                None
            }
        }
    }

    async fn collect_documentation(
        &self,
        repo: &RepoRef,
        default_branch: &str,
        tree: &[TreeEntry],
        metadata: &RepoMetadata,
        stage_deadline: Instant,
        diags: &mut Diagnostics,
    ) -> DocumentationData {
        let mut files = Vec::new();
        let mut remaining_budget = self.cfg.limits.max_docs_total_bytes;

        if let Some(homepage) = metadata.homepage.clone() {
            let per_file_cap = self.cfg.limits.max_single_file_bytes.min(remaining_budget);
            if per_file_cap == 0 {
                diags.push(codes::max_bytes_reached("documentation"));
            } else {
                match self.adapter.http_get_bytes(&homepage).await {
                    Ok(bytes) => {
                        if bytes.contains(&0u8) {
                            diags.push(codes::binary_content_rejected(&homepage));
                        } else {
                            let text = String::from_utf8_lossy(&bytes).to_string();
                            let (kept, truncated) = if text.len() as u64 > per_file_cap {
                                (truncate_utf8_prefix(&text, per_file_cap as usize), true)
                            } else {
                                (text.clone(), false)
                            };
                            if truncated {
                                diags.push(codes::truncated_file("about-homepage", text.len(), kept.len()));
                            }
                            remaining_budget = remaining_budget.saturating_sub(kept.len() as u64);
                            files.push(FileContent::new("about-homepage", Some(homepage), kept));
                        }
                    }
                    Err(e) => diags.push(codes::homepage_fetch_failed(&homepage, &e.to_string())),
                }
            }
        }

        let candidates = doc_candidates(tree, self.ignore);
        let collected = self
            .collect_category(
                repo,
                default_branch,
                candidates,
                "documentation",
                remaining_budget,
                u32::MAX,
                stage_deadline,
                diags,
            )
            .await;
        files.extend(collected);
        DocumentationData { files }
    }

    /// The shared guard loop behind every category: per-category total
    /// byte cap, per-category file-count cap, per-stage wall-clock
    /// deadline, per-file byte cap — evaluated in that order per
    /// candidate, matching `_collect_files_from_tree_paths`.
    async fn collect_category(
        &self,
        repo: &RepoRef,
        default_branch: &str,
        candidates: Vec<TreeEntry>,
        category: &'static str,
        max_total_bytes: u64,
        max_files: u32,
        stage_deadline: Instant,
        diags: &mut Diagnostics,
    ) -> Vec<FileContent> {
        let mut out = Vec::new();
        let mut total_bytes: u64 = 0;

        for entry in candidates {
            if Instant::now() > stage_deadline {
                diags.push(codes::stage_deadline_exceeded(category));
                break;
            }
            if out.len() as u32 >= max_files {
                diags.push(codes::max_files_reached(category, max_files));
                break;
            }
            if total_bytes >= max_total_bytes {
                diags.push(codes::max_bytes_reached(category));
                break;
            }
            if entry.size_bytes > self.cfg.limits.max_single_file_bytes {
                diags.push(codes::skipped_file(&entry.path, "exceeds per-file byte cap (tree-reported size)"));
                continue;
            }

            let content = match self.adapter.get_file_content(repo, &entry.path, default_branch).await {
                Ok(c) => c,
                Err(ExtractError::ResponseShape { message }) if message.contains("binary") => {
                    diags.push(codes::binary_content_rejected(&entry.path));
                    continue;
                }
                Err(e) => {
                    diags.push(codes::skipped_file(&entry.path, &e.to_string()));
                    continue;
                }
            };

            let mut byte_size = content.len() as u64;
            let mut final_content = content;
            if byte_size > self.cfg.limits.max_single_file_bytes {
                let kept = truncate_utf8_prefix(&final_content, self.cfg.limits.max_single_file_bytes as usize);
                diags.push(codes::truncated_file(&entry.path, final_content.len(), kept.len()));
                byte_size = kept.len() as u64;
                final_content = kept;
            }

            let remaining = max_total_bytes.saturating_sub(total_bytes);
            if byte_size > remaining {
                if remaining == 0 {
                    diags.push(codes::max_bytes_reached(category));
                    break;
                }
                let kept = truncate_utf8_prefix(&final_content, remaining as usize);
                diags.push(codes::truncated_file(&entry.path, final_content.len(), kept.len()));
                byte_size = kept.len() as u64;
                final_content = kept;
                out.push(FileContent::new(
                    entry.path.clone(),
                    entry.download_url.clone(),
                    final_content,
                ));
                total_bytes += byte_size;
                diags.push(codes::max_bytes_reached(category));
                break;
            }

            out.push(FileContent::new(entry.path.clone(), entry.download_url.clone(), final_content));
            total_bytes += byte_size;
        }

        out
    }
}

fn doc_candidates(tree: &[TreeEntry], ignore: &IgnoreRules) -> Vec<TreeEntry> {
    let mut candidates: Vec<TreeEntry> = tree
        .iter()
        .filter(|e| {
            e.entry_type == TreeEntryType::Blob
                && !ignore.is_ignored(&e.path)
                && selectors::is_likely_text_path(&e.path)
                && selectors::looks_like_doc_path(&e.path)
        })
        .cloned()
        .collect();
    let mut paths: Vec<String> = candidates.iter().map(|e| e.path.clone()).collect();
    selectors::sorted_bfs(&mut paths);
    reorder_by(&mut candidates, &paths);
    candidates
}

fn test_candidates(tree: &[TreeEntry], ignore: &IgnoreRules) -> Vec<TreeEntry> {
    let mut candidates: Vec<TreeEntry> = tree
        .iter()
        .filter(|e| {
            e.entry_type == TreeEntryType::Blob
                && !ignore.is_ignored(&e.path)
                && selectors::is_likely_text_path(&e.path)
                && selectors::looks_like_test_path(&e.path)
        })
        .cloned()
        .collect();
    let mut paths: Vec<String> = candidates.iter().map(|e| e.path.clone()).collect();
    selectors::sorted_bfs(&mut paths);
    reorder_by(&mut candidates, &paths);
    candidates
}

fn build_package_candidates(tree: &[TreeEntry], ignore: &IgnoreRules) -> Vec<TreeEntry> {
    let mut candidates: Vec<TreeEntry> = tree
        .iter()
        .filter(|e| {
            e.entry_type == TreeEntryType::Blob
                && !ignore.is_ignored(&e.path)
                && selectors::looks_like_build_package_path(&e.path)
                && !(e.path.rsplit('/').next().unwrap_or("").eq_ignore_ascii_case("makefile")
                    && e.path_depth() > 1)
        })
        .cloned()
        .collect();
    candidates.sort_by(|a, b| {
        a.path_depth()
            .cmp(&b.path_depth())
            .then_with(|| {
                let a_signal = selectors::is_high_signal_build_package_filename(&a.path);
                let b_signal = selectors::is_high_signal_build_package_filename(&b.path);
                b_signal.cmp(&a_signal)
            })
            .then_with(|| a.path.to_ascii_lowercase().cmp(&b.path.to_ascii_lowercase()))
    });
    candidates
}

fn code_candidates(tree: &[TreeEntry], ignore: &IgnoreRules, max_depth: u32) -> Vec<TreeEntry> {
    let mut candidates: Vec<TreeEntry> = tree
        .iter()
        .filter(|e| {
            e.entry_type == TreeEntryType::Blob
                && !ignore.is_ignored(&e.path)
                && selectors::is_likely_text_path(&e.path)
                && !selectors::looks_like_doc_path(&e.path)
                && !selectors::looks_like_test_path(&e.path)
                && (e.path_depth() as u32) <= max_depth
        })
        .cloned()
        .collect();

    let mut paths: Vec<String> = candidates.iter().map(|e| e.path.clone()).collect();
    selectors::sorted_bfs(&mut paths);
    reorder_by(&mut candidates, &paths);

    let (mut entrypoints, mut rest): (Vec<TreeEntry>, Vec<TreeEntry>) = candidates
        .into_iter()
        .partition(|e| selectors::looks_like_entrypoint(&e.path));
    entrypoints.append(&mut rest);
    entrypoints
}

fn reorder_by(entries: &mut Vec<TreeEntry>, order: &[String]) {
    let mut by_path: std::collections::HashMap<String, TreeEntry> =
        entries.drain(..).map(|e| (e.path.clone(), e)).collect();
    for path in order {
        if let Some(entry) = by_path.remove(path) {
            entries.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            entry_type: TreeEntryType::Blob,
            size_bytes: 10,
            api_url: None,
            download_url: None,
        }
    }

    #[test]
    fn build_package_orders_makefile_depth_one_but_excludes_deeper() {
        let tree = vec![entry("Makefile"), entry("sub/Makefile"), entry("Cargo.toml")];
        let ignore = IgnoreRules::default();
        let candidates = build_package_candidates(&tree, &ignore);
        let paths: Vec<&str> = candidates.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"Makefile"));
        assert!(!paths.contains(&"sub/Makefile"));
        assert_eq!(paths[0], "Cargo.toml");
    }

    #[test]
    fn code_candidates_prepend_entrypoints() {
        let tree = vec![entry("src/helpers.rs"), entry("src/main.rs")];
        let ignore = IgnoreRules::default();
        let candidates = code_candidates(&tree, &ignore, 4);
        assert_eq!(candidates[0].path, "src/main.rs");
    }

    #[test]
    fn doc_candidates_exclude_non_doc_paths() {
        let tree = vec![entry("README.md"), entry("src/main.rs")];
        let ignore = IgnoreRules::default();
        let candidates = doc_candidates(&tree, &ignore);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, "README.md");
    }
}
