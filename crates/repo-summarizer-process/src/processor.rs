//! Context-budget processor: fast path, baseline reservation with
//! readme-then-tree shrink, largest-remainder weighted allocation for
//! optional categories, and category-aware truncation.
//!
//! Grounded on `original_source/app/repo_processor/processor.py::process_markdown`
//! and the helpers it calls (`_body_budget`, `_truncate_for_field`,
//! `_build_processed`).

use std::collections::BTreeMap;

use repo_summarizer_core::markdown::digest::render_skeleton;
use repo_summarizer_core::markdown::text::{truncate_file_blocks, truncate_text, utf8_len};
use repo_summarizer_core::markdown::{parse_extraction_markdown, render_processed_markdown};
use repo_summarizer_core::model::{CategoryBytes, ExtractedRepoMarkdown, ProcessedRepoMarkdown};

use crate::allocator::allocate_optional_bytes;
use crate::bookkeeper::ContextWindowLimitBookkeeper;
use crate::error::{ProcessError, ProcessResult};

pub use repo_summarizer_core::config::RepoProcessorConfig;

fn field(opt: &Option<String>) -> String {
    opt.clone().unwrap_or_default()
}

pub fn process_markdown(
    extraction_markdown: &str,
    cfg: &RepoProcessorConfig,
    model_context_window_tokens: u64,
) -> ProcessResult<ProcessedRepoMarkdown> {
    let extracted: ExtractedRepoMarkdown =
        parse_extraction_markdown(extraction_markdown).map_err(|e| ProcessError::parse(e.to_string()))?;

    let bookkeeper = ContextWindowLimitBookkeeper {
        model_context_window_tokens,
        max_repo_data_ratio_in_prompt: cfg.max_repo_data_ratio_in_prompt,
        bytes_per_token_estimate: cfg.bytes_per_token_estimate,
    };
    let max_repo_bytes = bookkeeper.max_repo_bytes();
    let input_total_utf8_bytes = utf8_len(extraction_markdown);

    let mut repository_metadata = field(&extracted.repository_metadata);
    let mut language_stats = field(&extracted.language_stats);
    let mut directory_tree = field(&extracted.directory_tree);
    let mut readme = field(&extracted.readme);
    let documentation_full = field(&extracted.documentation);
    let tests_full = field(&extracted.tests);
    let build_full = field(&extracted.build_and_package_data);
    let code_full = field(&extracted.code);

    let mut notes: Vec<String> = Vec::new();

    // Fast path: everything fits as-is.
    let candidate = ProcessedRepoMarkdown {
        repository_metadata: repository_metadata.clone(),
        language_stats: language_stats.clone(),
        directory_tree: directory_tree.clone(),
        readme: readme.clone(),
        documentation: documentation_full.clone(),
        build_and_package_data: build_full.clone(),
        tests: tests_full.clone(),
        code: code_full.clone(),
        ..ProcessedRepoMarkdown::default()
    };
    let candidate_rendered = render_processed_markdown(&candidate);
    if utf8_len(&candidate_rendered) <= max_repo_bytes {
        return Ok(finalize(
            candidate,
            input_total_utf8_bytes,
            max_repo_bytes,
            cfg.bytes_per_token_estimate,
            notes,
            &bookkeeper,
        ));
    }

    let skeleton_len = utf8_len(&render_skeleton());
    let body_budget = max_repo_bytes.saturating_sub(skeleton_len);

    let mut baseline_total =
        utf8_len(&repository_metadata) + utf8_len(&language_stats) + utf8_len(&directory_tree) + utf8_len(&readme);

    if baseline_total > body_budget {
        let others = utf8_len(&repository_metadata) + utf8_len(&language_stats) + utf8_len(&directory_tree);
        let readme_allowance = body_budget.saturating_sub(others);
        let (shrunk, truncated) = truncate_text(&readme, readme_allowance);
        if truncated {
            notes.push(format!(
                "readme: {} -> {} bytes (prefix truncation)",
                readme.len(),
                shrunk.len()
            ));
        }
        readme = shrunk;
        baseline_total =
            utf8_len(&repository_metadata) + utf8_len(&language_stats) + utf8_len(&directory_tree) + utf8_len(&readme);

        if baseline_total > body_budget {
            let others2 = utf8_len(&repository_metadata) + utf8_len(&language_stats) + utf8_len(&readme);
            let tree_allowance = body_budget.saturating_sub(others2);
            let (shrunk_tree, tree_truncated) = truncate_text(&directory_tree, tree_allowance);
            if tree_truncated {
                notes.push(format!(
                    "directory_tree: {} -> {} bytes (prefix truncation)",
                    directory_tree.len(),
                    shrunk_tree.len()
                ));
            }
            directory_tree = shrunk_tree;
            baseline_total = utf8_len(&repository_metadata)
                + utf8_len(&language_stats)
                + utf8_len(&directory_tree)
                + utf8_len(&readme);

            if baseline_total > body_budget {
                return Err(ProcessError::budget(
                    format!(
                        "baseline sections ({baseline_total} bytes) cannot fit the body budget ({body_budget} bytes) \
                         even after shrinking readme and directory_tree; repository_metadata and language_stats are \
                         never truncated"
                    ),
                    None,
                ));
            }
        }
    }

    let remaining_budget = body_budget.saturating_sub(baseline_total);

    let mut content_sizes: BTreeMap<&str, usize> = BTreeMap::new();
    content_sizes.insert("documentation", utf8_len(&documentation_full));
    content_sizes.insert("tests", utf8_len(&tests_full));
    content_sizes.insert("build_and_package_data", utf8_len(&build_full));
    content_sizes.insert("code", utf8_len(&code_full));

    let targets = allocate_optional_bytes(remaining_budget, &cfg.weight_map(), &content_sizes);

    let (documentation, doc_truncated) = truncate_file_blocks(&documentation_full, targets["documentation"]);
    let (tests, tests_truncated) = truncate_file_blocks(&tests_full, targets["tests"]);
    let (build_and_package_data, build_truncated) =
        truncate_file_blocks(&build_full, targets["build_and_package_data"]);
    let (code, code_truncated) = truncate_file_blocks(&code_full, targets["code"]);

    for (name, original, target, truncated) in [
        ("documentation", documentation_full.len(), documentation.len(), doc_truncated),
        ("tests", tests_full.len(), tests.len(), tests_truncated),
        ("build_and_package_data", build_full.len(), build_and_package_data.len(), build_truncated),
        ("code", code_full.len(), code.len(), code_truncated),
    ] {
        if truncated {
            notes.push(format!("{name}: {original} -> {target} bytes (file-block truncation)"));
        }
    }

    let processed = ProcessedRepoMarkdown {
        repository_metadata,
        language_stats,
        directory_tree,
        readme,
        documentation,
        build_and_package_data,
        tests,
        code,
        ..ProcessedRepoMarkdown::default()
    };

    let finalized = finalize(
        processed,
        input_total_utf8_bytes,
        max_repo_bytes,
        cfg.bytes_per_token_estimate,
        notes,
        &bookkeeper,
    );

    if finalized.output_total_utf8_bytes > max_repo_bytes {
        return Err(ProcessError::budget(
            format!(
                "processed output ({} bytes) still exceeds the repo-data budget ({} bytes) after allocation",
                finalized.output_total_utf8_bytes, max_repo_bytes
            ),
            Some(finalized),
        ));
    }

    Ok(finalized)
}

fn finalize(
    mut processed: ProcessedRepoMarkdown,
    input_total_utf8_bytes: usize,
    max_repo_bytes: usize,
    bytes_per_token_estimate: f64,
    notes: Vec<String>,
    bookkeeper: &ContextWindowLimitBookkeeper,
) -> ProcessedRepoMarkdown {
    let rendered = render_processed_markdown(&processed);
    let output_total_utf8_bytes = utf8_len(&rendered);

    processed.input_total_utf8_bytes = input_total_utf8_bytes;
    processed.output_total_utf8_bytes = output_total_utf8_bytes;
    processed.max_repo_data_size_for_prompt_bytes = max_repo_bytes;
    processed.estimated_input_tokens = bookkeeper.estimated_tokens(input_total_utf8_bytes);
    processed.estimated_output_tokens = bookkeeper.estimated_tokens(output_total_utf8_bytes);
    processed.bytes_per_token_estimate = bytes_per_token_estimate;
    processed.per_category_bytes = CategoryBytes {
        documentation: processed.documentation.len(),
        tests: processed.tests.len(),
        build_and_package_data: processed.build_and_package_data.len(),
        code: processed.code.len(),
    };
    processed.truncation_notes = notes;
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_summarizer_core::markdown::render_extraction_markdown;
    use repo_summarizer_core::model::{FileContent, RepoMetadata, RepoSnapshot};

    fn snapshot_with_large_code(code_files: usize) -> RepoSnapshot {
        let mut snapshot = RepoSnapshot::default();
        snapshot.metadata = RepoMetadata {
            owner: "acme".into(),
            repo: "widgets".into(),
            default_branch: "main".into(),
            description: Some("d".into()),
            topics: vec![],
            homepage: None,
        };
        snapshot.readme = Some(repo_summarizer_core::model::ReadmeData {
            file: FileContent::new("README.md", None, "hello world".repeat(5)),
        });
        snapshot.code = (0..code_files)
            .map(|i| FileContent::new(format!("src/file{i}.rs"), None, "fn x() {}\n".repeat(200)))
            .collect();
        snapshot
    }

    #[test]
    fn fast_path_returns_full_digest_when_budget_is_generous() {
        let snapshot = snapshot_with_large_code(1);
        let extraction = render_extraction_markdown(&snapshot, &[]);
        let cfg = RepoProcessorConfig::default();
        let processed = process_markdown(&extraction, &cfg, 1_000_000).unwrap();
        assert!(processed.code.contains("fn x()"));
        assert_eq!(processed.truncation_notes.len(), 0);
    }

    #[test]
    fn small_budget_forces_allocation_and_truncation() {
        let snapshot = snapshot_with_large_code(5);
        let extraction = render_extraction_markdown(&snapshot, &[]);
        let cfg = RepoProcessorConfig::default();
        let processed = process_markdown(&extraction, &cfg, 200).unwrap();
        assert!(processed.output_total_utf8_bytes <= processed.max_repo_data_size_for_prompt_bytes);
    }

    #[test]
    fn impossible_budget_raises_budget_error() {
        let snapshot = snapshot_with_large_code(1);
        let extraction = render_extraction_markdown(&snapshot, &[]);
        let cfg = RepoProcessorConfig::default();
        let result = process_markdown(&extraction, &cfg, 1);
        assert!(result.is_err());
    }
}
