//! Eight-section processed markdown: the format the context-budget
//! processor writes and the LLM gateway reads to build its prompt.
//!
//! Grounded on `original_source/app/repo_processor/parser.py`
//! (`render_processed_markdown`, `OUTPUT_SECTIONS`) and
//! `original_source/app/llm_gate/markdown_parser.py`
//! (`parse_repo_digest_markdown`, `_known_boundaries`) — two independent
//! implementations of the same fence-aware boundary-scan idiom in the
//! original, unified here as one codec shared by both callers.

use crate::error::{CoreError, CoreResult};
use crate::markdown::fence::{known_section_boundaries, slice_sections};
use crate::model::ProcessedRepoMarkdown;
use serde::{Deserialize, Serialize};

const NOT_FOUND: &str = "Not found";

pub const HEADINGS: [&str; 8] = [
    "# Repository Metadata",
    "# Language Stats",
    "# Directory Tree",
    "# README",
    "# Documentation",
    "# Build and Package Data",
    "# Tests",
    "# Code",
];

/// The typed view the LLM gateway renders its user prompt from. Every
/// field is a plain string (never optional) — an absent section renders
/// as an empty string, matching `RepoDigest` in the original.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoDigest {
    pub repository_metadata: String,
    pub language_stats: String,
    pub directory_tree: String,
    pub readme: String,
    pub documentation: String,
    pub build_and_package_data: String,
    pub tests: String,
    pub code: String,
}

/// The exact rendered layout with every body left empty — used by the
/// processor to reserve bytes for headers and separators before budgeting
/// the actual section contents. Mirrors the literal multi-line constant
/// the original keeps for the same purpose.
pub fn render_skeleton() -> String {
    HEADINGS
        .iter()
        .map(|header| format!("{header}\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n"
}

pub fn render_processed_markdown(processed: &ProcessedRepoMarkdown) -> String {
    let sections: [(&str, &str); 8] = [
        (HEADINGS[0], &processed.repository_metadata),
        (HEADINGS[1], &processed.language_stats),
        (HEADINGS[2], &processed.directory_tree),
        (HEADINGS[3], &processed.readme),
        (HEADINGS[4], &processed.documentation),
        (HEADINGS[5], &processed.build_and_package_data),
        (HEADINGS[6], &processed.tests),
        (HEADINGS[7], &processed.code),
    ];
    sections
        .iter()
        .map(|(header, value)| {
            let trimmed = value.trim();
            let body = if trimmed.is_empty() { NOT_FOUND } else { trimmed };
            format!("{header}\n{body}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n"
}

pub fn parse_repo_digest_markdown(body: &str) -> CoreResult<RepoDigest> {
    let boundaries = known_section_boundaries(body, &HEADINGS);
    if boundaries.is_empty() {
        return Err(CoreError::digest_parse(
            "no known top-level section heading found in processed markdown",
        ));
    }
    let sections = slice_sections(body, &boundaries);
    let mut out = RepoDigest::default();
    for (idx, text) in sections {
        let trimmed = text.trim();
        let value = if trimmed.is_empty() || trimmed == NOT_FOUND {
            String::new()
        } else {
            trimmed.to_string()
        };
        match idx {
            0 => out.repository_metadata = value,
            1 => out.language_stats = value,
            2 => out.directory_tree = value,
            3 => out.readme = value,
            4 => out.documentation = value,
            5 => out.build_and_package_data = value,
            6 => out.tests = value,
            7 => out.code = value,
            _ => unreachable!(),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_then_parse_roundtrips() {
        let processed = ProcessedRepoMarkdown {
            repository_metadata: "owner/repo".to_string(),
            language_stats: "- Rust: 100".to_string(),
            directory_tree: "src/main.rs".to_string(),
            readme: "hello".to_string(),
            documentation: String::new(),
            build_and_package_data: "Cargo.toml block".to_string(),
            tests: String::new(),
            code: "fn main() {}".to_string(),
            ..ProcessedRepoMarkdown::default()
        };
        let rendered = render_processed_markdown(&processed);
        let digest = parse_repo_digest_markdown(&rendered).unwrap();
        assert_eq!(digest.readme, "hello");
        assert_eq!(digest.documentation, "");
        assert_eq!(digest.code, "fn main() {}");
    }

    #[test]
    fn render_is_idempotent_under_reparse() {
        let processed = ProcessedRepoMarkdown {
            repository_metadata: "a".to_string(),
            language_stats: "b".to_string(),
            directory_tree: "c".to_string(),
            readme: "d".to_string(),
            documentation: "e".to_string(),
            build_and_package_data: "f".to_string(),
            tests: "g".to_string(),
            code: "h".to_string(),
            ..ProcessedRepoMarkdown::default()
        };
        let rendered_once = render_processed_markdown(&processed);
        let digest = parse_repo_digest_markdown(&rendered_once).unwrap();
        let reprocessed = ProcessedRepoMarkdown {
            repository_metadata: digest.repository_metadata,
            language_stats: digest.language_stats,
            directory_tree: digest.directory_tree,
            readme: digest.readme,
            documentation: digest.documentation,
            build_and_package_data: digest.build_and_package_data,
            tests: digest.tests,
            code: digest.code,
            ..ProcessedRepoMarkdown::default()
        };
        let rendered_twice = render_processed_markdown(&reprocessed);
        assert_eq!(rendered_once, rendered_twice);
    }
}
