//! Nine-section extraction markdown: render a `RepoSnapshot` to the
//! canonical digest, and parse it back into an `ExtractedRepoMarkdown`.
//!
//! Grounded on `original_source/app/github_gate/markdown_renderer.py`
//! (`render_extraction_markdown`, `_render_file_block`, `_render_stats`)
//! and `original_source/app/repo_processor/parser.py`
//! (`_known_section_boundaries`, `_extract_top_level_sections`).

use crate::error::{CoreError, CoreResult};
use crate::markdown::fence::{known_section_boundaries, slice_sections};
use crate::model::{estimated_tokens_for_bytes, ExtractedRepoMarkdown, FileContent, RepoSnapshot};

const NOT_REQUESTED: &str = "Not requested";
const NOT_FOUND: &str = "Not found";

pub const HEADINGS: [&str; 10] = [
    "# Repository Metadata",
    "# Language Stats",
    "# Directory Tree",
    "# README",
    "# Documentation",
    "# Build and Package Data",
    "# Tests",
    "# Code",
    "# Extraction Stats",
    "# Warnings",
];

fn render_file_block(file: &FileContent) -> String {
    format!(
        "## File: {}\n- Source: {}\n- UTF8 Bytes: {}\n- Estimated Tokens: {}\n```text\n{}\n```",
        file.path,
        file.source_url.as_deref().unwrap_or("n/a"),
        file.byte_size,
        file.estimated_tokens(),
        file.content_text,
    )
}

fn render_file_blocks(files: &[FileContent]) -> String {
    files.iter().map(render_file_block).collect::<Vec<_>>().join("\n\n")
}

fn section_body(requested: bool, rendered: String) -> String {
    if !requested {
        NOT_REQUESTED.to_string()
    } else if rendered.trim().is_empty() {
        NOT_FOUND.to_string()
    } else {
        rendered
    }
}

fn render_stats(snapshot: &RepoSnapshot) -> String {
    let readme_bytes = snapshot.readme.as_ref().map(|r| r.file.byte_size).unwrap_or(0);
    let doc_bytes = snapshot.documentation.as_ref().map(|d| d.total_bytes()).unwrap_or(0);
    let build_bytes: usize = snapshot.build_and_package.iter().map(|f| f.byte_size).sum();
    let test_bytes: usize = snapshot.tests.iter().map(|f| f.byte_size).sum();
    let code_bytes: usize = snapshot.code.iter().map(|f| f.byte_size).sum();
    let total_bytes = readme_bytes + doc_bytes + build_bytes + test_bytes + code_bytes;

    let lines = [
        ("readme_bytes", readme_bytes),
        ("readme_estimated_tokens", estimated_tokens_for_bytes(readme_bytes as u64) as usize),
        ("documentation_bytes", doc_bytes),
        ("documentation_estimated_tokens", estimated_tokens_for_bytes(doc_bytes as u64) as usize),
        ("build_and_package_bytes", build_bytes),
        ("build_and_package_estimated_tokens", estimated_tokens_for_bytes(build_bytes as u64) as usize),
        ("tests_bytes", test_bytes),
        ("tests_estimated_tokens", estimated_tokens_for_bytes(test_bytes as u64) as usize),
        ("code_bytes", code_bytes),
        ("code_estimated_tokens", estimated_tokens_for_bytes(code_bytes as u64) as usize),
        ("total_bytes", total_bytes),
        ("total_estimated_tokens", estimated_tokens_for_bytes(total_bytes as u64) as usize),
    ];
    lines
        .iter()
        .map(|(k, v)| format!("- {k}: {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_extraction_markdown(snapshot: &RepoSnapshot, warnings: &[String]) -> String {
    let r = &snapshot.requested;

    let metadata_body = {
        let m = &snapshot.metadata;
        format!(
            "- Owner: {}\n- Repo: {}\n- Default Branch: {}\n- Description: {}\n- Topics: {}\n- Homepage: {}",
            m.owner,
            m.repo,
            m.default_branch,
            m.description.as_deref().unwrap_or("n/a"),
            if m.topics.is_empty() { "n/a".to_string() } else { m.topics.join(", ") },
            m.homepage.as_deref().unwrap_or("n/a"),
        )
    };

    let languages_body = {
        let mut langs: Vec<(&String, &u64)> = snapshot.languages.iter().collect();
        langs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        langs
            .into_iter()
            .map(|(lang, bytes)| format!("- {lang}: {bytes}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut tree_paths: Vec<String> = snapshot.tree.iter().map(|e| e.path.clone()).collect();
    crate::selectors::sorted_bfs(&mut tree_paths);
    let tree_body = tree_paths.join("\n");

    let readme_body = snapshot
        .readme
        .as_ref()
        .map(|r| render_file_block(&r.file))
        .unwrap_or_default();

    let documentation_body = snapshot
        .documentation
        .as_ref()
        .map(|d| render_file_blocks(&d.files))
        .unwrap_or_default();

    let build_body = render_file_blocks(&snapshot.build_and_package);
    let tests_body = render_file_blocks(&snapshot.tests);
    let code_body = render_file_blocks(&snapshot.code);

    let stats_body = render_stats(snapshot);
    let warnings_body = if warnings.is_empty() {
        NOT_FOUND.to_string()
    } else {
        warnings.iter().map(|w| format!("- {w}")).collect::<Vec<_>>().join("\n")
    };

    let sections = [
        (HEADINGS[0], section_body(r.metadata, metadata_body)),
        (HEADINGS[1], section_body(r.languages, languages_body)),
        (HEADINGS[2], section_body(r.tree, tree_body)),
        (HEADINGS[3], section_body(r.readme, readme_body)),
        (HEADINGS[4], section_body(r.documentation, documentation_body)),
        (HEADINGS[5], section_body(r.build_and_package, build_body)),
        (HEADINGS[6], section_body(r.tests, tests_body)),
        (HEADINGS[7], section_body(r.code, code_body)),
        (HEADINGS[8], stats_body),
        (HEADINGS[9], warnings_body),
    ];

    sections
        .iter()
        .map(|(header, body)| format!("{header}\n{body}"))
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n"
}

/// Parses extraction markdown back into typed sections. `Not requested`/
/// `Not found` both collapse to `None`; unknown top-level headings are
/// ignored; raises `digest_parse_error` if no known heading was found at
/// all.
pub fn parse_extraction_markdown(body: &str) -> CoreResult<ExtractedRepoMarkdown> {
    let boundaries = known_section_boundaries(body, &HEADINGS);
    if boundaries.is_empty() {
        return Err(CoreError::digest_parse(
            "no known top-level section heading found",
        ));
    }
    let sections = slice_sections(body, &boundaries);
    let mut out = ExtractedRepoMarkdown::default();
    for (idx, text) in sections {
        let value = normalize_section(text);
        match idx {
            0 => out.repository_metadata = value,
            1 => out.language_stats = value,
            2 => out.directory_tree = value,
            3 => out.readme = value,
            4 => out.documentation = value,
            5 => out.build_and_package_data = value,
            6 => out.tests = value,
            7 => out.code = value,
            8 => out.extraction_stats = value,
            9 => out.warnings = value,
            _ => unreachable!(),
        }
    }
    Ok(out)
}

fn normalize_section(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == NOT_REQUESTED || trimmed == NOT_FOUND {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileContent, RepoMetadata, RequestedEntities};

    fn sample_snapshot() -> RepoSnapshot {
        let mut snapshot = RepoSnapshot::default();
        snapshot.metadata = RepoMetadata {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            default_branch: "main".to_string(),
            description: Some("widgets galore".to_string()),
            topics: vec!["rust".to_string()],
            homepage: None,
        };
        snapshot.readme = Some(crate::model::ReadmeData {
            file: FileContent::new("README.md", Some("https://x/README.md".to_string()), "hello".to_string()),
        });
        snapshot.requested = RequestedEntities::default();
        snapshot
    }

    #[test]
    fn render_then_parse_roundtrips_readme() {
        let snapshot = sample_snapshot();
        let rendered = render_extraction_markdown(&snapshot, &[]);
        let parsed = parse_extraction_markdown(&rendered).unwrap();
        assert_eq!(parsed.readme.unwrap().contains("hello"), true);
        assert!(parsed.repository_metadata.unwrap().contains("acme"));
    }

    #[test]
    fn not_requested_section_parses_to_none() {
        let mut snapshot = sample_snapshot();
        snapshot.requested.documentation = false;
        let rendered = render_extraction_markdown(&snapshot, &[]);
        let parsed = parse_extraction_markdown(&rendered).unwrap();
        assert!(parsed.documentation.is_none());
    }

    #[test]
    fn heading_inside_fenced_code_is_not_a_boundary() {
        let mut snapshot = sample_snapshot();
        snapshot.code = vec![FileContent::new(
            "snippet.md",
            None,
            "# Warnings\nnot a real section".to_string(),
        )];
        let rendered = render_extraction_markdown(&snapshot, &["real warning".to_string()]);
        let parsed = parse_extraction_markdown(&rendered).unwrap();
        assert_eq!(parsed.warnings.unwrap(), "- real warning");
    }
}
