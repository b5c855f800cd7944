//! Request-scoped, immutable data model shared across the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A parsed `(owner, repo)` reference. Construction is the URL parser's job;
/// this type only asserts the invariant that both components are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Option<Self> {
        let owner = owner.into();
        let repo = repo.into();
        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(Self { owner, repo })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub owner: String,
    pub repo: String,
    pub default_branch: String,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeEntryType {
    Blob,
    Tree,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub entry_type: TreeEntryType,
    pub size_bytes: u64,
    pub api_url: Option<String>,
    pub download_url: Option<String>,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        matches!(self.entry_type, TreeEntryType::Blob)
    }

    pub fn path_depth(&self) -> usize {
        crate::selectors::path_depth(&self.path)
    }
}

/// UTF-8 file contents fetched from the code host. `byte_size` is always the
/// exact UTF-8 length of `content_text`; callers must not construct this with
/// a mismatched size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub source_url: Option<String>,
    pub content_text: String,
    pub byte_size: usize,
}

impl FileContent {
    pub fn new(path: impl Into<String>, source_url: Option<String>, content_text: String) -> Self {
        let byte_size = content_text.len();
        Self {
            path: path.into(),
            source_url,
            content_text,
            byte_size,
        }
    }

    pub fn estimated_tokens(&self) -> u64 {
        estimated_tokens_for_bytes(self.byte_size as u64)
    }
}

/// `ceil(bytes / 4)`, the one canonical token-estimate formula reused by the
/// renderer, the processor's bookkeeper, and the gateway.
pub fn estimated_tokens_for_bytes(n: u64) -> u64 {
    (n + 3) / 4
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadmeData {
    pub file: FileContent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentationData {
    pub files: Vec<FileContent>,
}

impl DocumentationData {
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.byte_size).sum()
    }
}

impl Default for FileContent {
    fn default() -> Self {
        Self {
            path: String::new(),
            source_url: None,
            content_text: String::new(),
            byte_size: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoSnapshot {
    pub metadata: RepoMetadata,
    pub languages: BTreeMap<String, u64>,
    pub tree: Vec<TreeEntry>,
    pub readme: Option<ReadmeData>,
    pub documentation: Option<DocumentationData>,
    pub build_and_package: Vec<FileContent>,
    pub tests: Vec<FileContent>,
    pub code: Vec<FileContent>,
    pub requested: RequestedEntities,
}

/// Which top-level sections were actually attempted during extraction (as
/// opposed to skipped outright, e.g. by a total-fetch-deadline cutoff).
/// Used by the renderer to choose `Not requested` vs `Not found`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedEntities {
    pub metadata: bool,
    pub languages: bool,
    pub tree: bool,
    pub readme: bool,
    pub documentation: bool,
    pub build_and_package: bool,
    pub tests: bool,
    pub code: bool,
}

impl Default for RequestedEntities {
    fn default() -> Self {
        Self {
            metadata: true,
            languages: true,
            tree: true,
            readme: true,
            documentation: true,
            build_and_package: true,
            tests: true,
            code: true,
        }
    }
}

/// The nine top-level sections produced by the markdown renderer, parsed
/// back out of extraction markdown. Every field is optional because a
/// section can be genuinely absent (`Not requested`) or present-but-empty
/// (`Not found`) — both collapse to `None` here; the renderer is what
/// distinguishes them, using `requested` on `RepoSnapshot`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedRepoMarkdown {
    pub repository_metadata: Option<String>,
    pub language_stats: Option<String>,
    pub directory_tree: Option<String>,
    pub readme: Option<String>,
    pub documentation: Option<String>,
    pub build_and_package_data: Option<String>,
    pub tests: Option<String>,
    pub code: Option<String>,
    pub extraction_stats: Option<String>,
    pub warnings: Option<String>,
}

/// Per-category byte/token bookkeeping attached to a processed digest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryBytes {
    pub documentation: usize,
    pub tests: usize,
    pub build_and_package_data: usize,
    pub code: usize,
}

/// The eight-section, budget-fitted markdown the context-budget processor
/// produces and the LLM gateway consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessedRepoMarkdown {
    pub repository_metadata: String,
    pub language_stats: String,
    pub directory_tree: String,
    pub readme: String,
    pub documentation: String,
    pub build_and_package_data: String,
    pub tests: String,
    pub code: String,

    pub input_total_utf8_bytes: usize,
    pub output_total_utf8_bytes: usize,
    pub max_repo_data_size_for_prompt_bytes: usize,
    pub estimated_input_tokens: u64,
    pub estimated_output_tokens: u64,
    pub bytes_per_token_estimate: f64,
    pub per_category_bytes: CategoryBytes,
    pub truncation_notes: Vec<String>,
}

/// The model's normalized output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub technologies: Vec<String>,
    pub structure: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_ref_rejects_empty_components() {
        assert!(RepoRef::new("", "repo").is_none());
        assert!(RepoRef::new("owner", "").is_none());
        assert!(RepoRef::new("owner", "repo").is_some());
    }

    #[test]
    fn file_content_byte_size_matches_utf8_length() {
        let f = FileContent::new("a.rs", None, "héllo".to_string());
        assert_eq!(f.byte_size, "héllo".len());
    }

    #[test]
    fn estimated_tokens_rounds_up() {
        assert_eq!(estimated_tokens_for_bytes(0), 0);
        assert_eq!(estimated_tokens_for_bytes(1), 1);
        assert_eq!(estimated_tokens_for_bytes(4), 1);
        assert_eq!(estimated_tokens_for_bytes(5), 2);
    }
}
