//! Markdown codec shared by the extractor, the context-budget processor,
//! and the LLM gateway.

pub mod digest;
pub mod extraction;
pub mod fence;
pub mod text;

pub use digest::{parse_repo_digest_markdown, render_processed_markdown, RepoDigest};
pub use extraction::{parse_extraction_markdown, render_extraction_markdown};
