//! Warnings buffer idiom, grounded on `signia-core::diagnostics`.
//!
//! The extractor owns a single `Diagnostics` collection (single-writer, per
//! `SPEC_FULL.md` §5) and appends a `Diagnostic` whenever a file is skipped,
//! truncated, a stage deadline triggers, or a selector raises. The markdown
//! renderer flattens these into plain human-readable lines for the
//! `Warnings` section; nothing downstream needs the structured form.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Info,
    Warning,
}

impl DiagLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagLevel,
    pub code: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl Diagnostic {
    pub fn new(level: DiagLevel, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            code: code.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.level == DiagLevel::Warning
    }

    /// A single human-readable line, as rendered into the `Warnings`
    /// markdown section.
    pub fn to_line(&self) -> String {
        if self.fields.is_empty() {
            self.message.clone()
        } else {
            let extras: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            format!("{} ({})", self.message, extras.join(", "))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, d: Diagnostic) {
        self.items.push(d);
    }

    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(Diagnostic::is_warning)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn lines(&self) -> Vec<String> {
        self.items.iter().map(Diagnostic::to_line).collect()
    }
}

/// Warning-code catalog for the repository extractor. Mirrors the
/// `signia_core::diagnostics::codes`/`warnings::codes` constructor-catalog
/// idiom, with codes drawn from the extraction warning strings in
/// `github_gate/client.py`.
pub mod codes {
    use super::{DiagLevel, Diagnostic};

    pub const SKIPPED_FILE: &str = "skipped_file";
    pub const STAGE_DEADLINE_EXCEEDED: &str = "stage_deadline_exceeded";
    pub const TOTAL_DEADLINE_EXCEEDED: &str = "total_deadline_exceeded";
    pub const MAX_FILES_REACHED: &str = "max_files_reached";
    pub const MAX_BYTES_REACHED: &str = "max_bytes_reached";
    pub const BINARY_CONTENT_REJECTED: &str = "binary_content_rejected";
    pub const HOMEPAGE_FETCH_FAILED: &str = "homepage_fetch_failed";
    pub const TRUNCATED_FILE: &str = "truncated_file";
    pub const TREE_SHAPE_FALLBACK: &str = "tree_shape_fallback";

    pub fn skipped_file(path: &str, reason: &str) -> Diagnostic {
        Diagnostic::new(DiagLevel::Warning, SKIPPED_FILE, format!("skipped {path}: {reason}"))
            .with_field("path", path)
    }

    pub fn stage_deadline_exceeded(stage: &str) -> Diagnostic {
        Diagnostic::new(
            DiagLevel::Warning,
            STAGE_DEADLINE_EXCEEDED,
            format!("stage '{stage}' exceeded its time budget and was cut short"),
        )
        .with_field("stage", stage)
    }

    pub fn total_deadline_exceeded(stage: &str) -> Diagnostic {
        Diagnostic::new(
            DiagLevel::Warning,
            TOTAL_DEADLINE_EXCEEDED,
            format!("total fetch deadline reached before stage '{stage}' could run"),
        )
        .with_field("stage", stage)
    }

    pub fn max_files_reached(category: &str, limit: u32) -> Diagnostic {
        Diagnostic::new(
            DiagLevel::Warning,
            MAX_FILES_REACHED,
            format!("category '{category}' reached its file-count limit ({limit})"),
        )
        .with_field("category", category)
    }

    pub fn max_bytes_reached(category: &str) -> Diagnostic {
        Diagnostic::new(
            DiagLevel::Warning,
            MAX_BYTES_REACHED,
            format!("category '{category}' reached its total-byte budget"),
        )
        .with_field("category", category)
    }

    pub fn binary_content_rejected(path: &str) -> Diagnostic {
        Diagnostic::new(
            DiagLevel::Warning,
            BINARY_CONTENT_REJECTED,
            format!("rejected {path}: content looked binary (contains NUL byte)"),
        )
        .with_field("path", path)
    }

    pub fn homepage_fetch_failed(url: &str, reason: &str) -> Diagnostic {
        Diagnostic::new(
            DiagLevel::Warning,
            HOMEPAGE_FETCH_FAILED,
            format!("could not fetch homepage {url}: {reason}"),
        )
        .with_field("url", url)
    }

    pub fn truncated_file(path: &str, original_bytes: usize, kept_bytes: usize) -> Diagnostic {
        Diagnostic::new(
            DiagLevel::Warning,
            TRUNCATED_FILE,
            format!("truncated {path} from {original_bytes} to {kept_bytes} bytes"),
        )
        .with_field("path", path)
    }

    pub fn tree_shape_fallback(observed: &str) -> Diagnostic {
        Diagnostic::new(
            DiagLevel::Info,
            TREE_SHAPE_FALLBACK,
            format!("tree response used a non-list shape ({observed}); tolerant probe applied"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_line_includes_fields() {
        let d = codes::skipped_file("a.bin", "binary content");
        assert_eq!(d.to_line(), "skipped a.bin: binary content (path=a.bin)");
    }

    #[test]
    fn diagnostics_tracks_warning_presence() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_warnings());
        diags.push(codes::max_files_reached("code", 120));
        assert!(diags.has_warnings());
        assert_eq!(diags.count(), 1);
    }
}
