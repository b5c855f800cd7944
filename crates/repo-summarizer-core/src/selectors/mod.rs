//! Pure path-classification functions, grounded on
//! `original_source/app/github_gate/selectors.py`.

const TEXT_EXTENSIONS: &[&str] = &[
    "md", "txt", "rst", "adoc", "py", "js", "ts", "tsx", "jsx", "json", "yaml", "yml", "toml",
    "ini", "cfg", "conf", "go", "rs", "java", "kt", "swift", "rb", "php", "cs", "c", "h", "cpp",
    "hpp", "sh", "bash", "zsh", "ps1", "sql", "xml", "html", "css", "scss", "less", "env",
];

const DOC_FILENAME_PREFIXES: &[&str] = &["readme"];

const DOC_EXACT_FILENAMES: &[&str] = &[
    "contributing.md",
    "contributing.rst",
    "setup.md",
    "installation.md",
    "install.md",
];

const BUILD_PACKAGE_EXACT_FILENAMES: &[&str] = &[
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "requirements.txt",
    "pipfile",
    "package.json",
    "tsconfig.json",
    "pnpm-workspace.yaml",
    "go.mod",
    "cargo.toml",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "composer.json",
    "gemfile",
    "makefile",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    ".gitlab-ci.yml",
];

const HIGH_SIGNAL_BUILD_PACKAGE_FILENAMES: &[&str] = &[
    "pyproject.toml",
    "requirements.txt",
    "setup.py",
    "setup.cfg",
    "package.json",
    "go.mod",
    "cargo.toml",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    ".gitlab-ci.yml",
];

const ENTRYPOINT_STEMS: &[&str] = &["main", "app", "server", "cli", "__main__", "manage", "run"];

fn filename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(path: &str) -> Option<String> {
    let name = filename(path);
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

fn stem(path: &str) -> String {
    let name = filename(path);
    match name.rsplit_once('.') {
        Some((s, _)) if !s.is_empty() => s.to_ascii_lowercase(),
        _ => name.to_ascii_lowercase(),
    }
}

pub fn path_depth(path: &str) -> usize {
    path.matches('/').count()
}

pub fn is_likely_text_path(path: &str) -> bool {
    let name = filename(path).to_ascii_lowercase();
    if name == "dockerfile" {
        return true;
    }
    match extension(path) {
        Some(ext) => TEXT_EXTENSIONS.contains(&ext.as_str()),
        None => true,
    }
}

pub fn looks_like_doc_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    if lower.starts_with("docs/") || lower.starts_with("documentation/") {
        return true;
    }
    let name = filename(&lower);
    if DOC_FILENAME_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return true;
    }
    DOC_EXACT_FILENAMES.contains(&name)
}

pub fn looks_like_test_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    if lower.starts_with("tests/") || lower.starts_with("test/") {
        return true;
    }
    let name = filename(&lower);
    match name.rsplit_once('.') {
        Some((s, ext)) if !s.is_empty() && !ext.is_empty() => {
            s.starts_with("test_") || s.ends_with("_test")
        }
        _ => false,
    }
}

pub fn looks_like_build_package_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    let name = filename(&lower);
    if BUILD_PACKAGE_EXACT_FILENAMES.contains(&name) {
        return true;
    }
    name.starts_with("requirements-") && name.ends_with(".txt")
}

pub fn is_high_signal_build_package_filename(path: &str) -> bool {
    HIGH_SIGNAL_BUILD_PACKAGE_FILENAMES.contains(&filename(path).to_ascii_lowercase().as_str())
}

pub fn looks_like_entrypoint(path: &str) -> bool {
    ENTRYPOINT_STEMS.contains(&stem(path).as_str())
}

/// Stable sort by `(depth, lowercased path)`.
pub fn sorted_bfs(paths: &mut Vec<String>) {
    paths.sort_by(|a, b| {
        let da = path_depth(a);
        let db = path_depth(b);
        da.cmp(&db).then_with(|| a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_path_detection() {
        assert!(is_likely_text_path("src/main.rs"));
        assert!(is_likely_text_path("Dockerfile"));
        assert!(is_likely_text_path("LICENSE"));
        assert!(is_likely_text_path("scripts/run"));
        assert!(!is_likely_text_path("assets/logo.png"));
    }

    #[test]
    fn doc_path_detection() {
        assert!(looks_like_doc_path("docs/guide.md"));
        assert!(looks_like_doc_path("README.md"));
        assert!(looks_like_doc_path("CONTRIBUTING.md"));
        assert!(!looks_like_doc_path("src/readme_parser.rs"));
    }

    #[test]
    fn test_path_detection() {
        assert!(looks_like_test_path("tests/test_foo.py"));
        assert!(looks_like_test_path("src/foo_test.rs"));
        assert!(!looks_like_test_path("src/foo.rs"));
        assert!(!looks_like_test_path("src/test_helpers"));
    }

    #[test]
    fn build_package_path_detection() {
        assert!(looks_like_build_package_path("Cargo.toml"));
        assert!(looks_like_build_package_path("requirements-dev.txt"));
        assert!(!looks_like_build_package_path("src/main.rs"));
    }

    #[test]
    fn entrypoint_detection() {
        assert!(looks_like_entrypoint("src/main.rs"));
        assert!(looks_like_entrypoint("cmd/cli.go"));
        assert!(!looks_like_entrypoint("src/helpers.rs"));
    }

    #[test]
    fn sorted_bfs_orders_by_depth_then_name() {
        let mut paths = vec![
            "b/z.rs".to_string(),
            "a.rs".to_string(),
            "a/b.rs".to_string(),
        ];
        sorted_bfs(&mut paths);
        assert_eq!(paths, vec!["a.rs", "a/b.rs", "b/z.rs"]);
    }
}
