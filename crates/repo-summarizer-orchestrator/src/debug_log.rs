//! Per-request debug log: one append-only file under `logs/`, named from
//! the repo name, a UTC timestamp, and a short request id. Grounded on
//! `original_source/app/orchestrator.py`'s `_write_debug_log`.

use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use repo_summarizer_core::model::RepoRef;

pub struct DebugLog {
    entries: Vec<String>,
    repo: RepoRef,
    request_id: String,
}

impl DebugLog {
    pub fn new(repo: RepoRef, request_id: impl Into<String>) -> Self {
        Self { entries: Vec::new(), repo, request_id: request_id.into() }
    }

    pub fn record(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    /// Writes the accumulated entries to `logs/<repo>-<timestamp>-<request_id>.log`.
    /// Failure to write is logged and otherwise swallowed: the debug log is
    /// diagnostic, not load-bearing.
    pub fn flush(&self, logs_dir: &std::path::Path) {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let short_id: String = self.request_id.chars().take(8).collect();
        let filename = format!("{}-{}-{timestamp}-{short_id}.log", self.repo.owner, self.repo.repo);
        let path: PathBuf = logs_dir.join(filename);
        if let Err(e) = std::fs::create_dir_all(logs_dir) {
            tracing::warn!(error = %e, "failed to create logs directory");
            return;
        }
        match std::fs::File::create(&path) {
            Ok(mut f) => {
                for line in &self.entries {
                    if let Err(e) = writeln!(f, "{line}") {
                        tracing::warn!(error = %e, path = %path.display(), "failed to write debug log");
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, path = %path.display(), "failed to create debug log file"),
        }
    }
}
