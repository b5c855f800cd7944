//! Context-budget processor error taxonomy.

use std::fmt::{self, Display};

use repo_summarizer_core::model::ProcessedRepoMarkdown;

pub type ProcessResult<T> = Result<T, ProcessError>;

#[derive(Debug)]
pub enum ProcessError {
    Parse { message: String },
    Config { message: String },
    /// Raised when the budget cannot be met even after baseline shrink and
    /// weighted allocation. Carries the last-computed partial result so the
    /// orchestrator can fall back to it — see `DESIGN.md` decision 3.
    Budget {
        message: String,
        processed: Option<Box<ProcessedRepoMarkdown>>,
    },
}

impl ProcessError {
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::Parse { message: message.into() }
    }

    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn budget<M: Into<String>>(message: M, processed: Option<ProcessedRepoMarkdown>) -> Self {
        Self::Budget {
            message: message.into(),
            processed: processed.map(Box::new),
        }
    }
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { message } => write!(f, "digest parse error: {message}"),
            Self::Config { message } => write!(f, "config error: {message}"),
            Self::Budget { message, .. } => write!(f, "budget error: {message}"),
        }
    }
}

impl std::error::Error for ProcessError {}
