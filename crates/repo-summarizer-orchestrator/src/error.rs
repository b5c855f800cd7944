//! Top-level pipeline error: wraps every subsystem error the orchestrator
//! can see, for the edge crate to project to an HTTP status.

use std::fmt::{self, Display};

use repo_summarizer_extract::ExtractError;
use repo_summarizer_llm::LlmError;
use repo_summarizer_process::ProcessError;

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[derive(Debug)]
pub enum OrchestratorError {
    InvalidUrl { message: String },
    RepositoryInaccessible { message: String },
    RateLimited { message: String },
    Timeout { message: String },
    ResponseShape { message: String },
    Upstream { message: String, status: Option<u16> },
    DigestParse { message: String },
    Budget { message: String },
    OutputValidation { message: String },
    Config { message: String },
}

impl Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { message } => write!(f, "invalid github url: {message}"),
            Self::RepositoryInaccessible { message } => write!(f, "repository inaccessible: {message}"),
            Self::RateLimited { message } => write!(f, "rate limited: {message}"),
            Self::Timeout { message } => write!(f, "timeout: {message}"),
            Self::ResponseShape { message } => write!(f, "response shape error: {message}"),
            Self::Upstream { message, status } => write!(f, "upstream error ({status:?}): {message}"),
            Self::DigestParse { message } => write!(f, "digest parse error: {message}"),
            Self::Budget { message } => write!(f, "budget error: {message}"),
            Self::OutputValidation { message } => write!(f, "output validation error: {message}"),
            Self::Config { message } => write!(f, "config error: {message}"),
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl From<ExtractError> for OrchestratorError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::InvalidUrl { message } => Self::InvalidUrl { message },
            ExtractError::RepositoryInaccessible { message } => Self::RepositoryInaccessible { message },
            ExtractError::RateLimited { message } => Self::RateLimited { message },
            ExtractError::Timeout { message } => Self::Timeout { message },
            ExtractError::ResponseShape { message } => Self::ResponseShape { message },
            ExtractError::Upstream { message, status } => Self::Upstream { message, status },
        }
    }
}

impl From<ProcessError> for OrchestratorError {
    fn from(e: ProcessError) -> Self {
        match e {
            ProcessError::Parse { message } => Self::DigestParse { message },
            ProcessError::Config { message } => Self::Config { message },
            ProcessError::Budget { message, .. } => Self::Budget { message },
        }
    }
}

impl From<LlmError> for OrchestratorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::DigestParse { message } => Self::DigestParse { message },
            LlmError::Config { message } => Self::Config { message },
            LlmError::RateLimited { message } => Self::RateLimited { message },
            LlmError::Timeout { message } => Self::Timeout { message },
            LlmError::Upstream { message, status } => Self::Upstream { message, status },
            LlmError::OutputValidation { message } => Self::OutputValidation { message },
            LlmError::ContextOverflow { message, .. } => Self::OutputValidation { message },
        }
    }
}
