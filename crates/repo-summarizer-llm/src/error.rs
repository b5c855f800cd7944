//! LLM gateway error taxonomy.

use std::fmt::{self, Display};

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug)]
pub enum LlmError {
    DigestParse { message: String },
    Config { message: String },
    RateLimited { message: String },
    Timeout { message: String },
    Upstream { message: String, status: Option<u16> },
    OutputValidation { message: String },
    /// A context-window-overflow error from the provider, with the parsed
    /// `(context_tokens, input_tokens)` pair when the message matched the
    /// known shape, for the orchestrator's adaptive retry.
    ContextOverflow {
        message: String,
        context_tokens: Option<u64>,
        input_tokens: Option<u64>,
    },
}

impl LlmError {
    pub fn digest_parse<M: Into<String>>(message: M) -> Self {
        Self::DigestParse { message: message.into() }
    }
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config { message: message.into() }
    }
    pub fn rate_limited<M: Into<String>>(message: M) -> Self {
        Self::RateLimited { message: message.into() }
    }
    pub fn timeout<M: Into<String>>(message: M) -> Self {
        Self::Timeout { message: message.into() }
    }
    pub fn upstream<M: Into<String>>(message: M, status: Option<u16>) -> Self {
        Self::Upstream { message: message.into(), status }
    }
    pub fn output_validation<M: Into<String>>(message: M) -> Self {
        Self::OutputValidation { message: message.into() }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout { .. })
            || matches!(self, Self::Upstream { status: Some(s), .. } if matches!(s, 429 | 502 | 503 | 504))
    }
}

impl Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DigestParse { message } => write!(f, "digest parse error: {message}"),
            Self::Config { message } => write!(f, "config error: {message}"),
            Self::RateLimited { message } => write!(f, "rate limited: {message}"),
            Self::Timeout { message } => write!(f, "timeout: {message}"),
            Self::Upstream { message, status } => write!(f, "upstream error ({status:?}): {message}"),
            Self::OutputValidation { message } => write!(f, "output validation error: {message}"),
            Self::ContextOverflow { message, .. } => write!(f, "context overflow: {message}"),
        }
    }
}

impl std::error::Error for LlmError {}
