//! Extractor error taxonomy. Hand-rolled `Display`, no derive macro —
//! matches `signia_core::errors::SigniaError`.

use std::fmt::{self, Display};

pub type ExtractResult<T> = Result<T, ExtractError>;

#[derive(Debug)]
pub enum ExtractError {
    InvalidUrl { message: String },
    RepositoryInaccessible { message: String },
    RateLimited { message: String },
    Timeout { message: String },
    ResponseShape { message: String },
    Upstream { message: String, status: Option<u16> },
}

impl ExtractError {
    pub fn invalid_url<M: Into<String>>(message: M) -> Self {
        Self::InvalidUrl { message: message.into() }
    }
    pub fn repository_inaccessible<M: Into<String>>(message: M) -> Self {
        Self::RepositoryInaccessible { message: message.into() }
    }
    pub fn rate_limited<M: Into<String>>(message: M) -> Self {
        Self::RateLimited { message: message.into() }
    }
    pub fn timeout<M: Into<String>>(message: M) -> Self {
        Self::Timeout { message: message.into() }
    }
    pub fn response_shape<M: Into<String>>(message: M) -> Self {
        Self::ResponseShape { message: message.into() }
    }
    pub fn upstream<M: Into<String>>(message: M, status: Option<u16>) -> Self {
        Self::Upstream { message: message.into(), status }
    }

    /// Whether a failed attempt with this error should be retried, per
    /// `SPEC_FULL.md` §4.3's status mapping.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout { .. })
            || matches!(self, Self::Upstream { status: Some(s), .. } if matches!(s, 429 | 502 | 503 | 504))
            || matches!(self, Self::Upstream { status: None, .. })
    }
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { message } => write!(f, "invalid github url: {message}"),
            Self::RepositoryInaccessible { message } => write!(f, "repository inaccessible: {message}"),
            Self::RateLimited { message } => write!(f, "rate limited: {message}"),
            Self::Timeout { message } => write!(f, "timeout: {message}"),
            Self::ResponseShape { message } => write!(f, "response shape error: {message}"),
            Self::Upstream { message, status } => {
                write!(f, "upstream error ({:?}): {message}", status)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classification() {
        assert!(ExtractError::rate_limited("x").is_retryable());
        assert!(ExtractError::timeout("x").is_retryable());
        assert!(ExtractError::upstream("x", Some(503)).is_retryable());
        assert!(!ExtractError::upstream("x", Some(400)).is_retryable());
        assert!(!ExtractError::repository_inaccessible("x").is_retryable());
    }
}
