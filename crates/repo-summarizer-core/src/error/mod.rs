//! Shared error taxonomy.
//!
//! Each subsystem gets its own error enum (extractor, processor, gateway);
//! this module holds `CoreError`, the small set of failures that can occur
//! in shared code (config loading/validation, markdown parsing). Hand-rolled
//! `Display` impls, no derive macro — matches `signia-core::errors`.

use std::fmt::{self, Display};

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug)]
pub enum CoreError {
    Config { message: String },
    DigestParse { message: String },
}

impl CoreError {
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn digest_parse<M: Into<String>>(message: M) -> Self {
        Self::DigestParse {
            message: message.into(),
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message } => write!(f, "config error: {message}"),
            Self::DigestParse { message } => write!(f, "digest parse error: {message}"),
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config_error() {
        let e = CoreError::config("missing field");
        assert_eq!(format!("{e}"), "config error: missing field");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
