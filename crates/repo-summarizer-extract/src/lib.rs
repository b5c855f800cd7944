//! URL parsing, the remote adapter, and the bounded repository extractor.

#![forbid(unsafe_code)]

pub mod adapter;
pub mod error;
pub mod extractor;
pub mod url_parser;

pub use adapter::RemoteAdapter;
pub use error::{ExtractError, ExtractResult};
pub use extractor::Extractor;
pub use url_parser::parse_repo_url;
