#![forbid(unsafe_code)]

pub mod client;
pub mod error;
pub mod models;
pub mod normalize;
pub mod prompt_loader;
pub mod retry;

pub use client::{parse_context_overflow, LlmGateway};
pub use error::{LlmError, LlmResult};
pub use models::LlmRequestOptions;
pub use prompt_loader::{parse_prompt_contract, PromptContract};
