//! Context-budget processor: compresses extraction markdown to fit a
//! weighted per-category budget derived from the model's context window.

#![forbid(unsafe_code)]

pub mod allocator;
pub mod bookkeeper;
pub mod error;
pub mod processor;

pub use bookkeeper::ContextWindowLimitBookkeeper;
pub use error::{ProcessError, ProcessResult};
pub use processor::process_markdown;
