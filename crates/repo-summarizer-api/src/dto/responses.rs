pub use repo_summarizer_core::model::SummaryResult as SummarizeResponse;
