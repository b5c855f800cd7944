//! Token/byte conversion math, grounded on
//! `original_source/app/repo_processor/bookkeeper.py::ContextWindowLimitBookkeeper`.

use repo_summarizer_core::model::estimated_tokens_for_bytes;

#[derive(Debug, Clone, Copy)]
pub struct ContextWindowLimitBookkeeper {
    pub model_context_window_tokens: u64,
    pub max_repo_data_ratio_in_prompt: f64,
    pub bytes_per_token_estimate: f64,
}

impl ContextWindowLimitBookkeeper {
    pub fn max_repo_bytes(&self) -> usize {
        ((self.model_context_window_tokens as f64)
            * self.max_repo_data_ratio_in_prompt
            * self.bytes_per_token_estimate)
            .floor() as usize
    }

    pub fn estimated_tokens(&self, bytes: usize) -> u64 {
        estimated_tokens_for_bytes(bytes as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_max_repo_bytes() {
        let bk = ContextWindowLimitBookkeeper {
            model_context_window_tokens: 8192,
            max_repo_data_ratio_in_prompt: 0.65,
            bytes_per_token_estimate: 4.0,
        };
        assert_eq!(bk.max_repo_bytes(), (8192.0 * 0.65 * 4.0).floor() as usize);
    }
}
