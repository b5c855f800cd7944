use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizeRequest {
    pub github_url: String,
}
