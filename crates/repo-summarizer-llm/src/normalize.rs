//! Response normalization, grounded on
//! `original_source/app/llm_gate/client.py::_normalize_and_validate`.

use std::collections::HashSet;

use repo_summarizer_core::model::SummaryResult;
use serde_json::Value;

use crate::error::{LlmError, LlmResult};

const MAX_TECHNOLOGIES: usize = 20;
const MAX_TECHNOLOGY_LEN: usize = 80;

pub fn normalize_and_validate(raw: &Value) -> LlmResult<SummaryResult> {
    let Value::Object(map) = raw else {
        return Err(LlmError::output_validation("model output was not a JSON object"));
    };

    let expected_keys: HashSet<&str> = ["summary", "technologies", "structure"].into_iter().collect();
    let actual_keys: HashSet<&str> = map.keys().map(String::as_str).collect();
    if actual_keys != expected_keys {
        return Err(LlmError::output_validation(format!(
            "expected exactly keys {{summary, technologies, structure}}, got {:?}",
            map.keys().collect::<Vec<_>>()
        )));
    }

    let summary = map
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LlmError::output_validation("summary must be a non-empty string"))?
        .to_string();

    let structure = map
        .get("structure")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LlmError::output_validation("structure must be a non-empty string"))?
        .to_string();

    let raw_technologies = map
        .get("technologies")
        .and_then(Value::as_array)
        .ok_or_else(|| LlmError::output_validation("technologies must be an array"))?;

    let mut seen_lower: HashSet<String> = HashSet::new();
    let mut technologies: Vec<String> = Vec::new();
    for item in raw_technologies {
        let Some(text) = item.as_str() else {
            return Err(LlmError::output_validation("technologies entries must be strings"));
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let truncated: String = trimmed.chars().take(MAX_TECHNOLOGY_LEN).collect();
        let key = truncated.to_ascii_lowercase();
        if seen_lower.insert(key) {
            technologies.push(truncated);
        }
        if technologies.len() >= MAX_TECHNOLOGIES {
            break;
        }
    }

    Ok(SummaryResult { summary, technologies, structure })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dedups_case_insensitively_preserving_first() {
        let raw = json!({
            "summary": "s",
            "structure": "st",
            "technologies": ["Rust", "rust", "Tokio"]
        });
        let result = normalize_and_validate(&raw).unwrap();
        assert_eq!(result.technologies, vec!["Rust", "Tokio"]);
    }

    #[test]
    fn rejects_unexpected_keys() {
        let raw = json!({"summary": "s", "structure": "st", "technologies": [], "extra": 1});
        assert!(normalize_and_validate(&raw).is_err());
    }

    #[test]
    fn rejects_blank_summary() {
        let raw = json!({"summary": "   ", "structure": "st", "technologies": []});
        assert!(normalize_and_validate(&raw).is_err());
    }

    #[test]
    fn caps_technologies_at_twenty() {
        let items: Vec<String> = (0..30).map(|i| format!("tech{i}")).collect();
        let raw = json!({"summary": "s", "structure": "st", "technologies": items});
        let result = normalize_and_validate(&raw).unwrap();
        assert_eq!(result.technologies.len(), 20);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = json!({"summary": " s ", "structure": " st ", "technologies": ["Rust", "rust"]});
        let once = normalize_and_validate(&raw).unwrap();
        let reencoded = serde_json::to_value(&once).unwrap();
        let twice = normalize_and_validate(&reencoded).unwrap();
        assert_eq!(once.summary, twice.summary);
        assert_eq!(once.technologies, twice.technologies);
    }
}
