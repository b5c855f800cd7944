//! Tolerant tree-shape extraction, grounded on
//! `original_source/app/github_gate/client.py::_extract_tree_items`/`_to_mapping`.
//!
//! A tree response may arrive as a bare JSON array, or as an object
//! carrying the array under `tree`, `items`, or `data` (with one extra
//! level of nesting under `data.tree`/`data.items`). This probes those
//! shapes in order and returns the first array found.

use serde_json::Value;

use crate::error::ExtractError;

const PROBE_KEYS: [&str; 3] = ["tree", "items", "data"];

pub fn extract_tree_items(body: &Value) -> Result<&Vec<Value>, ExtractError> {
    if let Value::Array(items) = body {
        return Ok(items);
    }
    let Value::Object(map) = body else {
        return Err(ExtractError::response_shape(format!(
            "tree response had unexpected top-level shape: {}",
            value_type_name(body)
        )));
    };
    for key in PROBE_KEYS {
        if let Some(candidate) = map.get(key) {
            if let Value::Array(items) = candidate {
                return Ok(items);
            }
            if let Value::Object(nested) = candidate {
                for nested_key in ["tree", "items"] {
                    if let Some(Value::Array(items)) = nested.get(nested_key) {
                        return Ok(items);
                    }
                }
            }
        }
    }
    Err(ExtractError::response_shape(
        "tree response object had none of tree/items/data as an array",
    ))
}

/// Tree entries may report size under `size` or `size_bytes`; `size` wins
/// when both are present. Resolves the Open Question recorded in
/// `DESIGN.md` decision 4.
pub fn tree_entry_size(entry: &Value) -> u64 {
    entry
        .get("size")
        .and_then(Value::as_u64)
        .or_else(|| entry.get("size_bytes").and_then(Value::as_u64))
        .unwrap_or(0)
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_bare_array() {
        let v = json!([{"path": "a.rs"}]);
        assert_eq!(extract_tree_items(&v).unwrap().len(), 1);
    }

    #[test]
    fn accepts_tree_key() {
        let v = json!({"tree": [{"path": "a.rs"}]});
        assert_eq!(extract_tree_items(&v).unwrap().len(), 1);
    }

    #[test]
    fn accepts_nested_data_tree() {
        let v = json!({"data": {"tree": [{"path": "a.rs"}, {"path": "b.rs"}]}});
        assert_eq!(extract_tree_items(&v).unwrap().len(), 2);
    }

    #[test]
    fn rejects_unknown_shape() {
        let v = json!({"unexpected": 1});
        assert!(extract_tree_items(&v).is_err());
    }

    #[test]
    fn size_prefers_size_over_size_bytes() {
        let v = json!({"size": 10, "size_bytes": 20});
        assert_eq!(tree_entry_size(&v), 10);
        let v2 = json!({"size_bytes": 20});
        assert_eq!(tree_entry_size(&v2), 20);
        let v3 = json!({});
        assert_eq!(tree_entry_size(&v3), 0);
    }
}
