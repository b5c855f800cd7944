//! Loads the opaque prompt-contract resource: a system prompt, a JSON
//! schema, and a user-prompt template, each given as a fenced code block
//! following a known heading. Grounded on
//! `original_source/app/llm_gate/prompt_loader.py`. The file's *content*
//! (actual prompt wording) remains an external resource per `SPEC_FULL.md`
//! §1; only its *shape* — heading + one fenced block — is part of this
//! service's contract, because the gateway must parse it.

use serde_json::Value;

use crate::error::{LlmError, LlmResult};

const SYSTEM_PROMPT_HEADING: &str = "## System Prompt";
const JSON_SCHEMA_HEADING: &str = "## JSON Schema";
const USER_PROMPT_HEADING: &str = "## User Prompt Template";

#[derive(Debug, Clone)]
pub struct PromptContract {
    pub system_prompt: String,
    pub json_schema: Value,
    pub user_prompt_template: String,
}

pub fn parse_prompt_contract(raw: &str) -> LlmResult<PromptContract> {
    let system_prompt = extract_fenced_block(raw, SYSTEM_PROMPT_HEADING)
        .ok_or_else(|| LlmError::config(format!("missing fenced block after '{SYSTEM_PROMPT_HEADING}'")))?;
    let schema_text = extract_fenced_block(raw, JSON_SCHEMA_HEADING)
        .ok_or_else(|| LlmError::config(format!("missing fenced block after '{JSON_SCHEMA_HEADING}'")))?;
    let user_prompt_template = extract_fenced_block(raw, USER_PROMPT_HEADING)
        .ok_or_else(|| LlmError::config(format!("missing fenced block after '{USER_PROMPT_HEADING}'")))?;

    let json_schema: Value = serde_json::from_str(schema_text.trim())
        .map_err(|e| LlmError::config(format!("invalid JSON Schema block: {e}")))?;

    Ok(PromptContract {
        system_prompt: system_prompt.trim().to_string(),
        json_schema,
        user_prompt_template,
    })
}

/// Renders the user prompt template by substituting `{{field_name}}`
/// placeholders with the corresponding digest section.
pub fn render_user_prompt(template: &str, digest: &repo_summarizer_core::markdown::RepoDigest) -> String {
    template
        .replace("{{repository_metadata}}", &digest.repository_metadata)
        .replace("{{language_stats}}", &digest.language_stats)
        .replace("{{directory_tree}}", &digest.directory_tree)
        .replace("{{readme}}", &digest.readme)
        .replace("{{documentation}}", &digest.documentation)
        .replace("{{build_and_package_data}}", &digest.build_and_package_data)
        .replace("{{tests}}", &digest.tests)
        .replace("{{code}}", &digest.code)
}

fn extract_fenced_block(raw: &str, heading: &str) -> Option<String> {
    let lines: Vec<&str> = raw.lines().collect();
    let heading_idx = lines.iter().position(|l| l.trim() == heading)?;
    let mut i = heading_idx + 1;
    while i < lines.len() && !lines[i].trim_start().starts_with("```") {
        i += 1;
    }
    if i >= lines.len() {
        return None;
    }
    let fence_start = i + 1;
    let mut j = fence_start;
    while j < lines.len() && !lines[j].trim_start().starts_with("```") {
        j += 1;
    }
    if j >= lines.len() {
        return None;
    }
    Some(lines[fence_start..j].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = r#"
## System Prompt
```text
You are a repository summarizer.
```

## JSON Schema
```json
{"type": "object"}
```

## User Prompt Template
```text
Repo data: {{readme}}
```
"#;

    #[test]
    fn parses_all_three_sections() {
        let contract = parse_prompt_contract(CONTRACT).unwrap();
        assert_eq!(contract.system_prompt, "You are a repository summarizer.");
        assert!(contract.json_schema.is_object());
        assert!(contract.user_prompt_template.contains("{{readme}}"));
    }

    #[test]
    fn missing_section_is_a_config_error() {
        let partial = "## System Prompt\n```text\nhi\n```\n";
        assert!(parse_prompt_contract(partial).is_err());
    }
}
