//! UTF-8-safe truncation primitives shared by the context-budget processor.
//!
//! Grounded on `original_source/app/repo_processor/processor.py`'s
//! `_truncate_text`, `_truncate_file_blocks`, `_split_file_blocks`,
//! `_partial_block`, and `_truncate_utf8_prefix` (the same prefix-truncate
//! primitive also appears independently in `github_gate/client.py`; this
//! crate gives it one shared home rather than duplicating it per crate).

/// UTF-8 byte length, treating `None` bodies as length 0 at call sites.
pub fn utf8_len(s: &str) -> usize {
    s.len()
}

/// Prefix-truncates `s` to at most `max_bytes` UTF-8 bytes, using lossy
/// decoding so a multi-byte character straddling the cut point is dropped
/// rather than producing invalid UTF-8 (mirrors
/// `encoded[:max_bytes].decode("utf-8", errors="ignore")`).
pub fn truncate_utf8_prefix(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

/// Zero-budget sentinel; plain-text budget fits already; otherwise prefix
/// truncate. Returns `(content, was_truncated)`.
pub fn truncate_text(content: &str, max_bytes: usize) -> (String, bool) {
    if max_bytes == 0 {
        return ("Truncated to zero".to_string(), true);
    }
    if content.len() <= max_bytes {
        return (content.to_string(), false);
    }
    (truncate_utf8_prefix(content, max_bytes), true)
}

/// Splits file-block-formatted text on `^## File: ` boundaries, trimming
/// each block and dropping empty ones.
pub fn split_file_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut started = false;
    for line in content.split_inclusive('\n') {
        if line.starts_with("## File: ") {
            if started {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    blocks.push(trimmed.to_string());
                }
            }
            current = String::new();
            started = true;
        }
        current.push_str(line);
    }
    if started {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            blocks.push(trimmed.to_string());
        }
    }
    blocks
}

/// Builds a partial version of an overflowing file block that preserves
/// its header and opening fence, truncates the body to fit the remaining
/// budget (reserving room for a closing fence), and re-closes the fence.
/// If the header and fences alone don't fit, the header lines are
/// truncated as plain text with no fence at all.
pub fn partial_block(block: &str, max_bytes: usize) -> Option<String> {
    if max_bytes == 0 {
        return None;
    }
    let fence_suffix = "\n```";
    let lines: Vec<&str> = block.split_inclusive('\n').collect();
    let mut fence_line_idx = None;
    for (i, line) in lines.iter().enumerate() {
        if line.trim_end_matches('\n').trim_start() == "```text"
            || line.trim_end_matches('\n').trim_start().starts_with("```")
        {
            fence_line_idx = Some(i);
            break;
        }
    }
    let Some(fence_idx) = fence_line_idx else {
        return Some(truncate_utf8_prefix(block, max_bytes));
    };
    let header: String = lines[..=fence_idx].concat();
    let header_bytes = header.len();
    let suffix_bytes = fence_suffix.len();
    if header_bytes + suffix_bytes > max_bytes {
        return Some(truncate_utf8_prefix(block, max_bytes));
    }
    let body_budget = max_bytes - header_bytes - suffix_bytes;
    let body_start = fence_idx + 1;
    let rest: String = lines[body_start..].concat();
    let body_only = rest.strip_suffix("\n```").unwrap_or(&rest);
    let truncated_body = truncate_utf8_prefix(body_only, body_budget);
    Some(format!("{header}{truncated_body}{fence_suffix}"))
}

/// Greedily keeps whole file blocks until one would overflow, then
/// includes a single partial block for the first overflowing file and
/// stops — later, smaller blocks are never considered once an overflow
/// has been hit, matching the original's behavior exactly.
pub fn truncate_file_blocks(content: &str, max_bytes: usize) -> (String, bool) {
    if max_bytes == 0 {
        return ("Truncated to zero".to_string(), true);
    }
    if content.len() <= max_bytes {
        return (content.to_string(), false);
    }
    let blocks = split_file_blocks(content);
    let mut used = 0usize;
    let mut kept: Vec<String> = Vec::new();
    let mut truncated = false;
    for block in blocks {
        let block_bytes = block.len() + 2; // joined with "\n\n"
        if used + block_bytes <= max_bytes {
            used += block_bytes;
            kept.push(block);
        } else {
            let remaining = max_bytes.saturating_sub(used);
            if let Some(partial) = partial_block(&block, remaining) {
                if !partial.trim().is_empty() {
                    kept.push(partial);
                }
            }
            truncated = true;
            break;
        }
    }
    (kept.join("\n\n"), truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_utf8_prefix_avoids_splitting_multibyte_char() {
        let s = "a\u{00e9}b"; // 'a', é (2 bytes), 'b'
        let truncated = truncate_utf8_prefix(s, 2);
        assert!(truncated.is_char_boundary(truncated.len()));
        assert_eq!(truncated, "a");
    }

    #[test]
    fn truncate_text_zero_budget_sentinel() {
        let (body, truncated) = truncate_text("hello", 0);
        assert_eq!(body, "Truncated to zero");
        assert!(truncated);
    }

    #[test]
    fn split_file_blocks_drops_empty() {
        let content = "## File: a.rs\nbody a\n\n## File: b.rs\nbody b\n";
        let blocks = split_file_blocks(content);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("## File: a.rs"));
    }

    #[test]
    fn truncate_file_blocks_keeps_whole_blocks_then_stops_at_first_overflow() {
        let content = "## File: a.rs\n- Source: n/a\n```text\nAAAA\n```\n\n## File: b.rs\n- Source: n/a\n```text\nBBBB\n```\n";
        let (out, truncated) = truncate_file_blocks(content, 60);
        assert!(truncated);
        assert!(out.contains("## File: a.rs"));
    }
}
