//! Fence-aware top-level-heading boundary scanning.
//!
//! Grounded on the identical algorithm that appears independently in both
//! `repo_processor/parser.py::_known_section_boundaries` and
//! `llm_gate/markdown_parser.py::_known_boundaries`: walk the text
//! line-by-line, toggle an "inside a fenced code block" flag whenever a
//! line (after trimming) starts with three backticks, and only consider a
//! line a heading boundary when the flag is false. This is the critical
//! invariant the renderer and parser must agree on: headings inside
//! ```` ``` ```` blocks are never section boundaries.

/// Returns, in document order, the byte offset at which each matched
/// heading's line begins, together with the index into `headings` it
/// matched. A heading matches when the trimmed line is exactly equal to
/// one of the given heading strings (e.g. `"# Repository Metadata"`).
pub fn known_section_boundaries(body: &str, headings: &[&str]) -> Vec<(usize, usize)> {
    let mut boundaries = Vec::new();
    let mut offset = 0usize;
    let mut in_fence = false;

    for line in lines_with_ends(body) {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        let stripped = trimmed.trim();
        if stripped.starts_with("```") {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some(idx) = headings.iter().position(|h| *h == stripped) {
                boundaries.push((offset, idx));
            }
        }
        offset += line.len();
    }
    boundaries
}

/// Splits `body` into lines, each retaining its trailing `\n`/`\r\n` (the
/// last line may have none). Mirrors Python's `str.splitlines(keepends=True)`.
pub fn lines_with_ends(body: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let bytes = body.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            out.push(&body[start..=i]);
            start = i + 1;
        }
        i += 1;
    }
    if start < body.len() {
        out.push(&body[start..]);
    }
    out
}

/// Slices `body` at the given heading boundaries (as produced by
/// `known_section_boundaries`) into `(heading_index, trimmed_section_body)`
/// pairs, where the section body is everything after the heading's own
/// line up to the next boundary (or end of string).
pub fn slice_sections<'a>(body: &'a str, boundaries: &[(usize, usize)]) -> Vec<(usize, &'a str)> {
    let mut out = Vec::with_capacity(boundaries.len());
    for (i, (start, idx)) in boundaries.iter().enumerate() {
        let end = boundaries.get(i + 1).map(|(s, _)| *s).unwrap_or(body.len());
        let section = &body[*start..end];
        let after_heading = match section.find('\n') {
            Some(nl) => &section[nl + 1..],
            None => "",
        };
        out.push((*idx, after_heading.trim()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_heading_inside_fence() {
        let body = "# Readme\n```\n# Code\n```\nbody\n# Code\nreal code body\n";
        let boundaries = known_section_boundaries(body, &["# Readme", "# Code"]);
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].1, 0);
        assert_eq!(boundaries[1].1, 1);
    }

    #[test]
    fn slices_between_boundaries() {
        let body = "# A\nfirst\n# B\nsecond\n";
        let boundaries = known_section_boundaries(body, &["# A", "# B"]);
        let sections = slice_sections(body, &boundaries);
        assert_eq!(sections, vec![(0, "first"), (1, "second")]);
    }
}
