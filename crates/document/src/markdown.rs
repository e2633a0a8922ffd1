//! Markdown processing helpers.
//!
//! Header extraction and table-of-contents generation, light formatting
//! normalization, fenced code block extraction, and detection of the
//! assistant's document-update suggestions. All pure text functions.

use regex_lite::Regex;

/// The phrase the assistant uses to propose a document edit. Everything
/// after it (or the first fenced block after it) is the suggested content.
pub const UPDATE_MARKER: &str = "I'll update the document with:";

/// An ATX header (`#` through `######`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// 1 for `#`, 6 for `######`
    pub level: usize,
    pub text: String,
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The fence's language tag, or "text" when absent
    pub language: String,
    pub content: String,
}

fn regex(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

/// Extract all ATX headers in document order.
pub fn extract_headers(text: &str) -> Vec<Header> {
    let Some(re) = regex(r"^(#{1,6})\s+(.+)$") else {
        return Vec::new();
    };

    text.lines()
        .filter_map(|line| {
            re.captures(line).map(|caps| Header {
                level: caps[1].len(),
                text: caps[2].trim().to_string(),
            })
        })
        .collect()
}

/// Generate a markdown table of contents.
///
/// A leading H1 is treated as the document title and skipped. Anchors are
/// GitHub-style: lowercased, spaces replaced with hyphens. Returns an empty
/// string for a document without headers.
pub fn table_of_contents(text: &str) -> String {
    let headers = extract_headers(text);
    if headers.is_empty() {
        return String::new();
    }

    let mut toc = vec!["# Table of Contents\n".to_string()];
    for (index, header) in headers.iter().enumerate() {
        if header.level == 1 && index == 0 {
            continue;
        }
        let indent = "  ".repeat(header.level - 1);
        let anchor = header.text.to_lowercase().replace(' ', "-");
        toc.push(format!("{indent}- [{}](#{anchor})", header.text));
    }
    toc.join("\n")
}

/// Normalize markdown for consistent styling.
///
/// CRLF becomes LF, `#Header` gains a space, bare list bullets gain a space,
/// and a header line is followed by a blank line. Content is otherwise left
/// alone.
pub fn format_markdown(text: &str) -> String {
    let mut formatted = text.replace("\r\n", "\n");

    if let Some(re) = regex(r"(?m)^(#{1,6})([^ #])") {
        formatted = re.replace_all(&formatted, "${1} ${2}").into_owned();
    }
    if let Some(re) = regex(r"(?m)^(\s*[-*+])([^ ])") {
        formatted = re.replace_all(&formatted, "${1} ${2}").into_owned();
    }
    if let Some(re) = regex(r"(\n#{1,6} .+\n)([^\n])") {
        formatted = re.replace_all(&formatted, "${1}\n${2}").into_owned();
    }

    formatted
}

/// Extract fenced code blocks in document order.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    let Some(re) = regex(r"(?s)```(\w*)\n(.*?)```") else {
        return Vec::new();
    };

    re.captures_iter(text)
        .map(|caps| {
            let language = caps[1].to_string();
            CodeBlock {
                language: if language.is_empty() {
                    "text".to_string()
                } else {
                    language
                },
                content: caps[2].to_string(),
            }
        })
        .collect()
}

/// Detect a document-update suggestion in an assistant reply.
///
/// Returns the suggested replacement content: the first fenced block after
/// [`UPDATE_MARKER`] when one is present, otherwise the remainder of the
/// reply. `None` when the marker is absent or nothing follows it.
pub fn extract_document_update(reply: &str) -> Option<String> {
    let marker_index = reply.find(UPDATE_MARKER)?;
    let remainder = reply[marker_index + UPDATE_MARKER.len()..].trim();
    if remainder.is_empty() {
        return None;
    }

    let blocks = extract_code_blocks(remainder);
    match blocks.into_iter().next() {
        Some(block) => {
            let content = block.content.trim();
            if content.is_empty() {
                None
            } else {
                Some(content.to_string())
            }
        }
        None => Some(remainder.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Title\n\nIntro text.\n\n## Background\n\nStuff.\n\n### Details\n\nMore.\n\n## Conclusion\n\nEnd.\n";

    #[test]
    fn extracts_headers_with_levels() {
        let headers = extract_headers(DOC);
        let summary: Vec<(usize, &str)> = headers
            .iter()
            .map(|h| (h.level, h.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Title"),
                (2, "Background"),
                (3, "Details"),
                (2, "Conclusion"),
            ]
        );
    }

    #[test]
    fn ignores_hashes_inside_text() {
        let headers = extract_headers("a line with # not a header\n####### seven is too many\n");
        assert!(headers.is_empty());
    }

    #[test]
    fn toc_skips_leading_title_and_indents() {
        let toc = table_of_contents(DOC);
        assert!(toc.starts_with("# Table of Contents\n"));
        assert!(!toc.contains("[Title]"));
        assert!(toc.contains("  - [Background](#background)"));
        assert!(toc.contains("    - [Details](#details)"));
        assert!(toc.contains("  - [Conclusion](#conclusion)"));
    }

    #[test]
    fn toc_anchor_replaces_spaces() {
        let toc = table_of_contents("# T\n\n## Energy Storage Notes\n");
        assert!(toc.contains("(#energy-storage-notes)"));
    }

    #[test]
    fn toc_empty_without_headers() {
        assert_eq!(table_of_contents("plain prose only\n"), "");
    }

    #[test]
    fn format_adds_space_after_header_hashes() {
        let formatted = format_markdown("#Title\n##Section\n");
        assert!(formatted.contains("# Title"));
        assert!(formatted.contains("## Section"));
    }

    #[test]
    fn format_adds_space_after_list_bullets() {
        let formatted = format_markdown("-one\n* two\n+three\n");
        assert!(formatted.contains("- one"));
        assert!(formatted.contains("* two"));
        assert!(formatted.contains("+ three"));
    }

    #[test]
    fn format_normalizes_crlf_and_header_spacing() {
        let formatted = format_markdown("# Title\r\nBody right after.\n");
        assert!(!formatted.contains('\r'));
        // A blank line is inserted between the header and the body.
        assert!(formatted.contains("\nBody") || formatted.starts_with("# Title\n\nBody"));
    }

    #[test]
    fn extracts_code_blocks_with_language() {
        let text = "before\n```rust\nfn main() {}\n```\nafter\n```\nplain\n```\n";
        let blocks = extract_code_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "rust");
        assert_eq!(blocks[0].content, "fn main() {}\n");
        assert_eq!(blocks[1].language, "text");
        assert_eq!(blocks[1].content, "plain\n");
    }

    #[test]
    fn update_suggestion_prefers_fenced_block() {
        let reply = format!("{UPDATE_MARKER}\n```markdown\n# New Draft\n\nBody.\n```\n");
        let update = extract_document_update(&reply).unwrap();
        assert_eq!(update, "# New Draft\n\nBody.");
    }

    #[test]
    fn update_suggestion_falls_back_to_plain_text() {
        let reply = format!("Sure. {UPDATE_MARKER}\n# New Draft\n\nBody.");
        let update = extract_document_update(&reply).unwrap();
        assert_eq!(update, "# New Draft\n\nBody.");
    }

    #[test]
    fn no_marker_means_no_update() {
        assert!(extract_document_update("Here is a summary of the draft.").is_none());
        assert!(extract_document_update(&format!("{UPDATE_MARKER}   ")).is_none());
    }
}
