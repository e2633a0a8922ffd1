//! Context assembly — builds the message list for one model invocation.
//!
//! The assembled context is one synthesized `system` message (instructional
//! preamble plus the embedded document snapshot) followed by the stored
//! history in order. Assembly is pure: identical inputs produce identical
//! output, and neither the history nor the document is mutated.
//!
//! The document is embedded verbatim unless `max_document_chars` is set, in
//! which case the embedded copy is cut to the configured end (`head` keeps
//! the beginning, `tail` keeps the end) with a short truncation notice. The
//! store itself is never touched.

use coscribe_config::{ContextConfig, TruncatePolicy};
use coscribe_core::message::Message;
use coscribe_document::DocumentVersion;

/// Embedded in place of the document when it has no content, so the model
/// does not invent one.
pub const EMPTY_DOCUMENT_PLACEHOLDER: &str = "(the document is currently empty)";

/// Stateless assembler. Create one per session and reuse it.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    preamble: String,
    max_document_chars: Option<usize>,
    truncate: TruncatePolicy,
}

impl ContextAssembler {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            preamble: config.system_preamble.clone(),
            max_document_chars: config.max_document_chars,
            truncate: config.truncate,
        }
    }

    /// Build the full message list: synthesized system message first, then
    /// every message of `history` in stored order.
    pub fn assemble(&self, history: &[Message], document: &DocumentVersion) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(self.render_system(document)));
        messages.extend(history.iter().cloned());
        messages
    }

    /// The synthesized system message content for a given document snapshot.
    pub fn render_system(&self, document: &DocumentVersion) -> String {
        let body = if document.content.is_empty() {
            EMPTY_DOCUMENT_PLACEHOLDER.to_string()
        } else {
            self.render_document(&document.content)
        };
        format!("{}\n\nCurrent document:\n{}", self.preamble, body)
    }

    fn render_document(&self, content: &str) -> String {
        let Some(limit) = self.max_document_chars else {
            return content.to_string();
        };
        let total = content.chars().count();
        if total <= limit {
            return content.to_string();
        }

        // Cut on char boundaries; byte indexing could split a code point.
        match self.truncate {
            TruncatePolicy::Head => {
                let kept: String = content.chars().take(limit).collect();
                format!(
                    "{kept}\n\n[document truncated: showing the first {limit} of {total} characters]"
                )
            }
            TruncatePolicy::Tail => {
                let kept: String = content.chars().skip(total - limit).collect();
                format!(
                    "[document truncated: showing the last {limit} of {total} characters]\n\n{kept}"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coscribe_core::message::Role;

    fn snapshot(content: &str) -> DocumentVersion {
        DocumentVersion {
            content: content.into(),
            sequence: 1,
            created_at: chrono::Utc::now(),
        }
    }

    fn assembler_with(max: Option<usize>, truncate: TruncatePolicy) -> ContextAssembler {
        let config = ContextConfig {
            max_document_chars: max,
            truncate,
            ..ContextConfig::default()
        };
        ContextAssembler::new(&config)
    }

    #[test]
    fn system_message_comes_first() {
        let asm = ContextAssembler::new(&ContextConfig::default());
        let history = vec![Message::user("hello"), Message::assistant("hi")];

        let messages = asm.assemble(&history, &snapshot("# Draft"));
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("# Draft"));
    }

    #[test]
    fn stripping_system_message_reproduces_history() {
        let asm = ContextAssembler::new(&ContextConfig::default());
        let history = vec![
            Message::user("first"),
            Message::assistant("second"),
            Message::user("third"),
        ];

        let messages = asm.assemble(&history, &snapshot("doc"));
        let rest: Vec<String> = messages[1..].iter().map(|m| m.content.clone()).collect();
        let original: Vec<String> = history.iter().map(|m| m.content.clone()).collect();
        assert_eq!(rest, original);
    }

    #[test]
    fn preamble_included_in_system_message() {
        let asm = ContextAssembler::new(&ContextConfig::default());
        let messages = asm.assemble(&[], &snapshot("text"));
        assert!(messages[0].content.contains("writing assistant"));
    }

    #[test]
    fn empty_document_gets_placeholder() {
        let asm = ContextAssembler::new(&ContextConfig::default());
        let messages = asm.assemble(&[], &snapshot(""));
        assert!(messages[0].content.contains(EMPTY_DOCUMENT_PLACEHOLDER));
    }

    #[test]
    fn document_embedded_verbatim_without_limit() {
        let asm = ContextAssembler::new(&ContextConfig::default());
        let long = "x".repeat(50_000);
        let messages = asm.assemble(&[], &snapshot(&long));
        assert!(messages[0].content.contains(&long));
        assert!(!messages[0].content.contains("truncated"));
    }

    #[test]
    fn under_limit_document_is_not_truncated() {
        let asm = assembler_with(Some(100), TruncatePolicy::Head);
        let messages = asm.assemble(&[], &snapshot("short document"));
        assert!(messages[0].content.contains("short document"));
        assert!(!messages[0].content.contains("truncated"));
    }

    #[test]
    fn head_truncation_keeps_beginning() {
        let asm = assembler_with(Some(5), TruncatePolicy::Head);
        let messages = asm.assemble(&[], &snapshot("abcdefghij"));
        let system = &messages[0].content;
        assert!(system.contains("abcde"));
        assert!(!system.contains("abcdef"));
        assert!(system.contains("showing the first 5 of 10 characters"));
    }

    #[test]
    fn tail_truncation_keeps_end() {
        let asm = assembler_with(Some(5), TruncatePolicy::Tail);
        let messages = asm.assemble(&[], &snapshot("abcdefghij"));
        let system = &messages[0].content;
        assert!(system.contains("fghij"));
        assert!(!system.contains("efghij"));
        assert!(system.contains("showing the last 5 of 10 characters"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 6 chars, 12 bytes; a byte cut at 5 would split a code point.
        let asm = assembler_with(Some(5), TruncatePolicy::Head);
        let messages = asm.assemble(&[], &snapshot("éééééé"));
        assert!(messages[0].content.contains("ééééé"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let asm = assembler_with(Some(8), TruncatePolicy::Tail);
        let history = vec![Message::user("q")];
        let doc = snapshot("a somewhat longer document");

        let first = asm.assemble(&history, &doc);
        let second = asm.assemble(&history, &doc);
        assert_eq!(first[0].content, second[0].content);
    }
}
