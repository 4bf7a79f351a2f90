//! Flatten a decomposed note into the text blob and tag tokens used by the
//! client-side search index.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::decompose::{DecomposedNote, NoteKind};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const TAGS_KEY: &str = "tags";
const TAG_JOINER: &str = "-";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchText {
    pub text: String,
    pub tags: Vec<String>,
}

/// Normalize a tag: trimmed, lower-cased, whitespace runs joined with `-`.
pub fn normalize_tag(tag: &str) -> String {
    WHITESPACE_RE
        .replace_all(tag.trim(), TAG_JOINER)
        .to_lowercase()
}

pub fn build_search_text(note: &DecomposedNote) -> SearchText {
    let mut parts: Vec<&str> = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    if let Some(fm) = &note.frontmatter {
        for (key, value) in fm {
            let values = string_values(value);
            parts.extend(values.iter().copied());

            if key == TAGS_KEY {
                for raw_tag in values {
                    let tag = normalize_tag(raw_tag);
                    if !tag.is_empty() && !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
            }
        }
    }

    match (&note.kind, &note.markdown_content, &note.graph_data) {
        (NoteKind::Graph, Some(markdown), Some(graph)) => {
            parts.push(markdown);
            for node in &graph.nodes {
                if let Some(label) = &node.label {
                    parts.push(label);
                }
                if let Some(content) = &node.content {
                    parts.push(content);
                }
            }
        }
        _ => parts.push(&note.body),
    }

    let text = parts
        .into_iter()
        .chain(tags.iter().map(String::as_str))
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    SearchText { text, tags }
}

/// String and list-of-string values; everything else is opaque to search.
fn string_values(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::decompose::decompose;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  Machine   Learning "), "machine-learning");
        assert_eq!(normalize_tag("Rust"), "rust");
        assert_eq!(normalize_tag("a\tb\nc"), "a-b-c");
    }

    #[test]
    fn test_plain_note_search_text() {
        let raw = "---\ntitle: Weekly Review\ntags: [Deep Work, focus]\nrating: 5\n---\nBody text here.\n";
        let st = build_search_text(&decompose("review.md", raw));
        assert_eq!(st.tags, vec!["deep-work", "focus"]);
        assert!(st.text.contains("Weekly Review"));
        assert!(st.text.contains("Deep Work"));
        assert!(st.text.contains("deep-work"));
        assert!(st.text.contains("Body text here."));
        assert!(!st.text.contains('5'));
    }

    #[test]
    fn test_single_string_tag() {
        let st = build_search_text(&decompose("a.md", "---\ntags: Project X\n---\nx"));
        assert_eq!(st.tags, vec!["project-x"]);
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let st = build_search_text(&decompose("a.md", "---\ntags: [Rust, rust, ' RUST ']\n---\n"));
        assert_eq!(st.tags, vec!["rust"]);
    }

    #[test]
    fn test_graph_note_search_text_order() {
        let raw = "Outside text\n```json_graph\n{\"nodes\": [{\"label\": \"First\", \"content\": \"one\"}, {\"label\": \"Second\"}], \"edges\": []}\n```\n";
        let st = build_search_text(&decompose("m.graph.md", raw));
        assert_eq!(st.text, "Outside text\nFirst\none\nSecond");
        assert!(st.tags.is_empty());
    }

    #[test]
    fn test_graph_fallback_uses_body() {
        let raw = "Outside\n```json_graph\nnot json\n```\n";
        let st = build_search_text(&decompose("m.graph.md", raw));
        assert_eq!(st.text, raw);
    }

    #[test]
    fn test_no_frontmatter() {
        let st = build_search_text(&decompose("a.md", "just body"));
        assert_eq!(st, SearchText { text: "just body".to_string(), tags: vec![] });
    }
}
