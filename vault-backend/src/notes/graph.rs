//! Embedded graph payloads for `.graph.md` notes.
//!
//! The payload lives in the first fenced block tagged `json_graph`:
//!
//! ````text
//! ```json_graph
//! {"nodes": [{"id": 1, "label": "A"}], "edges": []}
//! ```
//! ````

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const GRAPH_FENCE_TAG: &str = "json_graph";
const FENCE: &str = "```";

/// Parsed graph payload. Unknown fields on nodes are kept so the client
/// gets back exactly what was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq)]
pub struct GraphExtraction {
    /// Body with the fenced block removed, trimmed
    pub markdown_content: String,
    pub graph_data: GraphPayload,
}

/// Find and parse the first `json_graph` block in `body`.
///
/// Returns `None` both when no block exists and when the block's contents
/// are not a valid payload; callers treat the note as plain markdown then.
pub fn extract_graph(body: &str) -> Option<GraphExtraction> {
    let (start, inner, end) = locate_block(body)?;

    let graph_data: GraphPayload = match serde_json::from_str(inner) {
        Ok(g) => g,
        Err(e) => {
            log::debug!("Invalid json_graph payload, falling back to markdown: {}", e);
            return None;
        }
    };

    let mut markdown_content = String::with_capacity(body.len());
    markdown_content.push_str(&body[..start]);
    markdown_content.push_str(&body[end..]);

    Some(GraphExtraction {
        markdown_content: markdown_content.trim().to_string(),
        graph_data,
    })
}

/// Returns (block_start, inner_text, block_end) as byte offsets into `body`.
/// The block spans from the opening fence line through the closing fence
/// line, including its newline.
fn locate_block(body: &str) -> Option<(usize, &str, usize)> {
    let mut offset = 0;
    let mut open: Option<(usize, usize)> = None;

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim();
        match open {
            None => {
                if trimmed.strip_prefix(FENCE).map(str::trim) == Some(GRAPH_FENCE_TAG) {
                    open = Some((offset, offset + line.len()));
                }
            }
            Some((start, inner_start)) => {
                if trimmed == FENCE {
                    let end = offset + line.len();
                    return Some((start, &body[inner_start..offset], end));
                }
            }
        }
        offset += line.len();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GRAPH_NOTE: &str = "# Map\n\nIntro text.\n\n```json_graph\n{\"nodes\": [{\"id\": \"a\", \"label\": \"Alpha\", \"content\": \"first\"}, {\"id\": \"b\"}], \"edges\": [{\"from\": \"a\", \"to\": \"b\"}]}\n```\n\nOutro.\n";

    #[test]
    fn test_extract_graph() {
        let extraction = extract_graph(GRAPH_NOTE).expect("graph should parse");
        assert_eq!(extraction.markdown_content, "# Map\n\nIntro text.\n\n\nOutro.");
        assert_eq!(extraction.graph_data.nodes.len(), 2);
        assert_eq!(extraction.graph_data.nodes[0].label.as_deref(), Some("Alpha"));
        assert_eq!(extraction.graph_data.nodes[0].content.as_deref(), Some("first"));
        assert_eq!(extraction.graph_data.nodes[0].extra["id"], json!("a"));
        assert!(extraction.graph_data.nodes[1].label.is_none());
        assert_eq!(extraction.graph_data.edges, vec![json!({"from": "a", "to": "b"})]);
    }

    #[test]
    fn test_node_extra_fields_round_trip() {
        let extraction = extract_graph(GRAPH_NOTE).unwrap();
        let value = serde_json::to_value(&extraction.graph_data.nodes[0]).unwrap();
        assert_eq!(value, json!({"id": "a", "label": "Alpha", "content": "first"}));
    }

    #[test]
    fn test_missing_block_falls_back() {
        assert!(extract_graph("# No graph here\n\n```rust\nfn main() {}\n```\n").is_none());
    }

    #[test]
    fn test_invalid_payload_falls_back() {
        let body = "```json_graph\n{not json\n```\n";
        assert!(extract_graph(body).is_none());
    }

    #[test]
    fn test_payload_without_edges_falls_back() {
        let body = "```json_graph\n{\"nodes\": []}\n```\n";
        assert!(extract_graph(body).is_none());
    }

    #[test]
    fn test_unterminated_fence_falls_back() {
        let body = "```json_graph\n{\"nodes\": [], \"edges\": []}\n";
        assert!(extract_graph(body).is_none());
    }

    #[test]
    fn test_only_first_block_is_extracted() {
        let body = "```json_graph\n{\"nodes\": [], \"edges\": []}\n```\ntext\n```json_graph\n{\"nodes\": [{\"label\": \"second\"}], \"edges\": []}\n```\n";
        let extraction = extract_graph(body).unwrap();
        assert!(extraction.graph_data.nodes.is_empty());
        assert!(extraction.markdown_content.starts_with("text\n```json_graph"));
    }
}
