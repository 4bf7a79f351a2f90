//! Read-time view of a note: frontmatter, body and (for graph notes) the
//! embedded graph. Built fresh for every read and never cached.

use serde::Serialize;

use super::frontmatter::{parse_frontmatter, Frontmatter};
use super::graph::{extract_graph, GraphPayload};

pub const MARKDOWN_EXT: &str = ".md";
pub const GRAPH_EXT: &str = ".graph.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Markdown,
    Graph,
}

/// Classify a filename. `None` means it is not a note at all.
pub fn classify(name: &str) -> Option<NoteKind> {
    if name.ends_with(GRAPH_EXT) {
        Some(NoteKind::Graph)
    } else if name.ends_with(MARKDOWN_EXT) {
        Some(NoteKind::Markdown)
    } else {
        None
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecomposedNote {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub frontmatter: Option<Frontmatter>,
    /// Text after the frontmatter block
    pub body: String,
    /// Verbatim file contents, for lossless editing round-trips
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_data: Option<GraphPayload>,
}

/// Split `raw` into its parts. Graph extraction is only attempted for
/// `.graph.md` names; a graph note whose block is missing or invalid comes
/// back as plain markdown.
pub fn decompose(name: &str, raw: &str) -> DecomposedNote {
    let (frontmatter, body) = parse_frontmatter(raw);

    let mut note = DecomposedNote {
        name: name.to_string(),
        kind: NoteKind::Markdown,
        frontmatter,
        body: body.to_string(),
        content: raw.to_string(),
        markdown_content: None,
        graph_data: None,
    };

    if classify(name) == Some(NoteKind::Graph) {
        match extract_graph(body) {
            Some(extraction) => {
                note.kind = NoteKind::Graph;
                note.markdown_content = Some(extraction.markdown_content);
                note.graph_data = Some(extraction.graph_data);
            }
            None => log::debug!("{} has no usable json_graph block, serving as markdown", name),
        }
    }

    note
}
