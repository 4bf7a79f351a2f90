//! Split a leading YAML frontmatter block off raw note text.
//!
//! A block is a first line of exactly `---`, YAML lines, and a closing line
//! of exactly `---` (followed by a newline or end of text). Anything that
//! does not match, or whose YAML is not a mapping, degrades to "no
//! frontmatter" with the full text kept as body.

use serde_json::{Map, Value};

/// Parsed frontmatter mapping. Values keep whatever shape the YAML had.
pub type Frontmatter = Map<String, Value>;

const DELIMITER: &str = "---";

/// Parse the frontmatter block at the top of `raw`.
///
/// Returns `(Some(map), body)` when a well-formed block is present, and
/// `(None, raw)` otherwise. Never fails.
pub fn parse_frontmatter(raw: &str) -> (Option<Frontmatter>, &str) {
    let Some((yaml, body)) = split_block(raw) else {
        return (None, raw);
    };

    match parse_block(yaml) {
        Some(fm) => (Some(fm), body),
        None => (None, raw),
    }
}

/// Locate the delimited block, returning (yaml, body_after_block).
fn split_block(raw: &str) -> Option<(&str, &str)> {
    let rest = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let content = content.strip_suffix('\r').unwrap_or(content);
        if content == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

fn parse_block(yaml: &str) -> Option<Frontmatter> {
    if yaml.trim().is_empty() {
        return Some(Frontmatter::new());
    }

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Object(map)) => Some(map),
        Ok(Value::Null) => Some(Frontmatter::new()),
        Ok(other) => {
            log::debug!("Frontmatter is not a mapping ({}), treating as body", kind_of(&other));
            None
        }
        Err(e) => {
            log::debug!("Malformed frontmatter, treating as body: {}", e);
            None
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
