//! Plain-text extraction for Atlassian Document Format (ADF) descriptions.
//!
//! Jira returns issue descriptions as a recursive node tree rather than a
//! string. This module collapses that tree into plain text suitable for a
//! form field or an LLM prompt.
//!
//! # Node Model
//!
//! Raw JSON nodes are classified once, on parse, into a closed set:
//!
//! | Variant | Raw shape | Text contribution |
//! |---------|-----------|-------------------|
//! | [`DocumentNode::Text`] | `type = "text"` with a non-empty `text` | the text, verbatim |
//! | [`DocumentNode::Container`] | any node with a `content` array | children concatenated in order |
//! | [`DocumentNode::Other`] | anything else | nothing |
//!
//! Unknown node kinds (mentions, media, emoji without children) land in
//! `Other` and contribute empty text.
//!
//! # Paragraphs
//!
//! Each top-level child of the document is a paragraph. Paragraphs are
//! trimmed, empty ones are dropped, and the survivors are joined with a
//! blank line:
//!
//! ```rust
//! use serde_json::json;
//! use story_intake::adf::description_to_text;
//!
//! let doc = json!({
//!     "type": "doc",
//!     "content": [
//!         { "type": "paragraph", "content": [{ "type": "text", "text": "Hello" }] },
//!         { "type": "paragraph", "content": [] },
//!         { "type": "paragraph", "content": [{ "type": "text", "text": "World" }] }
//!     ]
//! });
//! assert_eq!(description_to_text(Some(&doc)), "Hello\n\nWorld");
//! ```
//!
//! Extraction never fails. Malformed input yields empty text so one bad
//! description cannot break a whole search response.

use serde_json::Value;

/// Separator placed between non-empty paragraphs.
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// A single node of a rich-text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNode {
    /// Leaf carrying literal text.
    Text { text: String },
    /// Node with ordered children and no text of its own.
    Container {
        kind: String,
        children: Vec<DocumentNode>,
    },
    /// Any node that is neither text nor container.
    Other { kind: String },
}

impl DocumentNode {
    /// Classifies a raw JSON node. Total: every JSON value maps to a node.
    pub fn from_value(value: &Value) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if kind == "text" {
            if let Some(text) = value.get("text").and_then(Value::as_str) {
                if !text.is_empty() {
                    return DocumentNode::Text {
                        text: text.to_string(),
                    };
                }
            }
        }

        match value.get("content").and_then(Value::as_array) {
            Some(children) => DocumentNode::Container {
                kind,
                children: children.iter().map(DocumentNode::from_value).collect(),
            },
            None => DocumentNode::Other { kind },
        }
    }

    /// Builds a text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        DocumentNode::Text { text: text.into() }
    }

    /// Builds a container with the given kind and children.
    pub fn container(kind: impl Into<String>, children: Vec<DocumentNode>) -> Self {
        DocumentNode::Container {
            kind: kind.into(),
            children,
        }
    }
}

/// A document root. Its children are the paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub children: Vec<DocumentNode>,
}

impl Document {
    /// Parses a raw description. Returns `None` when the value has no
    /// top-level `content` array.
    pub fn from_value(value: &Value) -> Option<Self> {
        let children = value.get("content")?.as_array()?;
        Some(Document {
            children: children.iter().map(DocumentNode::from_value).collect(),
        })
    }
}

/// Flattens a node into text. Absent nodes yield an empty string.
pub fn extract_text(node: Option<&DocumentNode>) -> String {
    let mut out = String::new();
    if let Some(node) = node {
        append_text(node, &mut out);
    }
    out
}

fn append_text(node: &DocumentNode, out: &mut String) {
    match node {
        DocumentNode::Text { text } => out.push_str(text),
        DocumentNode::Container { children, .. } => {
            for child in children {
                append_text(child, out);
            }
        }
        DocumentNode::Other { .. } => {}
    }
}

/// Converts a document into paragraphs separated by blank lines.
///
/// Each top-level child is extracted and trimmed; paragraphs that end up
/// empty (e.g. an empty formatting wrapper) are discarded.
pub fn document_to_text(document: Option<&Document>) -> String {
    let Some(document) = document else {
        return String::new();
    };

    document
        .children
        .iter()
        .map(|paragraph| extract_text(Some(paragraph)).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

/// Converts a raw Jira `description` field into plain text.
///
/// `None`, `null`, and documents without a `content` array all produce an
/// empty string.
pub fn description_to_text(description: Option<&Value>) -> String {
    let document = description.and_then(Document::from_value);
    document_to_text(document.as_ref())
}
