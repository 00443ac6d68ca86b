//! Snapshot rendering helpers.
//!
//! Functions for converting a document into a plain-text outline suitable
//! for snapshot testing and assertions.

use crate::dom::{Dom, ElementData, NodeId};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render the whole document as an indented outline.
///
/// One element per line, two spaces of indent per level:
/// `tag#id.class1.class2 [name="value" ...]`, with ` (hidden)` appended for
/// elements that are not displayed. Lines are separated by `'\n'`; the final
/// line has no trailing newline.
///
/// # Examples
///
/// ```ignore
/// use foundation_core::dom::{Dom, ElementData};
/// use foundation_core::testing::dom_outline;
///
/// let (mut dom, body) = Dom::with_body();
/// dom.insert_child(body, ElementData::new("div").with_id("a"));
/// assert_eq!(dom_outline(&dom), "html\n  body\n    div#a");
/// ```
pub fn dom_outline(dom: &Dom) -> String {
    match dom.root() {
        Some(root) => outline_from(dom, root),
        None => String::new(),
    }
}

/// Render the subtree under `start` (inclusive) as an indented outline.
pub fn outline_from(dom: &Dom, start: NodeId) -> String {
    let mut lines = Vec::new();
    write_node(dom, start, 0, &mut lines);
    lines.join("\n")
}

/// Render one element as `tag#id.classes [attrs]`.
pub fn describe(data: &ElementData) -> String {
    let mut out = data.tag.clone();
    if let Some(id) = &data.id {
        out.push('#');
        out.push_str(id);
    }
    for class in &data.classes {
        out.push('.');
        out.push_str(class);
    }
    if !data.attributes.is_empty() {
        let attrs: Vec<String> = data
            .attributes
            .iter()
            .map(|(name, value)| format!("{name}=\"{value}\""))
            .collect();
        out.push_str(" [");
        out.push_str(&attrs.join(" "));
        out.push(']');
    }
    if !data.visible {
        out.push_str(" (hidden)");
    }
    out
}

fn write_node(dom: &Dom, node: NodeId, depth: usize, lines: &mut Vec<String>) {
    let Some(data) = dom.get(node) else { return };
    lines.push(format!("{}{}", "  ".repeat(depth), describe(data)));
    for &child in dom.children(node) {
        write_node(dom, child, depth + 1, lines);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
