//! Tree operations: insert, remove, reparent, walk, and element state.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{ElementData, NodeId};
use crate::geometry::Rect;
use crate::plugin::PluginHandle;

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The document, backed by a slotmap arena.
///
/// All elements live in a single `SlotMap`. Parent/child relationships and
/// plugin back-references are stored in secondary maps so that removal is
/// O(subtree size) and lookup is O(1). The first inserted node is the
/// document root (`<html>`); its `dir` attribute decides text direction.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, ElementData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    instances: SecondaryMap<NodeId, PluginHandle>,
    root: Option<NodeId>,
    focused: Option<NodeId>,
    mutations: Vec<NodeId>,
}

impl Dom {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            instances: SecondaryMap::new(),
            root: None,
            focused: None,
            mutations: Vec::new(),
        }
    }

    /// Create a document with an `<html>` root and a `<body>` child.
    ///
    /// Returns the document and the body id.
    pub fn with_body() -> (Self, NodeId) {
        let mut dom = Self::new();
        let html = dom.insert(ElementData::new("html"));
        let body = dom.insert_child(html, ElementData::new("body"));
        (dom, body)
    }

    /// Insert a parentless node. The first one becomes the document root.
    pub fn insert(&mut self, data: ElementData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: ElementData) -> NodeId {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        self.mutations.push(parent);
        id
    }

    /// Remove a node and all its descendants.
    ///
    /// Plugin back-references held by removed elements are dropped with them.
    /// Returns the `ElementData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<ElementData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
            self.mutations.push(parent_id);
        }

        if self.root == Some(id) {
            self.root = None;
        }

        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            self.instances.remove(current);
            if self.focused == Some(current) {
                self.focused = None;
            }
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Move `node` to become the last child of `new_parent`.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        debug_assert!(self.nodes.contains_key(node), "node does not exist");
        debug_assert!(self.nodes.contains_key(new_parent), "new_parent does not exist");

        if let Some(old_parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != node);
            }
            self.mutations.push(old_parent);
        }

        self.parent.insert(node, new_parent);
        if let Some(siblings) = self.children.get_mut(new_parent) {
            siblings.push(node);
        }
        self.mutations.push(new_parent);
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node; empty if none or unknown.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(EMPTY_CHILDREN)
    }

    /// Ancestors from the immediate parent up to the root (excluding `id`).
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `node` is `ancestor` or lies inside it.
    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    /// Immutable access to an element.
    pub fn get(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes.get(id)
    }

    /// Mutable access to an element. Changes made here are not logged as
    /// mutations; prefer the attribute/class helpers for observed elements.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id)
    }

    /// The document root, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the document contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from (and including) `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Descendants of `start` in document order, excluding `start`.
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut all = self.walk_depth_first(start);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    // ── Element state ────────────────────────────────────────────────

    /// Whether the document is right-to-left (`<html dir="rtl">`).
    pub fn is_rtl(&self) -> bool {
        self.root
            .and_then(|r| self.get(r))
            .and_then(|html| html.attr("dir"))
            .is_some_and(|dir| dir.eq_ignore_ascii_case("rtl"))
    }

    /// Read an attribute of an element.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|data| data.attr(name))
    }

    /// Set an attribute and log the mutation. Returns `false` for unknown nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        let Some(data) = self.nodes.get_mut(id) else {
            return false;
        };
        data.set_attribute(name, value.into());
        self.mutations.push(id);
        true
    }

    /// Remove an attribute and log the mutation if it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let removed = self.nodes.get_mut(id)?.remove_attribute(name);
        if removed.is_some() {
            self.mutations.push(id);
        }
        removed
    }

    /// Whether an element carries a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id).is_some_and(|data| data.has_class(class))
    }

    /// Add a class and log the mutation.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(id) {
            if !data.has_class(class) {
                data.add_class(class);
                self.mutations.push(id);
            }
        }
    }

    /// Remove a class and log the mutation.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(id) {
            if data.has_class(class) {
                data.remove_class(class);
                self.mutations.push(id);
            }
        }
    }

    /// Show or hide an element (`display` toggling).
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(data) = self.nodes.get_mut(id) {
            if data.visible != visible {
                data.visible = visible;
                self.mutations.push(id);
            }
        }
    }

    /// Whether the element and all its ancestors are displayed.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|d| d.visible)
            && self
                .ancestors(id)
                .into_iter()
                .all(|a| self.get(a).is_some_and(|d| d.visible))
    }

    /// The measured box of an element.
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.get(id).map(|data| data.rect)
    }

    /// Replace the measured box of an element (style change, logged).
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.rect = rect;
            self.mutations.push(id);
        }
    }

    /// Drain the nodes touched since the last call, in mutation order.
    pub fn take_mutations(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.mutations)
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// `document.activeElement`.
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move focus to `id`. Returns `false` for unknown nodes.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if self.nodes.contains_key(id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    // ── Plugin back-references ───────────────────────────────────────

    /// The plugin instance stored on an element (`data('zfPlugin')`).
    pub fn plugin(&self, id: NodeId) -> Option<&PluginHandle> {
        self.instances.get(id)
    }

    /// Store a plugin back-reference. Refuses to overwrite an existing one.
    pub(crate) fn attach_plugin(&mut self, id: NodeId, handle: PluginHandle) -> bool {
        if !self.nodes.contains_key(id) || self.instances.contains_key(id) {
            return false;
        }
        self.instances.insert(id, handle);
        true
    }

    /// Drop the plugin back-reference from an element.
    pub(crate) fn detach_plugin(&mut self, id: NodeId) -> Option<PluginHandle> {
        self.instances.remove(id)
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(ElementData::new("html"));
        let a = dom.insert_child(root, ElementData::new("div").with_id("a"));
        let b = dom.insert_child(root, ElementData::new("div").with_id("b"));
        let c = dom.insert_child(a, ElementData::new("button").with_id("c"));
        let d = dom.insert_child(a, ElementData::new("span").with_id("d"));
        dom.take_mutations();
        (dom, root, a, b, c, d)
    }

    #[test]
    fn first_insert_is_root() {
        let mut dom = Dom::new();
        let first = dom.insert(ElementData::new("html"));
        let _second = dom.insert(ElementData::new("div"));
        assert_eq!(dom.root(), Some(first));
    }

    #[test]
    fn with_body_builds_html_body() {
        let (dom, body) = Dom::with_body();
        let root = dom.root().unwrap();
        assert_eq!(dom.get(root).unwrap().tag, "html");
        assert_eq!(dom.parent(body), Some(root));
    }

    #[test]
    fn parent_children_ancestors() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert!(dom.ancestors(root).is_empty());
        assert!(dom.is_inclusive_descendant(c, a));
        assert!(dom.is_inclusive_descendant(a, a));
        assert!(!dom.is_inclusive_descendant(b, a));
    }

    #[test]
    fn walk_and_descendants_are_document_order() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(dom.descendants(a), vec![c, d]);
        assert!(dom.descendants(d).is_empty());
    }

    #[test]
    fn remove_subtree_drops_focus() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        dom.focus(c);
        dom.remove(a);
        assert!(!dom.contains(c));
        assert_eq!(dom.active_element(), None);
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_nonexistent() {
        let mut dom = Dom::new();
        let id = dom.insert(ElementData::new("x"));
        dom.remove(id);
        assert!(dom.remove(id).is_none());
        assert_eq!(dom.root(), None);
    }

    #[test]
    fn reparent_moves_subtree() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        dom.reparent(c, b);
        assert_eq!(dom.parent(c), Some(b));
        assert!(!dom.children(a).contains(&c));
        assert_eq!(dom.ancestors(c), vec![b, root]);
    }

    #[test]
    fn rtl_reads_root_dir() {
        let (mut dom, root, ..) = build_tree();
        assert!(!dom.is_rtl());
        dom.set_attribute(root, "dir", "RTL");
        assert!(dom.is_rtl());
    }

    #[test]
    fn attribute_and_class_helpers_log_mutations() {
        let (mut dom, _root, a, b, ..) = build_tree();
        dom.set_attribute(a, "data-open", "b");
        dom.add_class(b, "is-open");
        dom.add_class(b, "is-open");
        dom.remove_class(a, "missing");
        assert_eq!(dom.attr(a, "data-open"), Some("b"));
        assert_eq!(dom.take_mutations(), vec![a, b]);
        assert!(dom.take_mutations().is_empty());
    }

    #[test]
    fn visibility_is_inherited() {
        let (mut dom, _root, a, _b, c, _d) = build_tree();
        assert!(dom.is_visible(c));
        dom.set_visible(a, false);
        assert!(!dom.is_visible(c));
        assert!(dom.get(c).unwrap().visible);
    }

    #[test]
    fn focus_unknown_node_fails() {
        let (mut dom, ..) = build_tree();
        let stale = dom.insert(ElementData::new("x"));
        dom.remove(stale);
        assert!(!dom.focus(stale));
    }
}
