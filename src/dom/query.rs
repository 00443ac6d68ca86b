//! DOM queries: by id, class, attribute; generic predicate matching.
//!
//! Whole-document queries walk from the root, so results come back in
//! document order (the order jQuery selectors produce).

use super::node::{ElementData, NodeId};
use super::tree::Dom;

impl Dom {
    /// `$('#id')`: the first element in document order with this id.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|&n| self.get(n).is_some_and(|d| d.id.as_deref() == Some(id)))
    }

    /// All elements carrying the CSS class.
    pub fn query_by_class(&self, class: &str) -> Vec<NodeId> {
        self.query_all(|data| data.has_class(class))
    }

    /// `$('[name]')` over the whole document.
    pub fn query_by_attribute(&self, name: &str) -> Vec<NodeId> {
        self.query_all(|data| data.has_attr(name))
    }

    /// `$(root).find('[name]')`: descendants only, document order.
    pub fn find_with_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| self.get(n).is_some_and(|d| d.has_attr(name)))
            .collect()
    }

    /// All elements matching an arbitrary predicate, in document order.
    pub fn query_all(&self, predicate: impl Fn(&ElementData) -> bool) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|&n| self.get(n).is_some_and(&predicate))
            .collect()
    }

    /// Every element reachable from the root, plus detached nodes after them.
    fn document_order(&self) -> Vec<NodeId> {
        let mut order = match self.root() {
            Some(root) => self.walk_depth_first(root),
            None => Vec::new(),
        };
        if order.len() < self.len() {
            // Parentless nodes inserted after the root are still queryable.
            for (id, _) in self.nodes.iter() {
                if self.parent(id).is_none() && Some(id) != self.root() {
                    order.extend(self.walk_depth_first(id));
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::node::ElementData;
    use crate::dom::tree::Dom;

    /// ```text
    /// html
    ///  └ body
    ///     ├ div#menu [data-dropdown-menu]
    ///     │   ├ a.button [data-open=modal]
    ///     │   └ a.button [data-toggle]
    ///     └ div#modal [data-reveal]
    /// ```
    fn build_query_tree() -> Dom {
        let (mut dom, body) = Dom::with_body();
        let menu = dom.insert_child(
            body,
            ElementData::new("div").with_id("menu").with_attr("data-dropdown-menu", ""),
        );
        dom.insert_child(
            menu,
            ElementData::new("a").with_class("button").with_attr("data-open", "modal"),
        );
        dom.insert_child(
            menu,
            ElementData::new("a").with_class("button").with_attr("data-toggle", ""),
        );
        dom.insert_child(
            body,
            ElementData::new("div").with_id("modal").with_attr("data-reveal", ""),
        );
        dom
    }

    #[test]
    fn query_by_id_found_and_missing() {
        let dom = build_query_tree();
        let modal = dom.query_by_id("modal").unwrap();
        assert!(dom.get(modal).unwrap().has_attr("data-reveal"));
        assert!(dom.query_by_id("nope").is_none());
    }

    #[test]
    fn query_by_class_in_document_order() {
        let dom = build_query_tree();
        let buttons = dom.query_by_class("button");
        assert_eq!(buttons.len(), 2);
        assert!(dom.get(buttons[0]).unwrap().has_attr("data-open"));
    }

    #[test]
    fn query_by_attribute_matches_empty_values() {
        let dom = build_query_tree();
        assert_eq!(dom.query_by_attribute("data-toggle").len(), 1);
        assert_eq!(dom.query_by_attribute("data-reveal").len(), 1);
        assert!(dom.query_by_attribute("data-tabs").is_empty());
    }

    #[test]
    fn find_with_attribute_excludes_root() {
        let dom = build_query_tree();
        let menu = dom.query_by_id("menu").unwrap();
        assert!(dom.find_with_attribute(menu, "data-dropdown-menu").is_empty());
        assert_eq!(dom.find_with_attribute(menu, "data-open").len(), 1);
    }

    #[test]
    fn detached_nodes_are_queryable() {
        let mut dom = build_query_tree();
        let loose = dom.insert(ElementData::new("div").with_id("loose"));
        assert_eq!(dom.query_by_id("loose"), Some(loose));
    }

    #[test]
    fn query_on_empty_dom() {
        let dom = Dom::new();
        assert!(dom.query_by_id("x").is_none());
        assert!(dom.query_by_class("x").is_empty());
        assert!(dom.query_all(|_| true).is_empty());
    }
}
