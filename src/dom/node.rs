//! Node types: NodeId, ElementData.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use crate::geometry::Rect;

new_key_type! {
    /// Unique identifier for a document element. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Data associated with a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lower-case tag name (`div`, `a`, `button`, ...).
    pub tag: String,
    /// Optional unique id (`#id` target of trigger attributes).
    pub id: Option<String>,
    /// CSS classes, in insertion order.
    pub classes: Vec<String>,
    /// Attributes other than `id` and `class`, e.g. `data-open`.
    pub attributes: BTreeMap<String, String>,
    /// Measured border box in page coordinates.
    pub rect: Rect,
    /// Whether the element is displayed (`:visible`).
    pub visible: bool,
}

impl ElementData {
    /// Create a new element with the given tag and sensible defaults.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            rect: Rect::EMPTY,
            visible: true,
        }
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single CSS class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set an attribute (builder). `id` and `class` are routed to their fields.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(&name.into(), value.into());
        self
    }

    /// Set the measured box (builder).
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Set visibility (builder).
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Check whether this element has a given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a CSS class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a CSS class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Read an attribute. `id` and `class` are served from their fields.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            // Classes are joined on demand; callers wanting them use `classes`.
            "class" => None,
            _ => self.attributes.get(name).map(String::as_str),
        }
    }

    /// Whether the attribute is present (an empty value still counts).
    pub fn has_attr(&self, name: &str) -> bool {
        match name {
            "id" => self.id.is_some(),
            "class" => !self.classes.is_empty(),
            _ => self.attributes.contains_key(name),
        }
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attribute(&mut self, name: &str, value: String) {
        match name {
            "id" => self.id = Some(value),
            "class" => {
                self.classes.clear();
                for class in value.split_whitespace() {
                    self.add_class(class);
                }
            }
            _ => {
                self.attributes.insert(name.to_owned(), value);
            }
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.take(),
            "class" => {
                let joined = self.classes.join(" ");
                self.classes.clear();
                Some(joined)
            }
            _ => self.attributes.remove(name),
        }
    }

    /// The `disabled` attribute is present.
    pub fn is_disabled(&self) -> bool {
        self.attributes.contains_key("disabled")
    }

    /// Parsed `tabindex`, if present and numeric.
    pub fn tab_index(&self) -> Option<i32> {
        self.attributes
            .get("tabindex")
            .and_then(|v| v.trim().parse().ok())
    }

    /// Iterate over `data-*` attributes as `(suffix, value)` pairs.
    pub fn data_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|(k, v)| k.strip_prefix("data-").map(|s| (s, v.as_str())))
    }
}
