//! Focusable discovery and focus trapping.
//!
//! [`find_focusable`] collects the tab stops inside a container the way the
//! keyboard utility's selector does. [`FocusTraps`] keeps TAB cycling inside a
//! container: TAB on the last stop wraps to the first, SHIFT_TAB on the first
//! wraps to the last.

use std::collections::HashMap;

use super::binding::parse_chord;
use super::handler::EventDispatcher;
use super::input::KeyEvent;
use crate::dom::{Dom, ElementData, NodeId};

/// Whether an element matches the focusable selector, ignoring visibility.
fn is_focus_candidate(data: &ElementData) -> bool {
    let by_tag = match data.tag.as_str() {
        "a" | "area" => data.has_attr("href"),
        "input" | "select" | "textarea" | "button" => !data.is_disabled(),
        "iframe" | "object" | "embed" => true,
        _ => false,
    };
    by_tag || data.has_attr("tabindex") || data.has_attr("contenteditable")
}

/// Visible descendants of `container` that can take focus, in document order.
///
/// Elements with a negative `tabindex` are skipped.
pub fn find_focusable(dom: &Dom, container: NodeId) -> Vec<NodeId> {
    dom.descendants(container)
        .into_iter()
        .filter(|&id| {
            let Some(data) = dom.get(id) else {
                return false;
            };
            is_focus_candidate(data)
                && dom.is_visible(id)
                && data.tab_index().is_none_or(|t| t >= 0)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// FocusTraps
// ---------------------------------------------------------------------------

/// First and last tab stop captured when the trap was bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Trap {
    first: Option<NodeId>,
    last: Option<NodeId>,
}

/// Result of offering a keydown to the active traps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    /// No trap reacted; default behaviour proceeds.
    Ignored,
    /// Focus was wrapped to this element and the default was prevented.
    Redirected(NodeId),
}

/// Active focus traps, one per container.
#[derive(Debug, Default)]
pub struct FocusTraps {
    traps: HashMap<NodeId, Trap>,
}

impl FocusTraps {
    /// Create an empty trap set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or rebind) a trap on `container`, capturing its current tab stops.
    pub fn trap(&mut self, dom: &Dom, container: NodeId) {
        let stops = find_focusable(dom, container);
        self.traps.insert(
            container,
            Trap {
                first: stops.first().copied(),
                last: stops.last().copied(),
            },
        );
    }

    /// Unbind the trap on `container`. Returns whether one was bound.
    pub fn release(&mut self, container: NodeId) -> bool {
        self.traps.remove(&container).is_some()
    }

    /// Whether `container` currently traps focus.
    pub fn is_trapped(&self, container: NodeId) -> bool {
        self.traps.contains_key(&container)
    }

    /// Offer a keydown on `target` to every trapping container it sits in.
    pub fn on_keydown(&self, dom: &mut Dom, target: NodeId, event: &KeyEvent) -> TrapOutcome {
        if self.traps.is_empty() {
            return TrapOutcome::Ignored;
        }
        let chord = parse_chord(event);
        for container in EventDispatcher::bubble_path(dom, target) {
            let Some(trap) = self.traps.get(&container) else {
                continue;
            };
            let wrap_to = if chord == "TAB" && trap.last == Some(target) {
                trap.first
            } else if chord == "SHIFT_TAB" && trap.first == Some(target) {
                trap.last
            } else {
                None
            };
            if let Some(next) = wrap_to {
                dom.focus(next);
                return TrapOutcome::Redirected(next);
            }
        }
        TrapOutcome::Ignored
    }
}
