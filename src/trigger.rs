//! Declarative triggers.
//!
//! Elements opt into behaviour through attributes: `data-open`,
//! `data-close`, `data-toggle` (click), `data-toggle-focus` (focus/blur),
//! `data-closable`, and `data-resize`/`data-scroll`/`data-mutate` for the
//! window listeners. [`TriggerBus`] translates raw input into the envelopes
//! the page should dispatch; it never delivers anything itself.

use tracing::debug;

use crate::dom::{Dom, NodeId};
use crate::event::{Envelope, EventDispatcher, Propagation, ZfEvent};

/// Default resize/scroll debounce on the frame clock.
pub const DEFAULT_DEBOUNCE_MS: f64 = 10.0;

/// A `[data-closable]` element that should close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closable {
    pub element: NodeId,
    /// Exit animation class; `None` hides immediately.
    pub animation: Option<String>,
}

/// Click/focus routing plus the debounced window listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerBus {
    debounce_ms: f64,
    mutation_observer: bool,
    resize_due: Option<f64>,
    scroll_due: Option<f64>,
}

impl Default for TriggerBus {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS, true)
    }
}

impl TriggerBus {
    /// `mutation_observer: false` models a host without mutation
    /// observation; `mutateme` is then never sent.
    pub fn new(debounce_ms: f64, mutation_observer: bool) -> Self {
        Self {
            debounce_ms,
            mutation_observer,
            resize_due: None,
            scroll_due: None,
        }
    }

    // ── Clicks and focus ─────────────────────────────────────────────

    /// Envelopes caused by a click on `target`.
    ///
    /// Every element on the bubble path carrying a trigger attribute fires,
    /// `data-open` before `data-close` before `data-toggle`.
    pub fn click(&self, dom: &Dom, target: NodeId) -> Vec<Envelope> {
        let mut out = Vec::new();
        for node in EventDispatcher::bubble_path(dom, target) {
            let Some(data) = dom.get(node) else { continue };

            if let Some(ids) = data.attr("data-open") {
                out.extend(targets(dom, ids).map(|t| Envelope::targeted(ZfEvent::Open, t).from_source(node)));
            }
            if let Some(ids) = data.attr("data-close") {
                if ids.trim().is_empty() {
                    out.push(Envelope::bubbling(ZfEvent::Close, node).from_source(node));
                } else {
                    out.extend(targets(dom, ids).map(|t| Envelope::bubbling(ZfEvent::Close, t).from_source(node)));
                }
            }
            if let Some(ids) = data.attr("data-toggle") {
                if ids.trim().is_empty() {
                    out.push(Envelope::bubbling(ZfEvent::Toggle, node).from_source(node));
                } else {
                    out.extend(targets(dom, ids).map(|t| Envelope::targeted(ZfEvent::Toggle, t).from_source(node)));
                }
            }
        }
        out
    }

    /// Envelopes caused by `target` gaining or losing focus.
    pub fn focus_change(&self, dom: &Dom, target: NodeId) -> Vec<Envelope> {
        EventDispatcher::bubble_path(dom, target)
            .into_iter()
            .filter_map(|node| dom.attr(node, "data-toggle-focus").map(|ids| (node, ids)))
            .flat_map(|(node, ids)| {
                targets(dom, ids)
                    .map(move |t| Envelope::targeted(ZfEvent::Toggle, t).from_source(node))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The closable a bubbling close reaches first, if any.
    pub fn closable_for(dom: &Dom, envelope: &Envelope) -> Option<Closable> {
        if envelope.event != ZfEvent::Close || envelope.propagation != Propagation::Bubbles {
            return None;
        }
        let target = envelope.target?;
        EventDispatcher::bubble_path(dom, target).into_iter().find_map(|node| {
            dom.attr(node, "data-closable").map(|animation| Closable {
                element: node,
                animation: Some(animation.trim())
                    .filter(|a| !a.is_empty())
                    .map(str::to_owned),
            })
        })
    }

    /// `closeme.zf.<plugin>`: the window event, then a close for every
    /// `[data-<plugin>]` element except the sender's own box.
    pub fn close_others(&self, dom: &Dom, plugin: &str, sender: &str) -> Vec<Envelope> {
        let mut out = vec![Envelope::window(ZfEvent::CloseMe {
            plugin: plugin.to_owned(),
            sender: sender.to_owned(),
        })];
        out.extend(
            dom.query_by_attribute(&format!("data-{plugin}"))
                .into_iter()
                .filter(|&el| dom.attr(el, "data-yeti-box") != Some(sender))
                .map(|el| Envelope::targeted(ZfEvent::Close, el)),
        );
        out
    }

    // ── Window listeners ─────────────────────────────────────────────

    /// Restart the resize debounce at frame time `now_ms`.
    pub fn schedule_resize(&mut self, now_ms: f64) {
        self.resize_due = Some(now_ms + self.debounce_ms);
    }

    /// Restart the scroll debounce at frame time `now_ms`.
    pub fn schedule_scroll(&mut self, now_ms: f64) {
        self.scroll_due = Some(now_ms + self.debounce_ms);
    }

    /// Whether a debounced resize or scroll is waiting.
    pub fn has_pending(&self) -> bool {
        self.resize_due.is_some() || self.scroll_due.is_some()
    }

    /// Envelopes due at frame time `now_ms`: debounced `resizeme`/`scrollme`,
    /// then one `mutateme` per `[data-mutate]` element whose subtree changed
    /// since the last frame. Nested observers each get their own.
    pub fn frame(&mut self, dom: &mut Dom, now_ms: f64) -> Vec<Envelope> {
        let mut out = Vec::new();
        if self.resize_due.is_some_and(|due| due <= now_ms) {
            self.resize_due = None;
            out.extend(
                dom.query_by_attribute("data-resize")
                    .into_iter()
                    .map(|el| Envelope::targeted(ZfEvent::ResizeMe, el)),
            );
        }
        if self.scroll_due.is_some_and(|due| due <= now_ms) {
            self.scroll_due = None;
            out.extend(
                dom.query_by_attribute("data-scroll")
                    .into_iter()
                    .map(|el| Envelope::targeted(ZfEvent::ScrollMe, el)),
            );
        }

        let touched = dom.take_mutations();
        if self.mutation_observer {
            let mut observers: Vec<NodeId> = Vec::new();
            for node in touched {
                for observer in EventDispatcher::bubble_path(dom, node) {
                    if dom.get(observer).is_some_and(|d| d.has_attr("data-mutate")) && !observers.contains(&observer) {
                        observers.push(observer);
                    }
                }
            }
            out.extend(observers.into_iter().map(|el| Envelope::targeted(ZfEvent::MutateMe, el)));
        }
        out
    }
}

/// Resolve a space-separated id list, skipping ids not in the document.
fn targets<'a>(dom: &'a Dom, ids: &'a str) -> impl Iterator<Item = NodeId> + 'a {
    ids.split_whitespace().filter_map(move |id| {
        let found = dom.query_by_id(id);
        if found.is_none() {
            debug!(id, "trigger target not found");
        }
        found
    })
}

// ===========================================================================
// Tests
// ===========================================================================
