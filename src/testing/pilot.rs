//! Pilot: programmatic interaction with a headless Page.
//!
//! The `Pilot` wraps a [`Page`] and drives it the way a browser would:
//! clicks and keys by element id, resizes, and a simulated frame clock that
//! advances in fixed steps.

use crate::dom::{ElementData, NodeId};
use crate::error::Result;
use crate::event::{Key, KeyEvent, Modifiers};
use crate::page::{Page, PageConfig};
use crate::plugin::{Constructor, PluginCall};

/// Default frame step of the simulated clock (about 60 fps).
pub const FRAME_MS: f64 = 16.0;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless page driver for testing.
///
/// # Examples
///
/// ```ignore
/// use foundation_core::testing::{fixtures::Toggler, Pilot};
/// use foundation_core::dom::ElementData;
///
/// let mut pilot = Pilot::new();
/// pilot.define("Toggler", Toggler::constructor());
/// let body = pilot.page().body();
/// pilot.mount(body, ElementData::new("div").with_id("pane").with_attr("data-toggler", ""));
/// pilot.start().unwrap();
/// ```
pub struct Pilot {
    page: Page,
    frame_ms: f64,
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Pilot {
    /// A page with the default configuration and a fixed id seed.
    pub fn new() -> Self {
        Self::with_config(PageConfig::default().with_seed(0))
    }

    /// A page with the given configuration.
    pub fn with_config(config: PageConfig) -> Self {
        Self {
            page: Page::new(config),
            frame_ms: FRAME_MS,
        }
    }

    /// Change the simulated frame step (builder).
    pub fn with_frame_ms(mut self, frame_ms: f64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    // ── Setup ────────────────────────────────────────────────────────

    /// Define a plugin on the page.
    pub fn define(&mut self, class_name: &str, constructor: Constructor) -> String {
        self.page.define(class_name, constructor)
    }

    /// Insert an element under `parent`.
    pub fn mount(&mut self, parent: NodeId, data: ElementData) -> NodeId {
        self.page.dom.insert_child(parent, data)
    }

    /// Run the entry point over the whole document.
    pub fn start(&mut self) -> Result<()> {
        self.page.foundation(&[], PluginCall::NoArgs)
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// The element with this id.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.page.dom.query_by_id(id)
    }

    /// Click the element. Returns `false` for unknown nodes.
    pub fn click(&mut self, target: NodeId) -> bool {
        if !self.page.dom.contains(target) {
            return false;
        }
        self.page.click(target);
        true
    }

    /// Click the element with this id. Returns `false` if there is none.
    pub fn click_id(&mut self, id: &str) -> bool {
        match self.by_id(id) {
            Some(target) => self.click(target),
            None => false,
        }
    }

    /// Focus the element.
    pub fn focus(&mut self, target: NodeId) {
        self.page.focus(target);
    }

    /// Press a key with no modifiers on the focused element (or the body).
    pub fn press_key(&mut self, key: Key) -> bool {
        self.press_key_with(key, Modifiers::NONE)
    }

    /// Press a key with modifiers on the focused element (or the body).
    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let target = self.page.dom.active_element().unwrap_or_else(|| self.page.body());
        self.page.key_down(target, KeyEvent::new(key, modifiers))
    }

    /// Resize the window.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.page.resize(width, height);
    }

    /// Scroll the document.
    pub fn scroll(&mut self, left: f64, top: f64) {
        self.page.scroll(left, top);
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Advance the clock by `frames` animation frames.
    pub fn advance(&mut self, frames: usize) {
        for _ in 0..frames {
            let next = self.page.now_ms() + self.frame_ms;
            self.page.animation_frame(next);
        }
    }

    /// Advance the clock by at least `ms`, in whole frames.
    pub fn advance_ms(&mut self, ms: f64) {
        let frames = (ms / self.frame_ms).ceil().max(0.0) as usize;
        self.advance(frames);
    }

    /// Run one frame, then end every pending CSS transition.
    pub fn settle(&mut self) {
        self.advance(1);
        for element in self.page.motion.pending_transitions() {
            self.page.transition_end(element);
        }
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Borrow the underlying page immutably.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Borrow the underlying page mutably.
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Drain the names of the events emitted so far.
    pub fn take_events(&mut self) -> Vec<String> {
        self.page.events.drain_names()
    }

    /// The document as an indented outline.
    pub fn outline(&self) -> String {
        super::snapshot::dom_outline(&self.page.dom)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
