//! Namespaced events and the envelope that routes them.
//!
//! Every event renders to the dotted jQuery name other scripts listen for
//! (`open.zf.trigger`, `init.zf.dropdown`, ...). [`Envelope`] adds routing:
//! the target element (or the window), the element that caused it, and
//! whether it bubbles.

use std::fmt;

use crate::dom::NodeId;

// ---------------------------------------------------------------------------
// ZfEvent
// ---------------------------------------------------------------------------

/// The events the coordination layer emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZfEvent {
    /// `init.zf.<plugin>`
    Init { plugin: String },
    /// `destroyed.zf.<plugin>`
    Destroyed { plugin: String },
    /// `changed.zf.mediaquery` with (new, old) breakpoint names.
    MediaQueryChanged {
        current: Option<String>,
        previous: Option<String>,
    },
    /// `open.zf.trigger`
    Open,
    /// `close.zf.trigger`
    Close,
    /// `toggle.zf.trigger`
    Toggle,
    /// `closed.zf`, after a closable finished closing.
    Closed,
    /// `closeme.zf.<plugin>`: close every other instance of `plugin`.
    CloseMe { plugin: String, sender: String },
    /// `resizeme.zf.trigger`
    ResizeMe,
    /// `scrollme.zf.trigger`
    ScrollMe,
    /// `mutateme.zf.trigger`
    MutateMe,
    /// `finished.zf.animate`
    AnimationFinished,
}

impl ZfEvent {
    /// The dotted event name.
    pub fn name(&self) -> String {
        match self {
            ZfEvent::Init { plugin } => format!("init.zf.{plugin}"),
            ZfEvent::Destroyed { plugin } => format!("destroyed.zf.{plugin}"),
            ZfEvent::MediaQueryChanged { .. } => "changed.zf.mediaquery".into(),
            ZfEvent::Open => "open.zf.trigger".into(),
            ZfEvent::Close => "close.zf.trigger".into(),
            ZfEvent::Toggle => "toggle.zf.trigger".into(),
            ZfEvent::Closed => "closed.zf".into(),
            ZfEvent::CloseMe { plugin, .. } => format!("closeme.zf.{plugin}"),
            ZfEvent::ResizeMe => "resizeme.zf.trigger".into(),
            ZfEvent::ScrollMe => "scrollme.zf.trigger".into(),
            ZfEvent::MutateMe => "mutateme.zf.trigger".into(),
            ZfEvent::AnimationFinished => "finished.zf.animate".into(),
        }
    }
}

impl fmt::Display for ZfEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// How an event travels once dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// `trigger`: the target, then each ancestor up to the root.
    Bubbles,
    /// `triggerHandler`: the target only.
    TargetOnly,
}

/// Wraps an event with routing metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// The event payload.
    pub event: ZfEvent,
    /// Receiving element; `None` addresses the window.
    pub target: Option<NodeId>,
    /// The element that caused the event (e.g. the clicked trigger).
    pub source: Option<NodeId>,
    /// Bubble or target-only delivery.
    pub propagation: Propagation,
    /// Set once a handler stopped propagation.
    pub stopped: bool,
}

impl Envelope {
    /// A bubbling event fired on `target` (`$(target).trigger(...)`).
    pub fn bubbling(event: ZfEvent, target: NodeId) -> Self {
        Self {
            event,
            target: Some(target),
            source: None,
            propagation: Propagation::Bubbles,
            stopped: false,
        }
    }

    /// A target-only event (`$(target).triggerHandler(...)`).
    pub fn targeted(event: ZfEvent, target: NodeId) -> Self {
        Self {
            event,
            target: Some(target),
            source: None,
            propagation: Propagation::TargetOnly,
            stopped: false,
        }
    }

    /// An event fired on the window.
    pub fn window(event: ZfEvent) -> Self {
        Self {
            event,
            target: None,
            source: None,
            propagation: Propagation::TargetOnly,
            stopped: false,
        }
    }

    /// Record the element that caused this event (builder).
    pub fn from_source(mut self, source: NodeId) -> Self {
        self.source = Some(source);
        self
    }

    /// The dotted event name.
    pub fn name(&self) -> String {
        self.event.name()
    }

    /// Stop further propagation.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
