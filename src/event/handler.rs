//! Event log and bubble path computation.
//!
//! [`EventDispatcher`] records every envelope the page delivers, in order, so
//! hosts (and tests) can observe the public event surface. A bounded log
//! drops its oldest entries first. Routing itself is done by the page, which
//! uses [`EventDispatcher::delivery_path`].

use std::collections::VecDeque;

use super::message::{Envelope, Propagation};
use crate::dom::{Dom, NodeId};

// ---------------------------------------------------------------------------
// EventDispatcher
// ---------------------------------------------------------------------------

/// Ordered log of emitted events.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    queue: VecDeque<Envelope>,
    capacity: Option<usize>,
}

impl EventDispatcher {
    /// Create a new, empty, unbounded dispatcher.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: None,
        }
    }

    /// Create a dispatcher that keeps at most `capacity` envelopes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity.min(1024)),
            capacity: Some(capacity),
        }
    }

    /// The retention limit, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Record an emitted envelope, evicting the oldest beyond capacity.
    pub fn push(&mut self, envelope: Envelope) {
        if self.capacity == Some(0) {
            return;
        }
        self.queue.push_back(envelope);
        if let Some(capacity) = self.capacity {
            while self.queue.len() > capacity {
                self.queue.pop_front();
            }
        }
    }

    /// Drain all recorded envelopes.
    pub fn drain(&mut self) -> Vec<Envelope> {
        self.queue.drain(..).collect()
    }

    /// Drain and return only the event names.
    pub fn drain_names(&mut self) -> Vec<String> {
        self.queue.drain(..).map(|e| e.name()).collect()
    }

    /// Recorded envelopes without draining.
    pub fn pending(&self) -> impl Iterator<Item = &Envelope> {
        self.queue.iter()
    }

    /// How many recorded envelopes carry this event name.
    pub fn count(&self, name: &str) -> usize {
        self.queue.iter().filter(|e| e.name() == name).count()
    }

    /// Number of recorded envelopes.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing has been recorded since the last drain.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// `[start, parent, ..., root]`; empty if `start` is not in the document.
    pub fn bubble_path(dom: &Dom, start: NodeId) -> Vec<NodeId> {
        if !dom.contains(start) {
            return Vec::new();
        }
        let mut path = vec![start];
        path.extend(dom.ancestors(start));
        path
    }

    /// The elements an envelope visits, honouring its propagation mode.
    pub fn delivery_path(dom: &Dom, envelope: &Envelope) -> Vec<NodeId> {
        match (envelope.target, envelope.propagation) {
            (None, _) => Vec::new(),
            (Some(target), Propagation::Bubbles) => Self::bubble_path(dom, target),
            (Some(target), Propagation::TargetOnly) if dom.contains(target) => vec![target],
            (Some(_), Propagation::TargetOnly) => Vec::new(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
