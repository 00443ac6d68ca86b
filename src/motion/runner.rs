//! CSS class transitions and frame-driven movement.
//!
//! An enter/exit animation is a class sequence on the element: the motion's
//! own class plus `mui-enter` (or `mui-leave`) immediately, the matching
//! `-active` class on the next animation frame, and cleanup once the host
//! reports the transition ended. The runner never dispatches events itself;
//! completions that carry an event are queued for the page to drain.

use std::collections::HashMap;

use tokio::sync::oneshot;
use tracing::debug;

use super::handle::{MotionHandle, MotionOutcome};
use crate::dom::{Dom, NodeId};
use crate::event::{Envelope, ZfEvent};

/// Enter or exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn init_class(self) -> &'static str {
        match self {
            Direction::In => "mui-enter",
            Direction::Out => "mui-leave",
        }
    }

    pub fn active_class(self) -> &'static str {
        match self {
            Direction::In => "mui-enter-active",
            Direction::Out => "mui-leave-active",
        }
    }
}

/// Where a pending transition is in its class sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Init class applied; waiting for the next frame.
    Init,
    /// Active class applied; waiting for `transition_end`.
    Active,
}

struct Transition {
    direction: Direction,
    animation: String,
    stage: Stage,
    follow_up: Option<ZfEvent>,
    tx: oneshot::Sender<MotionOutcome>,
}

/// Per-frame callback of a [`MotionRunner::move_over_duration`].
pub type FrameFn = Box<dyn FnMut(&mut Dom, NodeId)>;

struct Mover {
    element: NodeId,
    duration_ms: f64,
    start: Option<f64>,
    per_frame: FrameFn,
    tx: oneshot::Sender<MotionOutcome>,
}

/// Drives every running motion. At most one transition per element.
pub struct MotionRunner {
    transitions_supported: bool,
    transitions: HashMap<NodeId, Transition>,
    movers: Vec<Mover>,
    outbox: Vec<Envelope>,
}

impl std::fmt::Debug for MotionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionRunner")
            .field("transitions_supported", &self.transitions_supported)
            .field("transitions", &self.transitions.len())
            .field("movers", &self.movers.len())
            .finish_non_exhaustive()
    }
}

impl Default for MotionRunner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MotionRunner {
    pub fn new(transitions_supported: bool) -> Self {
        Self {
            transitions_supported,
            transitions: HashMap::new(),
            movers: Vec::new(),
            outbox: Vec::new(),
        }
    }

    pub fn transitions_supported(&self) -> bool {
        self.transitions_supported
    }

    /// Run an enter animation.
    pub fn animate_in(&mut self, dom: &mut Dom, element: NodeId, animation: &str) -> MotionHandle {
        self.animate(dom, element, Direction::In, animation, None)
    }

    /// Run an exit animation; the element is hidden when it finishes.
    pub fn animate_out(&mut self, dom: &mut Dom, element: NodeId, animation: &str) -> MotionHandle {
        self.animate(dom, element, Direction::Out, animation, None)
    }

    /// Start a class transition on `element`.
    ///
    /// Any transition already running on the element is superseded. When
    /// transitions are unsupported the motion completes before this returns.
    /// `follow_up` is emitted (bubbling from the element) on completion.
    pub fn animate(
        &mut self,
        dom: &mut Dom,
        element: NodeId,
        direction: Direction,
        animation: &str,
        follow_up: Option<ZfEvent>,
    ) -> MotionHandle {
        if !dom.contains(element) {
            return MotionHandle::resolved(MotionOutcome::Cancelled);
        }
        if let Some(old) = self.transitions.remove(&element) {
            debug!(animation = %old.animation, "transition superseded");
            strip(dom, element, &old);
            let _ = old.tx.send(MotionOutcome::Superseded);
        }

        let (handle, tx) = MotionHandle::channel();
        let transition = Transition {
            direction,
            animation: animation.to_owned(),
            stage: Stage::Init,
            follow_up,
            tx,
        };
        if !animation.is_empty() {
            dom.add_class(element, animation);
        }
        dom.add_class(element, direction.init_class());
        if direction == Direction::In {
            dom.set_visible(element, true);
        }

        if self.transitions_supported {
            self.transitions.insert(element, transition);
        } else {
            self.finish(dom, element, transition);
        }
        handle
    }

    /// The host reports that `element`'s CSS transition ended.
    ///
    /// Returns `false` when nothing was running there.
    pub fn transition_end(&mut self, dom: &mut Dom, element: NodeId) -> bool {
        match self.transitions.remove(&element) {
            Some(transition) => {
                self.finish(dom, element, transition);
                true
            }
            None => false,
        }
    }

    /// Call `per_frame` on every animation frame until `duration_ms` has
    /// elapsed, then emit `finished.zf.animate`.
    ///
    /// A zero duration calls it once, right away.
    pub fn move_over_duration(
        &mut self,
        dom: &mut Dom,
        duration_ms: f64,
        element: NodeId,
        mut per_frame: FrameFn,
    ) -> MotionHandle {
        if duration_ms <= 0.0 {
            per_frame(dom, element);
            self.outbox.push(Envelope::bubbling(ZfEvent::AnimationFinished, element));
            return MotionHandle::resolved(MotionOutcome::Finished);
        }
        let (handle, tx) = MotionHandle::channel();
        self.movers.push(Mover {
            element,
            duration_ms,
            start: None,
            per_frame,
            tx,
        });
        handle
    }

    /// Advance every motion to frame time `timestamp_ms`.
    pub fn frame(&mut self, dom: &mut Dom, timestamp_ms: f64) {
        for (&element, transition) in self.transitions.iter_mut() {
            if transition.stage == Stage::Init {
                dom.add_class(element, transition.direction.active_class());
                transition.stage = Stage::Active;
            }
        }

        let mut still_running = Vec::with_capacity(self.movers.len());
        for mut mover in std::mem::take(&mut self.movers) {
            if !dom.contains(mover.element) {
                let _ = mover.tx.send(MotionOutcome::Cancelled);
                continue;
            }
            let start = *mover.start.get_or_insert(timestamp_ms);
            (mover.per_frame)(dom, mover.element);
            if timestamp_ms - start < mover.duration_ms {
                still_running.push(mover);
            } else {
                self.outbox
                    .push(Envelope::bubbling(ZfEvent::AnimationFinished, mover.element));
                let _ = mover.tx.send(MotionOutcome::Finished);
            }
        }
        self.movers = still_running;
    }

    /// Cancel whatever runs on `element`, stripping motion classes.
    pub fn cancel(&mut self, dom: &mut Dom, element: NodeId) {
        if let Some(transition) = self.transitions.remove(&element) {
            strip(dom, element, &transition);
            let _ = transition.tx.send(MotionOutcome::Cancelled);
        }
        let (cancelled, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.movers).into_iter().partition(|m| m.element == element);
        self.movers = kept;
        for mover in cancelled {
            let _ = mover.tx.send(MotionOutcome::Cancelled);
        }
    }

    /// Whether a transition or movement is running on `element`.
    pub fn is_animating(&self, element: NodeId) -> bool {
        self.transitions.contains_key(&element) || self.movers.iter().any(|m| m.element == element)
    }

    /// Elements with a class transition waiting to end.
    pub fn pending_transitions(&self) -> Vec<NodeId> {
        let mut elements: Vec<NodeId> = self.transitions.keys().copied().collect();
        elements.sort();
        elements
    }

    /// Events queued by completed motions, in completion order.
    pub fn take_outbox(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outbox)
    }

    fn finish(&mut self, dom: &mut Dom, element: NodeId, transition: Transition) {
        if transition.direction == Direction::Out {
            dom.set_visible(element, false);
        }
        strip(dom, element, &transition);
        if let Some(event) = transition.follow_up {
            self.outbox.push(Envelope::bubbling(event, element));
        }
        let _ = transition.tx.send(MotionOutcome::Finished);
    }
}

fn strip(dom: &mut Dom, element: NodeId, transition: &Transition) {
    dom.remove_class(element, transition.direction.init_class());
    dom.remove_class(element, transition.direction.active_class());
    if !transition.animation.is_empty() {
        dom.remove_class(element, &transition.animation);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::ElementData;

    fn doc() -> (Dom, NodeId) {
        let (mut dom, body) = Dom::with_body();
        let el = dom.insert_child(body, ElementData::new("div").visible(false));
        (dom, el)
    }

    fn classes(dom: &Dom, el: NodeId) -> Vec<String> {
        dom.get(el).map(|d| d.classes.clone()).unwrap_or_default()
    }

    // ── Class transitions ────────────────────────────────────────────

    #[test]
    fn enter_walks_the_class_sequence() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(true);
        let mut handle = runner.animate_in(&mut dom, el, "fade-in");

        assert_eq!(classes(&dom, el), vec!["fade-in", "mui-enter"]);
        assert!(dom.is_visible(el));
        assert_eq!(handle.try_outcome(), None);

        runner.frame(&mut dom, 16.0);
        assert_eq!(classes(&dom, el), vec!["fade-in", "mui-enter", "mui-enter-active"]);

        assert!(runner.transition_end(&mut dom, el));
        assert!(classes(&dom, el).is_empty());
        assert!(dom.is_visible(el));
        assert_eq!(handle.try_outcome(), Some(MotionOutcome::Finished));
        assert!(!runner.is_animating(el));
    }

    #[test]
    fn exit_hides_on_finish() {
        let (mut dom, el) = doc();
        dom.set_visible(el, true);
        let mut runner = MotionRunner::new(true);
        let mut handle = runner.animate_out(&mut dom, el, "fade-out");
        assert!(dom.is_visible(el));
        runner.frame(&mut dom, 16.0);
        runner.transition_end(&mut dom, el);
        assert!(!dom.is_visible(el));
        assert_eq!(handle.try_outcome(), Some(MotionOutcome::Finished));
    }

    #[test]
    fn unsupported_transitions_resolve_synchronously() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(false);
        let mut handle = runner.animate(&mut dom, el, Direction::Out, "slide-out-up", Some(ZfEvent::Closed));
        assert_eq!(handle.try_outcome(), Some(MotionOutcome::Finished));
        assert!(classes(&dom, el).is_empty());
        let names: Vec<_> = runner.take_outbox().iter().map(Envelope::name).collect();
        assert_eq!(names, vec!["closed.zf"]);
    }

    #[test]
    fn second_animation_supersedes_the_first() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(true);
        let mut first = runner.animate_in(&mut dom, el, "fade-in");
        let mut second = runner.animate_out(&mut dom, el, "fade-out");

        assert_eq!(first.try_outcome(), Some(MotionOutcome::Superseded));
        assert_eq!(classes(&dom, el), vec!["fade-out", "mui-leave"]);
        runner.transition_end(&mut dom, el);
        assert_eq!(second.try_outcome(), Some(MotionOutcome::Finished));
        // The superseded handle never flips to finished.
        assert_eq!(first.try_outcome(), Some(MotionOutcome::Superseded));
    }

    #[test]
    fn follow_up_waits_for_transition_end() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(true);
        runner.animate(&mut dom, el, Direction::Out, "fade-out", Some(ZfEvent::Closed));
        assert!(runner.take_outbox().is_empty());
        runner.transition_end(&mut dom, el);
        assert_eq!(runner.take_outbox(), vec![Envelope::bubbling(ZfEvent::Closed, el)]);
    }

    #[test]
    fn cancel_and_stray_transition_end() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(true);
        assert!(!runner.transition_end(&mut dom, el));
        let mut handle = runner.animate_in(&mut dom, el, "fade-in");
        runner.cancel(&mut dom, el);
        assert_eq!(handle.try_outcome(), Some(MotionOutcome::Cancelled));
        assert!(classes(&dom, el).is_empty());
    }

    #[test]
    fn dropping_the_runner_cancels() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(true);
        let mut handle = runner.animate_in(&mut dom, el, "fade-in");
        drop(runner);
        assert_eq!(handle.try_outcome(), Some(MotionOutcome::Cancelled));
    }

    // ── Movement ─────────────────────────────────────────────────────

    #[test]
    fn zero_duration_runs_once_immediately() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(true);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut handle = runner.move_over_duration(
            &mut dom,
            0.0,
            el,
            Box::new(move |_, _| counter.set(counter.get() + 1)),
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(handle.try_outcome(), Some(MotionOutcome::Finished));
        assert_eq!(runner.take_outbox(), vec![Envelope::bubbling(ZfEvent::AnimationFinished, el)]);
    }

    #[test]
    fn movement_runs_each_frame_until_elapsed() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(true);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut handle = runner.move_over_duration(
            &mut dom,
            50.0,
            el,
            Box::new(move |_, _| counter.set(counter.get() + 1)),
        );
        assert_eq!(calls.get(), 0);

        for ts in [100.0, 116.0, 132.0, 148.0] {
            runner.frame(&mut dom, ts);
        }
        assert_eq!(calls.get(), 4);
        assert_eq!(handle.try_outcome(), None);

        runner.frame(&mut dom, 164.0);
        assert_eq!(calls.get(), 5);
        assert_eq!(handle.try_outcome(), Some(MotionOutcome::Finished));
        assert_eq!(runner.take_outbox().len(), 1);
        runner.frame(&mut dom, 180.0);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn movement_on_removed_element_is_cancelled() {
        let (mut dom, el) = doc();
        let mut runner = MotionRunner::new(true);
        let mut handle = runner.move_over_duration(&mut dom, 50.0, el, Box::new(|_, _| {}));
        dom.remove(el);
        runner.frame(&mut dom, 0.0);
        assert_eq!(handle.try_outcome(), Some(MotionOutcome::Cancelled));
        assert!(runner.take_outbox().is_empty());
    }
}
