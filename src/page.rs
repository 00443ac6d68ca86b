//! Page: the application context.
//!
//! [`Page`] owns the document, the viewport and every coordination service.
//! The host drives it with clicks, focus changes, keys, resizes, scrolls,
//! animation frames and transition ends; the page routes each one through
//! the trigger bus, the motion runner and the plugin instances.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::dom::{Dom, NodeId};
use crate::error::{FoundationError, Result};
use crate::event::{Envelope, EventDispatcher, KeyCommandRegistry, KeyEvent, TrapOutcome, ZfEvent};
use crate::geometry::Viewport;
use crate::media::MediaQueryService;
use crate::motion::{Direction, FrameFn, MotionHandle, MotionRunner};
use crate::plugin::{
    Constructor, OptionValue, Plugin, PluginCall, PluginHandle, PluginOptions, PluginRegistry, ScanReport,
    DEFAULT_UID_LENGTH,
};
use crate::trigger::{Closable, TriggerBus, DEFAULT_DEBOUNCE_MS};

/// Envelopes the event log keeps by default.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1024;

/// The breakpoint table of the stock stylesheet.
pub const DEFAULT_BREAKPOINTS: &str = "small=0em&medium=40em&large=64em&xlarge=75em&xxlarge=90em";

// ---------------------------------------------------------------------------
// PageConfig
// ---------------------------------------------------------------------------

/// Configuration for a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    /// The breakpoint encoding the stylesheet publishes (`name=value&...`).
    pub breakpoints: String,
    /// Initial window size and scroll position.
    pub viewport: Viewport,
    /// Random digits in generated instance ids.
    pub uid_length: usize,
    /// Whether the host reports CSS transition ends.
    pub transitions_supported: bool,
    /// Whether `[data-mutate]` elements are observed.
    pub mutation_observer: bool,
    /// Resize/scroll debounce on the frame clock.
    pub debounce_ms: f64,
    /// Seed for instance ids; `None` draws from the OS.
    pub seed: Option<u64>,
    /// Envelopes kept in the event log; `None` keeps all of them.
    pub event_log_capacity: Option<usize>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            breakpoints: DEFAULT_BREAKPOINTS.to_owned(),
            viewport: Viewport::default(),
            uid_length: DEFAULT_UID_LENGTH,
            transitions_supported: true,
            mutation_observer: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            seed: None,
            event_log_capacity: Some(DEFAULT_EVENT_LOG_CAPACITY),
        }
    }
}

impl PageConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the breakpoint encoding (builder).
    pub fn with_breakpoints(mut self, style: impl Into<String>) -> Self {
        self.breakpoints = style.into();
        self
    }

    /// Set the initial viewport (builder).
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the instance id length (builder).
    pub fn with_uid_length(mut self, length: usize) -> Self {
        self.uid_length = length;
        self
    }

    /// Enable or disable CSS transitions (builder).
    pub fn with_transitions(mut self, supported: bool) -> Self {
        self.transitions_supported = supported;
        self
    }

    /// Enable or disable mutation observation (builder).
    pub fn with_mutation_observer(mut self, enabled: bool) -> Self {
        self.mutation_observer = enabled;
        self
    }

    /// Set the resize/scroll debounce (builder).
    pub fn with_debounce_ms(mut self, ms: f64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Seed instance id generation (builder).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Bound the event log (builder). `None` keeps every envelope.
    pub fn with_event_log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.event_log_capacity = capacity;
        self
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// The document plus every coordination service.
pub struct Page {
    /// The document.
    pub dom: Dom,
    /// Window size and scroll position.
    pub viewport: Viewport,
    /// Breakpoint tracking.
    pub media: MediaQueryService,
    /// Key command tables and focus traps.
    pub keyboard: KeyCommandRegistry,
    /// Plugin definitions and live instances.
    pub registry: PluginRegistry,
    /// Running motions.
    pub motion: MotionRunner,
    /// Declarative trigger routing.
    pub triggers: TriggerBus,
    /// Log of every emitted event.
    pub events: EventDispatcher,
    config: PageConfig,
    body: NodeId,
    clock_ms: f64,
    /// Instances unregistered while busy, disposed once released.
    pending_dispose: Vec<PluginHandle>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("viewport", &self.viewport)
            .field("elements", &self.dom.len())
            .field("registry", &self.registry)
            .field("clock_ms", &self.clock_ms)
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Create a page with an empty `<html><body>` document.
    pub fn new(config: PageConfig) -> Self {
        let (dom, body) = Dom::with_body();
        Self {
            dom,
            viewport: config.viewport,
            media: MediaQueryService::new(),
            keyboard: KeyCommandRegistry::new(),
            registry: PluginRegistry::new(config.uid_length, config.seed),
            motion: MotionRunner::new(config.transitions_supported),
            triggers: TriggerBus::new(config.debounce_ms, config.mutation_observer),
            events: match config.event_log_capacity {
                Some(capacity) => EventDispatcher::with_capacity(capacity),
                None => EventDispatcher::new(),
            },
            config,
            body,
            clock_ms: 0.0,
            pending_dispose: Vec::new(),
        }
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Timestamp of the last animation frame.
    pub fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Whether the document is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.dom.is_rtl()
    }

    // ── Plugin lifecycle ─────────────────────────────────────────────

    /// Define a plugin. Returns its hyphenated name.
    pub fn define(&mut self, class_name: &str, constructor: Constructor) -> String {
        self.registry.define(class_name, constructor)
    }

    /// The plugin entry point (`$(targets).foundation(call)`).
    ///
    /// `NoArgs` initialises the media service and scans each target (the
    /// whole document when `targets` is empty). `Method` invokes the method
    /// on each target's instance.
    pub fn foundation(&mut self, targets: &[NodeId], call: PluginCall) -> Result<()> {
        match call {
            PluginCall::NoArgs => {
                self.media.init(&self.config.breakpoints, &self.viewport);
                let roots = match (targets.is_empty(), self.dom.root()) {
                    (true, Some(root)) => vec![root],
                    _ => targets.to_vec(),
                };
                for root in roots {
                    self.scan_and_init(root, None);
                }
                Ok(())
            }
            PluginCall::Method { name, args } => {
                for &target in targets {
                    self.call_method(target, &name, &args)?;
                }
                Ok(())
            }
            PluginCall::Invalid(type_name) => Err(FoundationError::InvalidCall { type_name }),
        }
    }

    fn call_method(&mut self, target: NodeId, method: &str, args: &[OptionValue]) -> Result<()> {
        if self.dom.plugin(target).is_none() {
            return Err(FoundationError::MethodNotFound {
                method: method.to_owned(),
                target: "this element".to_owned(),
            });
        }
        match self.with_plugin(target, |plugin, page| plugin.call(page, method, args)) {
            Some(result) => result,
            None => {
                warn!(method, "plugin is busy; call skipped");
                Ok(())
            }
        }
    }

    /// Construct every defined plugin (or only `names`) on the elements under
    /// `root` that carry its `data-<plugin>` attribute.
    ///
    /// `root` itself is included unless it is the document root. Elements
    /// that already carry an instance are skipped with a warning; a failing
    /// constructor is logged and does not stop the scan.
    pub fn scan_and_init(&mut self, root: NodeId, names: Option<&[&str]>) -> ScanReport {
        let names: Vec<String> = match names {
            Some(list) => list.iter().map(|n| (*n).to_owned()).collect(),
            None => self.registry.names(),
        };
        let mut report = ScanReport::default();

        for name in names {
            let def = match self.registry.lookup(&name) {
                Ok(def) => def.clone(),
                Err(err) => {
                    warn!(error = %err, "skipping plugin scan");
                    continue;
                }
            };
            let attr = format!("data-{}", def.name);
            let mut elements = Vec::new();
            if Some(root) != self.dom.root() && self.dom.get(root).is_some_and(|d| d.has_attr(&attr)) {
                elements.push(root);
            }
            elements.extend(self.dom.find_with_attribute(root, &attr));

            for element in elements {
                if !self.dom.contains(element) {
                    continue;
                }
                if self.dom.plugin(element).is_some() {
                    warn!(
                        plugin = %def.name,
                        "tried to initialize a plugin on an element that already has one"
                    );
                    report.skipped.push(element);
                    continue;
                }
                let inline = self
                    .dom
                    .attr(element, "data-options")
                    .map(PluginOptions::parse_data_options)
                    .unwrap_or_default();

                match (def.constructor)(self, element, inline) {
                    Ok(handle) => {
                        if self.dom.plugin(element).is_none() {
                            if let Err(err) = self.register_instance(handle, Some(&def.name)) {
                                error!(plugin = %def.name, error = %err, "plugin registration failed");
                                report.failed.push(element);
                                continue;
                            }
                        }
                        report.initialized.push(element);
                    }
                    Err(err) => {
                        error!(plugin = %def.name, error = %err, "plugin failed to initialize");
                        report.failed.push(element);
                    }
                }
                self.flush();
            }
        }
        debug!(
            initialized = report.initialized.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "plugin scan finished"
        );
        report
    }

    /// Re-run `Plugin::init` on every live instance of the named plugins.
    pub fn reinit(&mut self, names: &[&str]) {
        for &name in names {
            let def_name = match self.registry.lookup(name) {
                Ok(def) => def.name.clone(),
                Err(err) => {
                    warn!(error = %err, "skipping plugin reinit");
                    continue;
                }
            };
            for element in self.dom.query_by_attribute(&format!("data-{def_name}")) {
                let result = self.with_plugin(element, |plugin, page| plugin.init(page));
                if let Some(Err(err)) = result {
                    error!(plugin = %def_name, error = %err, "plugin failed to reinitialize");
                }
            }
        }
    }

    /// Attach a constructed instance. See [`PluginRegistry::register_instance`].
    pub fn register_instance(&mut self, handle: PluginHandle, name: Option<&str>) -> Result<String> {
        self.registry
            .register_instance(&mut self.dom, &mut self.events, handle, name)
    }

    /// Tear down the instance on `element`.
    ///
    /// Safe to call from inside the instance's own hooks; disposal then
    /// happens as soon as the hook returns.
    pub fn unregister_instance(&mut self, element: NodeId) -> Result<()> {
        let gone = self
            .registry
            .unregister_instance(&mut self.dom, &mut self.events, element)?;
        if !gone.disposed {
            self.pending_dispose.push(gone.handle);
        }
        Ok(())
    }

    /// The instance on `element`.
    pub fn instance(&self, element: NodeId) -> Option<PluginHandle> {
        self.dom.plugin(element).cloned()
    }

    /// Inspect the instance on `element` as a concrete plugin type.
    pub fn with_instance<P: Plugin + 'static, R>(&self, element: NodeId, f: impl FnOnce(&P) -> R) -> Option<R> {
        let handle = self.dom.plugin(element)?;
        let plugin = handle.try_borrow().ok()?;
        let result = plugin.as_any().downcast_ref::<P>().map(f);
        result
    }

    /// Remove `element` and its subtree, tearing down the instances and
    /// motions that live there.
    pub fn remove_element(&mut self, element: NodeId) {
        for node in self.dom.walk_depth_first(element) {
            self.motion.cancel(&mut self.dom, node);
            self.keyboard.release_focus(node);
            if self.dom.plugin(node).is_some() {
                if let Err(err) = self.unregister_instance(node) {
                    warn!(error = %err, "teardown of removed element failed");
                }
            }
        }
        self.dom.remove(element);
        self.registry.prune(&self.dom);
        self.flush();
    }

    /// Run `f` against the instance on `element`, if it is not busy.
    fn with_plugin<R>(
        &mut self,
        element: NodeId,
        f: impl FnOnce(&mut (dyn Plugin + 'static), &mut Page) -> R,
    ) -> Option<R> {
        let handle = self.dom.plugin(element).cloned()?;
        let result = match handle.try_borrow_mut() {
            Ok(mut plugin) => Some(f(&mut *plugin, self)),
            Err(_) => {
                debug!("plugin busy; re-entrant delivery skipped");
                None
            }
        };
        self.flush();
        result
    }

    /// Dispose released instances and dispatch queued motion events.
    fn flush(&mut self) {
        for handle in std::mem::take(&mut self.pending_dispose) {
            let busy = match handle.try_borrow_mut() {
                Ok(mut plugin) => {
                    plugin.dispose();
                    false
                }
                Err(_) => true,
            };
            if busy {
                self.pending_dispose.push(handle);
            }
        }
        for envelope in self.motion.take_outbox() {
            self.dispatch(envelope);
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Deliver an envelope to the instances on its path, then to the
    /// document-level `[data-closable]` handler.
    ///
    /// Window-scoped envelopes reach every live instance in registration
    /// order.
    pub fn dispatch(&mut self, envelope: Envelope) {
        self.events.push(envelope.clone());
        let mut envelope = envelope;
        let path = match envelope.target {
            Some(_) => EventDispatcher::delivery_path(&self.dom, &envelope),
            None => self.registry.live_elements(),
        };
        for node in path {
            if envelope.stopped {
                break;
            }
            self.with_plugin(node, |plugin, page| plugin.handle_event(page, &mut envelope));
        }
        if envelope.stopped {
            return;
        }
        if let Some(closable) = TriggerBus::closable_for(&self.dom, &envelope) {
            envelope.stop_propagation();
            self.close_closable(closable);
        }
    }

    fn close_closable(&mut self, closable: Closable) {
        match closable.animation {
            Some(animation) => {
                self.animate(closable.element, Direction::Out, &animation, Some(ZfEvent::Closed));
            }
            None => {
                self.dom.set_visible(closable.element, false);
                self.dispatch(Envelope::bubbling(ZfEvent::Closed, closable.element));
            }
        }
    }

    /// A click on `target`.
    pub fn click(&mut self, target: NodeId) {
        for envelope in self.triggers.click(&self.dom, target) {
            self.dispatch(envelope);
        }
    }

    /// Move focus to `target`.
    pub fn focus(&mut self, target: NodeId) {
        if let Some(previous) = self.dom.active_element().filter(|&p| p != target) {
            self.blur_element(previous);
        }
        if self.dom.focus(target) {
            for envelope in self.triggers.focus_change(&self.dom, target) {
                self.dispatch(envelope);
            }
        }
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        if let Some(previous) = self.dom.active_element() {
            self.blur_element(previous);
        }
    }

    fn blur_element(&mut self, element: NodeId) {
        self.dom.blur();
        for envelope in self.triggers.focus_change(&self.dom, element) {
            self.dispatch(envelope);
        }
    }

    /// A keydown on `target`. Focus traps see it first, then the instances
    /// from `target` upward. Returns whether anything consumed it.
    pub fn key_down(&mut self, target: NodeId, event: KeyEvent) -> bool {
        if let TrapOutcome::Redirected(next) = self.keyboard.on_keydown(&mut self.dom, target, &event) {
            debug!(?next, "focus wrapped by trap");
            return true;
        }
        for node in EventDispatcher::bubble_path(&self.dom, target) {
            if self.with_plugin(node, |plugin, page| plugin.handle_key(page, &event)) == Some(true) {
                return true;
            }
        }
        false
    }

    /// `closeme.zf.<plugin>`: close every other instance's box.
    pub fn close_others(&mut self, plugin: &str, sender: &str) {
        for envelope in self.triggers.close_others(&self.dom, plugin, sender) {
            self.dispatch(envelope);
        }
    }

    // ── Window ───────────────────────────────────────────────────────

    /// The window was resized.
    ///
    /// A breakpoint change is announced immediately; `resizeme` follows
    /// once the debounce elapses on the frame clock.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        if let Some(change) = self.media.on_resize(&self.viewport) {
            self.dispatch(Envelope::window(change.into()));
        }
        self.triggers.schedule_resize(self.clock_ms);
    }

    /// The document was scrolled.
    pub fn scroll(&mut self, left: f64, top: f64) {
        self.viewport.scroll_left = left;
        self.viewport.scroll_top = top;
        self.triggers.schedule_scroll(self.clock_ms);
    }

    /// An animation frame at `timestamp_ms`.
    pub fn animation_frame(&mut self, timestamp_ms: f64) {
        self.clock_ms = timestamp_ms;
        self.motion.frame(&mut self.dom, timestamp_ms);
        self.flush();
        for envelope in self.triggers.frame(&mut self.dom, timestamp_ms) {
            self.dispatch(envelope);
        }
    }

    /// The CSS transition on `element` ended.
    pub fn transition_end(&mut self, element: NodeId) -> bool {
        let ended = self.motion.transition_end(&mut self.dom, element);
        self.flush();
        ended
    }

    /// Pump `count` animation frames, one per `interval` of tokio time.
    pub async fn run_frames(&mut self, interval: Duration, count: usize) {
        let step = interval.as_secs_f64() * 1000.0;
        let mut ticker = tokio::time::interval(interval);
        for _ in 0..count {
            ticker.tick().await;
            let next = self.clock_ms + step;
            self.animation_frame(next);
        }
    }

    // ── Motion ───────────────────────────────────────────────────────

    /// Start a class transition; see [`MotionRunner::animate`].
    pub fn animate(
        &mut self,
        element: NodeId,
        direction: Direction,
        animation: &str,
        follow_up: Option<ZfEvent>,
    ) -> MotionHandle {
        let handle = self
            .motion
            .animate(&mut self.dom, element, direction, animation, follow_up);
        self.flush();
        handle
    }

    /// Frame-driven movement; see [`MotionRunner::move_over_duration`].
    pub fn move_over_duration(&mut self, duration_ms: f64, element: NodeId, per_frame: FrameFn) -> MotionHandle {
        let handle = self
            .motion
            .move_over_duration(&mut self.dom, duration_ms, element, per_frame);
        self.flush();
        handle
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::ElementData;
    use crate::event::{Key, KeyEvent};
    use crate::motion::MotionOutcome;
    use crate::plugin::constructor;
    use crate::testing::fixtures::Toggler;

    fn page() -> Page {
        Page::new(
            PageConfig::new()
                .with_breakpoints("small=0px&medium=640px&large=1024px")
                .with_viewport(Viewport::new(800.0, 600.0))
                .with_seed(1),
        )
    }

    fn is_open(page: &Page, el: NodeId) -> bool {
        page.with_instance(el, |t: &Toggler| t.is_open()).unwrap_or(false)
    }

    // ── Config ───────────────────────────────────────────────────────

    #[test]
    fn config_builder() {
        let config = PageConfig::new()
            .with_uid_length(8)
            .with_transitions(false)
            .with_mutation_observer(false)
            .with_debounce_ms(20.0)
            .with_seed(3);
        assert_eq!(config.uid_length, 8);
        assert!(!config.transitions_supported);
        assert!(!config.mutation_observer);
        assert_eq!(config.debounce_ms, 20.0);
        assert_eq!(config.seed, Some(3));
        assert_eq!(PageConfig::default().breakpoints, DEFAULT_BREAKPOINTS);
        assert_eq!(PageConfig::default().event_log_capacity, Some(DEFAULT_EVENT_LOG_CAPACITY));
    }

    // ── Entry point ──────────────────────────────────────────────────

    #[test]
    fn foundation_initialises_media_and_scans() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let el = page.dom.insert_child(body, ElementData::new("div").with_attr("data-toggler", ""));

        page.foundation(&[], PluginCall::NoArgs).unwrap();
        assert!(page.media.is_watching());
        assert_eq!(page.media.current(), Some("medium"));
        assert!(page.instance(el).is_some());
        assert_eq!(page.events.count("init.zf.toggler"), 1);
    }

    #[test]
    fn method_calls_reach_the_instance() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let el = page.dom.insert_child(body, ElementData::new("div").with_attr("data-toggler", ""));
        page.foundation(&[], PluginCall::NoArgs).unwrap();

        page.foundation(&[el], "open".into()).unwrap();
        assert!(is_open(&page, el));

        let err = page.foundation(&[el], "explode".into()).unwrap_err();
        assert_eq!(err.to_string(), "'explode' is not an available method for Toggler");

        let err = page.foundation(&[body], "open".into()).unwrap_err();
        assert_eq!(err.to_string(), "'open' is not an available method for this element");

        let err = page.foundation(&[el], PluginCall::Invalid("number".into())).unwrap_err();
        assert!(matches!(err, FoundationError::InvalidCall { .. }));
    }

    #[test]
    fn scan_includes_root_but_not_the_document() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let outer = page.dom.insert_child(body, ElementData::new("div").with_attr("data-toggler", ""));
        let inner = page.dom.insert_child(outer, ElementData::new("div").with_attr("data-toggler", ""));

        let report = page.scan_and_init(outer, Some(&["toggler"]));
        assert_eq!(report.initialized, vec![outer, inner]);

        let html = page.dom.root().unwrap();
        page.dom.set_attribute(html, "data-toggler", "");
        let report = page.scan_and_init(html, None);
        assert!(page.instance(html).is_none());
        assert_eq!(report.skipped, vec![outer, inner]);
    }

    #[test]
    fn failing_constructor_is_isolated() {
        let mut page = page();
        page.define(
            "Broken",
            constructor(|_, _, _| {
                Err(FoundationError::Construct {
                    plugin: "broken".into(),
                    message: "no anchor".into(),
                })
            }),
        );
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let el = page.dom.insert_child(
            body,
            ElementData::new("div")
                .with_attr("data-broken", "")
                .with_attr("data-toggler", ""),
        );
        let report = page.scan_and_init(body, None);
        assert_eq!(report.failed, vec![el]);
        assert_eq!(report.initialized, vec![el]);
        assert!(page.instance(el).is_some());
    }

    #[test]
    fn unknown_names_are_skipped() {
        let mut page = page();
        let report = page.scan_and_init(page.body(), Some(&["nothing"]));
        assert_eq!(report, ScanReport::default());
    }

    #[test]
    fn options_reach_the_constructor() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let el = page.dom.insert_child(
            body,
            ElementData::new("div")
                .with_attr("data-toggler", "")
                .with_attr("data-options", "animationIn: fade-in; closeOnEsc: false"),
        );
        page.scan_and_init(body, None);
        let options = page.with_instance(el, |t: &Toggler| t.options().clone()).unwrap();
        assert_eq!(options.str("animationIn"), Some("fade-in"));
        assert_eq!(options.bool("closeOnEsc"), Some(false));
    }

    #[test]
    fn reinit_runs_init_again() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let el = page.dom.insert_child(body, ElementData::new("div").with_attr("data-toggler", ""));
        page.scan_and_init(body, None);
        page.reinit(&["Toggler"]);
        assert_eq!(page.with_instance(el, |t: &Toggler| t.init_count()), Some(2));
    }

    // ── Teardown ─────────────────────────────────────────────────────

    #[test]
    fn destroy_from_inside_the_plugin_disposes_after_return() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let el = page.dom.insert_child(body, ElementData::new("div").with_attr("data-toggler", ""));
        page.scan_and_init(body, None);
        let handle = page.instance(el).unwrap();

        page.foundation(&[el], "destroy".into()).unwrap();
        assert!(page.instance(el).is_none());
        assert!(page.registry.live_uuids().is_empty());
        let disposed = handle.borrow().as_any().downcast_ref::<Toggler>().map(Toggler::is_disposed);
        assert_eq!(disposed, Some(true));
        assert_eq!(page.events.count("destroyed.zf.toggler"), 1);
    }

    #[test]
    fn removing_an_element_tears_down_its_subtree() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let wrapper = page.dom.insert_child(body, ElementData::new("section"));
        let el = page.dom.insert_child(wrapper, ElementData::new("div").with_attr("data-toggler", ""));
        page.scan_and_init(body, None);
        let mut motion = page.animate(el, Direction::In, "fade-in", None);

        page.remove_element(wrapper);
        assert!(page.registry.live_uuids().is_empty());
        assert_eq!(motion.try_outcome(), Some(MotionOutcome::Cancelled));
        assert_eq!(page.events.count("destroyed.zf.toggler"), 1);
    }

    // ── Routing ──────────────────────────────────────────────────────

    #[test]
    fn trigger_clicks_reach_instances() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let pane = page.dom.insert_child(
            body,
            ElementData::new("div").with_id("pane").with_attr("data-toggler", ""),
        );
        let opener = page.dom.insert_child(body, ElementData::new("button").with_attr("data-open", "pane"));
        let toggler = page.dom.insert_child(body, ElementData::new("button").with_attr("data-toggle", "pane"));
        page.scan_and_init(body, None);

        page.click(opener);
        assert!(is_open(&page, pane));
        page.click(toggler);
        assert!(!is_open(&page, pane));
    }

    #[test]
    fn closable_hides_and_reports_closed() {
        let mut page = page();
        let body = page.body();
        let callout = page.dom.insert_child(body, ElementData::new("div").with_attr("data-closable", ""));
        let button = page.dom.insert_child(callout, ElementData::new("button").with_attr("data-close", ""));

        page.click(button);
        assert!(!page.dom.is_visible(callout));
        assert_eq!(page.events.drain_names(), vec!["close.zf.trigger", "closed.zf"]);
    }

    #[test]
    fn animated_closable_waits_for_transition_end() {
        let mut page = page();
        let body = page.body();
        let callout = page.dom.insert_child(
            body,
            ElementData::new("div").with_attr("data-closable", "fade-out"),
        );
        let button = page.dom.insert_child(callout, ElementData::new("button").with_attr("data-close", ""));

        page.click(button);
        assert!(page.dom.has_class(callout, "mui-leave"));
        assert_eq!(page.events.count("closed.zf"), 0);
        page.animation_frame(16.0);
        assert!(page.transition_end(callout));
        assert!(!page.dom.is_visible(callout));
        assert_eq!(page.events.count("closed.zf"), 1);
    }

    #[test]
    fn keys_go_to_the_enclosing_instance() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let pane = page.dom.insert_child(body, ElementData::new("div").with_attr("data-toggler", ""));
        let link = page.dom.insert_child(pane, ElementData::new("a").with_attr("href", "#"));
        page.scan_and_init(body, None);
        page.foundation(&[pane], "open".into()).unwrap();

        assert!(!page.key_down(link, KeyEvent::plain(Key::Char('x'))));
        assert!(page.key_down(link, KeyEvent::plain(Key::Escape)));
        assert!(!is_open(&page, pane));
    }

    #[test]
    fn resize_announces_breakpoint_then_debounced_resizeme() {
        let mut page = page();
        let body = page.body();
        page.dom.insert_child(body, ElementData::new("div").with_attr("data-resize", ""));
        page.foundation(&[], PluginCall::NoArgs).unwrap();
        page.events.drain();

        page.resize(1200.0, 600.0);
        assert_eq!(page.events.drain_names(), vec!["changed.zf.mediaquery"]);
        page.animation_frame(5.0);
        assert!(page.events.is_empty());
        page.animation_frame(16.0);
        assert_eq!(page.events.drain_names(), vec!["resizeme.zf.trigger"]);
    }

    #[test]
    fn breakpoint_changes_reach_every_instance() {
        let mut page = page();
        page.define("Toggler", Toggler::constructor());
        let body = page.body();
        let first = page.dom.insert_child(body, ElementData::new("div").with_attr("data-toggler", ""));
        let second = page.dom.insert_child(body, ElementData::new("div").with_attr("data-toggler", ""));
        page.foundation(&[], PluginCall::NoArgs).unwrap();

        page.resize(1200.0, 600.0);
        for el in [first, second] {
            let seen = page.with_instance(el, |t: &Toggler| t.seen().to_vec()).unwrap();
            assert_eq!(seen, vec!["changed.zf.mediaquery".to_owned()]);
        }
    }

    #[test]
    fn event_log_keeps_the_newest_envelopes() {
        let mut page = Page::new(
            PageConfig::new()
                .with_breakpoints("small=0px&large=1024px")
                .with_viewport(Viewport::new(800.0, 600.0))
                .with_event_log_capacity(Some(4)),
        );
        page.foundation(&[], PluginCall::NoArgs).unwrap();
        for i in 0..100 {
            let width = if i % 2 == 0 { 1200.0 } else { 800.0 };
            page.resize(width, 600.0);
        }
        assert_eq!(page.events.pending_count(), 4);
        assert_eq!(page.events.count("changed.zf.mediaquery"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn run_frames_advances_the_clock() {
        let mut page = page();
        let body = page.body();
        let el = page.dom.insert_child(body, ElementData::new("div"));
        let mut motion = page.animate(el, Direction::In, "fade-in", None);

        page.run_frames(Duration::from_millis(16), 3).await;
        assert_eq!(page.now_ms(), 48.0);
        assert!(page.dom.has_class(el, "mui-enter-active"));
        assert_eq!(motion.try_outcome(), None);
        page.transition_end(el);
        assert_eq!(motion.await, MotionOutcome::Finished);
    }
}
