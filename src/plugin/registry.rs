//! Plugin definitions and live-instance bookkeeping.
//!
//! [`PluginRegistry`] maps plugin names to constructors, hands out unique ids
//! for live instances, and performs the attach/teardown half of the plugin
//! lifecycle. Scanning the document and calling constructors happens on
//! [`Page`](crate::page::Page), which owns the registry.

use std::collections::HashMap;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::options::OptionValue;
use super::traits::{Constructor, PluginHandle};
use crate::dom::{Dom, NodeId};
use crate::error::{FoundationError, Result};
use crate::event::{Envelope, EventDispatcher, ZfEvent};

/// Default length of generated instance ids.
pub const DEFAULT_UID_LENGTH: usize = 6;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `DropdownMenu` -> `dropdown-menu`.
///
/// A hyphen goes between every lowercase letter followed by an uppercase one,
/// then the whole name is lowercased.
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            out.push('-');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c.to_ascii_lowercase());
    }
    out
}

// ---------------------------------------------------------------------------
// Definitions and records
// ---------------------------------------------------------------------------

/// A defined plugin.
#[derive(Clone)]
pub struct PluginDef {
    /// The class name as given to `define`.
    pub class_name: String,
    /// The hyphenated name used for `data-*` attributes and events.
    pub name: String,
    pub constructor: Constructor,
}

impl std::fmt::Debug for PluginDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDef")
            .field("class_name", &self.class_name)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A live instance as the registry sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub uuid: String,
    pub element: NodeId,
    /// Hyphenated plugin name.
    pub name: String,
}

/// What `unregister_instance` tore down.
pub struct Unregistered {
    pub record: InstanceRecord,
    pub handle: PluginHandle,
    /// `false` when the instance was busy (it unregistered itself from inside
    /// one of its own hooks); the caller must dispose it once released.
    pub disposed: bool,
}

impl std::fmt::Debug for Unregistered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unregistered")
            .field("record", &self.record)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

/// How the plugin entry point was invoked.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginCall {
    /// Initialise: start the media service and scan for plugins.
    NoArgs,
    /// Invoke a public method on each target's instance.
    Method { name: String, args: Vec<OptionValue> },
    /// Called with something that is neither; carries the argument's type name.
    Invalid(String),
}

impl PluginCall {
    pub fn method(name: impl Into<String>, args: Vec<OptionValue>) -> Self {
        PluginCall::Method {
            name: name.into(),
            args,
        }
    }
}

impl From<&str> for PluginCall {
    fn from(name: &str) -> Self {
        PluginCall::method(name, Vec::new())
    }
}

/// Outcome of a document scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub initialized: Vec<NodeId>,
    /// Elements that already carried an instance.
    pub skipped: Vec<NodeId>,
    /// Elements whose constructor or registration failed.
    pub failed: Vec<NodeId>,
}

// ---------------------------------------------------------------------------
// PluginRegistry
// ---------------------------------------------------------------------------

/// Plugin constructors in definition order, plus the live instance list.
pub struct PluginRegistry {
    defs: Vec<PluginDef>,
    /// Class name and hyphenated name -> index into `defs`.
    by_name: HashMap<String, usize>,
    uuids: Vec<String>,
    records: HashMap<NodeId, InstanceRecord>,
    uid_length: usize,
    rng: StdRng,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("defs", &self.defs)
            .field("uuids", &self.uuids)
            .finish_non_exhaustive()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_UID_LENGTH, None)
    }
}

impl PluginRegistry {
    /// Create a registry. A `seed` makes generated ids reproducible.
    pub fn new(uid_length: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            defs: Vec::new(),
            by_name: HashMap::new(),
            uuids: Vec::new(),
            records: HashMap::new(),
            uid_length,
            rng,
        }
    }

    // ── Definitions ──────────────────────────────────────────────────

    /// Define a plugin under its hyphenated class name. Returns that name.
    pub fn define(&mut self, class_name: &str, constructor: Constructor) -> String {
        self.define_named(class_name, &hyphenate(class_name), constructor)
    }

    /// Define a plugin under an explicit attribute name.
    ///
    /// Redefining a name replaces the constructor but keeps its scan position.
    pub fn define_named(&mut self, class_name: &str, name: &str, constructor: Constructor) -> String {
        let name = hyphenate(name);
        let def = PluginDef {
            class_name: class_name.to_owned(),
            name: name.clone(),
            constructor,
        };
        let index = match self.by_name.get(&name) {
            Some(&index) => {
                debug!(plugin = %name, "plugin redefined");
                let old = std::mem::replace(&mut self.defs[index], def);
                if old.class_name != class_name
                    && old.class_name != name
                    && self.by_name.get(&old.class_name) == Some(&index)
                {
                    self.by_name.remove(&old.class_name);
                }
                index
            }
            None => {
                self.defs.push(def);
                self.defs.len() - 1
            }
        };
        self.by_name.insert(name.clone(), index);
        self.by_name.insert(class_name.to_owned(), index);
        name
    }

    /// Look a definition up by class name or hyphenated name.
    pub fn get(&self, name: &str) -> Option<&PluginDef> {
        self.by_name.get(name).map(|&i| &self.defs[i])
    }

    /// Like [`get`](Self::get), but a missing name is an error.
    pub fn lookup(&self, name: &str) -> Result<&PluginDef> {
        self.get(name)
            .ok_or_else(|| FoundationError::UnknownPlugin(name.to_owned()))
    }

    /// Hyphenated names in definition order (the default scan order).
    pub fn names(&self) -> Vec<String> {
        self.defs.iter().map(|d| d.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    // ── Ids ──────────────────────────────────────────────────────────

    /// `length` random base-36 digits, suffixed `-namespace` when given.
    pub fn get_yo_digits(&mut self, length: usize, namespace: Option<&str>) -> String {
        let mut id: String = (0..length)
            .map(|_| BASE36[self.rng.random_range(0..BASE36.len())] as char)
            .collect();
        if let Some(ns) = namespace.filter(|ns| !ns.is_empty()) {
            id.push('-');
            id.push_str(ns);
        }
        id
    }

    // ── Live instances ───────────────────────────────────────────────

    /// Attach `handle` to its element and record it as live.
    ///
    /// `name` defaults to the hyphenated class name. Registering the same
    /// instance twice is a no-op returning the existing id; a different
    /// instance on an initialised element is refused.
    pub fn register_instance(
        &mut self,
        dom: &mut Dom,
        events: &mut EventDispatcher,
        handle: PluginHandle,
        name: Option<&str>,
    ) -> Result<String> {
        let (element, class_name) = {
            let plugin = handle.borrow();
            (plugin.element(), plugin.class_name().to_owned())
        };
        let name = hyphenate(name.unwrap_or(&class_name));

        if let Some(existing) = dom.plugin(element) {
            let record = self.records.get(&element);
            if Rc::ptr_eq(existing, &handle) {
                if let Some(record) = record {
                    return Ok(record.uuid.clone());
                }
            } else {
                let existing = record.map_or_else(|| "unknown".to_owned(), |r| r.name.clone());
                warn!(plugin = %name, existing = %existing, "element already has a plugin instance");
                return Err(FoundationError::AlreadyInitialized { existing });
            }
        }

        if !dom.contains(element) {
            return Err(FoundationError::NodeNotFound(element));
        }
        let uuid = self.get_yo_digits(self.uid_length, Some(&name));
        dom.attach_plugin(element, handle);
        let attr = format!("data-{name}");
        if dom.attr(element, &attr).is_none() {
            dom.set_attribute(element, &attr, uuid.clone());
        }
        self.uuids.push(uuid.clone());
        self.records.insert(
            element,
            InstanceRecord {
                uuid: uuid.clone(),
                element,
                name: name.clone(),
            },
        );
        events.push(Envelope::bubbling(ZfEvent::Init { plugin: name.clone() }, element));
        debug!(plugin = %name, uuid = %uuid, "plugin registered");
        Ok(uuid)
    }

    /// Tear down the instance on `element`: drop its id, the back-reference
    /// and the `data-<plugin>` attribute, emit `destroyed`, and dispose it.
    pub fn unregister_instance(
        &mut self,
        dom: &mut Dom,
        events: &mut EventDispatcher,
        element: NodeId,
    ) -> Result<Unregistered> {
        let record = self
            .records
            .remove(&element)
            .ok_or(FoundationError::NotInitialized(element))?;
        self.uuids.retain(|u| *u != record.uuid);
        let handle = dom
            .detach_plugin(element)
            .ok_or(FoundationError::NotInitialized(element))?;
        dom.remove_attribute(element, &format!("data-{}", record.name));
        events.push(Envelope::bubbling(
            ZfEvent::Destroyed {
                plugin: record.name.clone(),
            },
            element,
        ));

        let disposed = match handle.try_borrow_mut() {
            Ok(mut plugin) => {
                plugin.dispose();
                true
            }
            Err(_) => false,
        };
        debug!(plugin = %record.name, uuid = %record.uuid, disposed, "plugin unregistered");
        Ok(Unregistered {
            record,
            handle,
            disposed,
        })
    }

    /// Forget records whose element left the document.
    ///
    /// Returns the ids dropped. The back-references went with the elements.
    pub fn prune(&mut self, dom: &Dom) -> Vec<String> {
        let stale: Vec<NodeId> = self.records.keys().copied().filter(|&el| !dom.contains(el)).collect();
        let mut dropped = Vec::new();
        for element in stale {
            if let Some(record) = self.records.remove(&element) {
                self.uuids.retain(|u| *u != record.uuid);
                dropped.push(record.uuid);
            }
        }
        dropped
    }

    /// Ids of live instances, in registration order.
    pub fn live_uuids(&self) -> &[String] {
        &self.uuids
    }

    /// Elements carrying live instances, in registration order.
    pub fn live_elements(&self) -> Vec<NodeId> {
        let mut records: Vec<&InstanceRecord> = self.records.values().collect();
        records.sort_by_key(|r| self.uuids.iter().position(|u| *u == r.uuid));
        records.into_iter().map(|r| r.element).collect()
    }

    /// The record for the instance on `element`.
    pub fn instance_of(&self, element: NodeId) -> Option<&InstanceRecord> {
        self.records.get(&element)
    }

    /// Elements carrying a live instance of the plugin `name`.
    pub fn elements_of(&self, name: &str) -> Vec<NodeId> {
        self.records
            .values()
            .filter(|r| r.name == name)
            .map(|r| r.element)
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::any::Any;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::ElementData;
    use crate::plugin::traits::{constructor, into_handle, Plugin};

    struct Stub {
        element: NodeId,
        disposed: bool,
    }

    impl Plugin for Stub {
        fn class_name(&self) -> &str {
            "DropdownMenu"
        }

        fn element(&self) -> NodeId {
            self.element
        }

        fn dispose(&mut self) {
            self.disposed = true;
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn setup() -> (PluginRegistry, Dom, EventDispatcher, NodeId) {
        let (mut dom, body) = Dom::with_body();
        let el = dom.insert_child(body, ElementData::new("ul"));
        (PluginRegistry::new(6, Some(7)), dom, EventDispatcher::new(), el)
    }

    fn stub(element: NodeId) -> PluginHandle {
        into_handle(Stub {
            element,
            disposed: false,
        })
    }

    // ── Naming ───────────────────────────────────────────────────────

    #[test]
    fn hyphenation() {
        assert_eq!(hyphenate("DropdownMenu"), "dropdown-menu");
        assert_eq!(hyphenate("Reveal"), "reveal");
        assert_eq!(hyphenate("OffCanvas"), "off-canvas");
        assert_eq!(hyphenate("already-kebab"), "already-kebab");
    }

    #[test]
    fn define_stores_both_names_in_order() {
        let (mut reg, ..) = setup();
        let ctor = constructor(|_, el, _| Ok(stub(el)));
        assert_eq!(reg.define("DropdownMenu", ctor.clone()), "dropdown-menu");
        reg.define("Tabs", ctor.clone());
        assert_eq!(reg.get("DropdownMenu").map(|d| d.name.as_str()), Some("dropdown-menu"));
        assert_eq!(reg.get("dropdown-menu").map(|d| d.class_name.as_str()), Some("DropdownMenu"));
        assert_eq!(reg.names(), vec!["dropdown-menu", "tabs"]);

        reg.define("DropdownMenu", ctor);
        assert_eq!(reg.names(), vec!["dropdown-menu", "tabs"]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn redefining_under_new_class_drops_old_class_key() {
        let (mut reg, ..) = setup();
        let ctor = constructor(|_, el, _| Ok(stub(el)));
        reg.define_named("Toggler", "widgetfoo", ctor.clone());
        assert!(reg.get("Toggler").is_some());

        reg.define_named("Switcher", "widgetfoo", ctor);
        assert!(reg.get("Toggler").is_none());
        assert_eq!(reg.get("Switcher").map(|d| d.name.as_str()), Some("widgetfoo"));
        assert_eq!(reg.get("widgetfoo").map(|d| d.class_name.as_str()), Some("Switcher"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn lookup_reports_unknown_names() {
        let (mut reg, ..) = setup();
        reg.define("Tabs", constructor(|_, el, _| Ok(stub(el))));
        assert_eq!(reg.lookup("tabs").map(|d| d.class_name.as_str()).ok(), Some("Tabs"));
        let err = reg.lookup("accordion").unwrap_err();
        assert!(matches!(err, FoundationError::UnknownPlugin(ref name) if name == "accordion"));
    }

    #[test]
    fn yo_digits_shape() {
        let (mut reg, ..) = setup();
        let id = reg.get_yo_digits(6, Some("tabs"));
        let (digits, ns) = id.split_once('-').unwrap();
        assert_eq!(digits.len(), 6);
        assert!(digits.bytes().all(|b| BASE36.contains(&b)));
        assert_eq!(ns, "tabs");
        assert_eq!(reg.get_yo_digits(3, None).len(), 3);
    }

    #[test]
    fn seeded_ids_are_reproducible() {
        let mut a = PluginRegistry::new(6, Some(42));
        let mut b = PluginRegistry::new(6, Some(42));
        assert_eq!(a.get_yo_digits(8, None), b.get_yo_digits(8, None));
    }

    // ── Register / unregister ────────────────────────────────────────

    #[test]
    fn live_elements_follow_registration_order() {
        let (mut reg, mut dom, mut events, first) = setup();
        let body = dom.parent(first).unwrap();
        let second = dom.insert_child(body, ElementData::new("ul"));
        let third = dom.insert_child(body, ElementData::new("ul"));
        for el in [third, first, second] {
            reg.register_instance(&mut dom, &mut events, stub(el), None).unwrap();
        }
        assert_eq!(reg.live_elements(), vec![third, first, second]);

        reg.unregister_instance(&mut dom, &mut events, first).unwrap();
        assert_eq!(reg.live_elements(), vec![third, second]);
    }

    #[test]
    fn register_sets_attribute_and_emits_init() {
        let (mut reg, mut dom, mut events, el) = setup();
        let uuid = reg.register_instance(&mut dom, &mut events, stub(el), None).unwrap();

        assert!(uuid.ends_with("-dropdown-menu"));
        assert_eq!(dom.attr(el, "data-dropdown-menu"), Some(uuid.as_str()));
        assert!(dom.plugin(el).is_some());
        assert_eq!(reg.live_uuids(), &[uuid.clone()]);
        assert_eq!(reg.instance_of(el).map(|r| r.uuid.as_str()), Some(uuid.as_str()));
        assert_eq!(events.drain_names(), vec!["init.zf.dropdown-menu"]);
    }

    #[test]
    fn existing_attribute_value_is_kept() {
        let (mut reg, mut dom, mut events, el) = setup();
        dom.set_attribute(el, "data-menu", "");
        reg.register_instance(&mut dom, &mut events, stub(el), Some("menu")).unwrap();
        assert_eq!(dom.attr(el, "data-menu"), Some(""));
    }

    #[test]
    fn same_instance_twice_is_a_noop() {
        let (mut reg, mut dom, mut events, el) = setup();
        let handle = stub(el);
        let first = reg.register_instance(&mut dom, &mut events, handle.clone(), None).unwrap();
        let second = reg.register_instance(&mut dom, &mut events, handle, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(reg.live_uuids().len(), 1);
        assert_eq!(events.count("init.zf.dropdown-menu"), 1);
    }

    #[test]
    fn different_instance_is_refused() {
        let (mut reg, mut dom, mut events, el) = setup();
        reg.register_instance(&mut dom, &mut events, stub(el), None).unwrap();
        let err = reg.register_instance(&mut dom, &mut events, stub(el), None).unwrap_err();
        assert!(matches!(err, FoundationError::AlreadyInitialized { existing } if existing == "dropdown-menu"));
        assert_eq!(reg.live_uuids().len(), 1);
    }

    #[test]
    fn unregister_tears_down_and_disposes() {
        let (mut reg, mut dom, mut events, el) = setup();
        let handle = stub(el);
        reg.register_instance(&mut dom, &mut events, handle.clone(), None).unwrap();
        events.drain();

        let gone = reg.unregister_instance(&mut dom, &mut events, el).unwrap();
        assert!(gone.disposed);
        assert!(reg.live_uuids().is_empty());
        assert!(dom.plugin(el).is_none());
        assert_eq!(dom.attr(el, "data-dropdown-menu"), None);
        assert_eq!(events.drain_names(), vec!["destroyed.zf.dropdown-menu"]);
        let disposed = handle.borrow().as_any().downcast_ref::<Stub>().map(|p| p.disposed);
        assert_eq!(disposed, Some(true));

        let err = reg.unregister_instance(&mut dom, &mut events, el).unwrap_err();
        assert!(matches!(err, FoundationError::NotInitialized(_)));
    }

    #[test]
    fn busy_instance_defers_dispose() {
        let (mut reg, mut dom, mut events, el) = setup();
        let handle = stub(el);
        reg.register_instance(&mut dom, &mut events, handle.clone(), None).unwrap();
        let _busy = handle.borrow_mut();
        let gone = reg.unregister_instance(&mut dom, &mut events, el).unwrap();
        assert!(!gone.disposed);
    }

    #[test]
    fn prune_drops_removed_elements() {
        let (mut reg, mut dom, mut events, el) = setup();
        let uuid = reg.register_instance(&mut dom, &mut events, stub(el), None).unwrap();
        dom.remove(el);
        assert_eq!(reg.prune(&dom), vec![uuid]);
        assert!(reg.live_uuids().is_empty());
    }

    #[test]
    fn plugin_call_from_str() {
        assert_eq!(PluginCall::from("open"), PluginCall::method("open", Vec::new()));
    }
}
