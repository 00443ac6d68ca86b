//! Plugin trait: the contract every widget instance fulfils.
//!
//! A plugin is bound to one element. The page owns the instance through a
//! shared [`PluginHandle`]; the element's back-reference and the registry's
//! record both point at the same handle, so identity can be compared with
//! `Rc::ptr_eq`.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use super::options::{OptionValue, PluginOptions};
use crate::dom::NodeId;
use crate::error::{FoundationError, Result};
use crate::event::{Envelope, KeyEvent};
use crate::page::Page;

// ---------------------------------------------------------------------------
// Plugin trait
// ---------------------------------------------------------------------------

/// Core trait implemented by every widget plugin.
///
/// Object-safe: all methods take `&self`/`&mut self`, and hooks receive the
/// [`Page`] so a plugin can query media, collision and key services or
/// dispatch events of its own while it runs.
pub trait Plugin {
    /// The plugin's class name (e.g. `"Dropdown"`, `"DropdownMenu"`).
    ///
    /// Hyphenated, it names the `data-*` attribute and the event namespace.
    fn class_name(&self) -> &str;

    /// The element this instance is bound to.
    fn element(&self) -> NodeId;

    /// (Re)initialise against the current document. Called by
    /// [`Page::reinit`]; constructors usually call it themselves.
    fn init(&mut self, _page: &mut Page) -> Result<()> {
        Ok(())
    }

    /// Invoke a public method by name.
    ///
    /// The default knows no methods.
    fn call(&mut self, _page: &mut Page, method: &str, _args: &[OptionValue]) -> Result<()> {
        Err(FoundationError::MethodNotFound {
            method: method.to_owned(),
            target: self.class_name().to_owned(),
        })
    }

    /// React to an event delivered to (or bubbling through) the element.
    ///
    /// Call [`Envelope::stop_propagation`] to keep it from ancestors.
    fn handle_event(&mut self, _page: &mut Page, _envelope: &mut Envelope) {}

    /// React to a keydown inside the element. Return `true` when consumed.
    fn handle_key(&mut self, _page: &mut Page, _event: &KeyEvent) -> bool {
        false
    }

    /// Release everything the instance holds. After this the instance must
    /// not be used again.
    fn dispose(&mut self) {}

    /// Downcast to `&dyn Any` for runtime type inspection.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any` for mutable runtime type inspection.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shared, interior-mutable plugin instance.
pub type PluginHandle = Rc<RefCell<dyn Plugin>>;

/// Builds a plugin for an element from its parsed `data-options`.
pub type Constructor = Rc<dyn Fn(&mut Page, NodeId, PluginOptions) -> Result<PluginHandle>>;

/// Wrap a plugin in a [`PluginHandle`].
pub fn into_handle<P: Plugin + 'static>(plugin: P) -> PluginHandle {
    Rc::new(RefCell::new(plugin))
}

/// Wrap a constructor closure in a [`Constructor`].
pub fn constructor<F>(f: F) -> Constructor
where
    F: Fn(&mut Page, NodeId, PluginOptions) -> Result<PluginHandle> + 'static,
{
    Rc::new(f)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementData;
    use crate::page::PageConfig;

    struct Inert {
        element: NodeId,
    }

    impl Plugin for Inert {
        fn class_name(&self) -> &str {
            "Inert"
        }

        fn element(&self) -> NodeId {
            self.element
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn default_call_reports_missing_method() {
        let mut page = Page::new(PageConfig::default());
        let body = page.body();
        let el = page.dom.insert_child(body, ElementData::new("div"));
        let handle = into_handle(Inert { element: el });

        let err = handle.borrow_mut().call(&mut page, "open", &[]).unwrap_err();
        assert_eq!(err.to_string(), "'open' is not an available method for Inert");
        assert!(handle.borrow_mut().init(&mut page).is_ok());
    }

    #[test]
    fn downcast_through_handle() {
        let mut page = Page::new(PageConfig::default());
        let body = page.body();
        let handle = into_handle(Inert { element: body });
        let borrowed = handle.borrow();
        assert_eq!(borrowed.as_any().downcast_ref::<Inert>().map(|p| p.element), Some(body));
    }
}
