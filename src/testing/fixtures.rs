//! A minimal plugin for exercising the coordination layer.
//!
//! [`Toggler`] opens and closes its element in response to trigger events,
//! its public methods and the `ESCAPE`/`ENTER` key commands, animating with
//! the motion runner when `animationIn`/`animationOut` are set.

use std::any::Any;

use crate::dom::NodeId;
use crate::error::{FoundationError, Result};
use crate::event::{CommandTable, Envelope, KeyDispatch, KeyEvent, KeyHandlers, ZfEvent};
use crate::motion::Direction;
use crate::page::Page;
use crate::plugin::{constructor, into_handle, Constructor, OptionValue, Plugin, PluginOptions};

/// Open/close plugin bound to one element.
#[derive(Debug)]
pub struct Toggler {
    element: NodeId,
    options: PluginOptions,
    open: bool,
    init_count: u32,
    seen: Vec<String>,
    disposed: bool,
}

impl Toggler {
    pub const CLASS: &'static str = "Toggler";

    pub fn defaults() -> PluginOptions {
        PluginOptions::new()
            .with("animationIn", "")
            .with("animationOut", "")
            .with("closeOnEsc", true)
    }

    /// Constructor for [`Page::define`].
    pub fn constructor() -> Constructor {
        constructor(|page, element, inline| {
            let options = PluginOptions::resolve(&Toggler::defaults(), &page.dom, element, &inline);
            let mut toggler = Toggler {
                element,
                options,
                open: false,
                init_count: 0,
                seen: Vec::new(),
                disposed: false,
            };
            toggler.init(page)?;
            Ok(into_handle(toggler))
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn init_count(&self) -> u32 {
        self.init_count
    }

    /// Names of the events delivered to this instance.
    pub fn seen(&self) -> &[String] {
        &self.seen
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn animation(&self, key: &str) -> Option<String> {
        self.options.str(key).filter(|a| !a.is_empty()).map(str::to_owned)
    }

    fn open(&mut self, page: &mut Page) {
        if self.open {
            return;
        }
        self.open = true;
        page.dom.add_class(self.element, "is-open");
        match self.animation("animationIn") {
            Some(animation) => {
                page.animate(self.element, Direction::In, &animation, None);
            }
            None => page.dom.set_visible(self.element, true),
        }
    }

    fn close(&mut self, page: &mut Page) {
        if !self.open {
            return;
        }
        self.open = false;
        page.dom.remove_class(self.element, "is-open");
        match self.animation("animationOut") {
            Some(animation) => {
                page.animate(self.element, Direction::Out, &animation, None);
            }
            None => page.dom.set_visible(self.element, false),
        }
    }

    fn toggle(&mut self, page: &mut Page) {
        if self.open {
            self.close(page);
        } else {
            self.open(page);
        }
    }
}

impl Plugin for Toggler {
    fn class_name(&self) -> &str {
        Self::CLASS
    }

    fn element(&self) -> NodeId {
        self.element
    }

    fn init(&mut self, page: &mut Page) -> Result<()> {
        page.keyboard.register(
            Self::CLASS,
            CommandTable::flat([("ESCAPE", "close"), ("ENTER", "toggle")]),
        );
        self.init_count += 1;
        Ok(())
    }

    fn call(&mut self, page: &mut Page, method: &str, _args: &[OptionValue]) -> Result<()> {
        match method {
            "open" => self.open(page),
            "close" => self.close(page),
            "toggle" => self.toggle(page),
            "destroy" => page.unregister_instance(self.element)?,
            _ => {
                return Err(FoundationError::MethodNotFound {
                    method: method.to_owned(),
                    target: Self::CLASS.to_owned(),
                })
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, page: &mut Page, envelope: &mut Envelope) {
        self.seen.push(envelope.name());
        match envelope.event {
            ZfEvent::Open => self.open(page),
            ZfEvent::Close => self.close(page),
            ZfEvent::Toggle => self.toggle(page),
            _ => {}
        }
    }

    fn handle_key(&mut self, page: &mut Page, event: &KeyEvent) -> bool {
        let mut handlers = KeyHandlers::new().on("close", || ()).on("toggle", || ());
        let dispatch = page
            .keyboard
            .handle_key(event, Self::CLASS, page.dom.is_rtl(), &mut handlers);
        match dispatch {
            KeyDispatch::Command(command) if command == "close" => {
                if self.options.bool("closeOnEsc").unwrap_or(true) {
                    self.close(page);
                }
                true
            }
            KeyDispatch::Command(_) => {
                self.toggle(page);
                true
            }
            KeyDispatch::Unhandled | KeyDispatch::UnknownComponent => false,
        }
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.options = PluginOptions::new();
        self.seen.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
