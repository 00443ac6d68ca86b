//! Plugin lifecycle: the plugin trait, option parsing and the registry.

pub mod options;
pub mod registry;
pub mod traits;

pub use options::{camel_case, OptionValue, PluginOptions};
pub use registry::{
    hyphenate, InstanceRecord, PluginCall, PluginDef, PluginRegistry, ScanReport, Unregistered,
    DEFAULT_UID_LENGTH,
};
pub use traits::{constructor, into_handle, Constructor, Plugin, PluginHandle};
