//! Crate-wide error type.
//!
//! Configuration mistakes (unknown breakpoint, unknown key component) never
//! surface here; they are logged and degrade to a safe default. The variants
//! below are integration bugs that callers should see.

use crate::dom::NodeId;

/// Errors raised by the coordination layer.
#[derive(Debug, thiserror::Error)]
pub enum FoundationError {
    /// Distance-from-viewport is meaningless for the viewport itself.
    #[error("the viewport cannot be measured relative to itself")]
    ViewportMeasurement,

    /// An anchored position was requested without an anchor element.
    #[error("position `{position}` requires an anchor element")]
    MissingAnchor { position: String },

    /// The node does not exist in the document (stale id).
    #[error("node {0:?} is not part of the document")]
    NodeNotFound(NodeId),

    /// A plugin method call could not be resolved.
    #[error("'{method}' is not an available method for {target}")]
    MethodNotFound { method: String, target: String },

    /// The plugin entry point was called with something other than a method name.
    #[error("{type_name} is not a valid parameter; use a string naming the method to invoke")]
    InvalidCall { type_name: String },

    /// The element already carries a different plugin instance.
    #[error("element already has a `{existing}` plugin instance")]
    AlreadyInitialized { existing: String },

    /// The element carries no plugin instance to tear down.
    #[error("node {0:?} has no plugin instance")]
    NotInitialized(NodeId),

    /// No constructor is defined under this name.
    #[error("no plugin is defined under `{0}`")]
    UnknownPlugin(String),

    /// A plugin constructor rejected its element or options.
    #[error("failed to construct `{plugin}`: {message}")]
    Construct { plugin: String, message: String },

    /// A breakpoint media query could not be parsed.
    #[error("invalid media query `{query}`: {message}")]
    MediaQuery { query: String, message: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = FoundationError> = std::result::Result<T, E>;
