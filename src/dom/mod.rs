//! Document model: slotmap-backed element tree with attribute/class/id queries,
//! measured boxes, focus, and plugin back-references.

pub mod node;
pub mod query;
pub mod tree;

pub use node::{ElementData, NodeId};
pub use tree::Dom;
