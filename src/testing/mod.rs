//! Headless testing framework: Pilot, snapshot helpers, a sample plugin.
//!
//! Use the [`Pilot`] to drive a [`Page`](crate::page::Page) with a simulated
//! frame clock. Use [`dom_outline`] to capture the document as plain text
//! for snapshot-style assertions.

pub mod fixtures;
pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{dom_outline, outline_from};
