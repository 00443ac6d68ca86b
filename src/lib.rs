//! # foundation-core
//!
//! The coordination layer shared by responsive front-end widgets, as a
//! headless Rust library: breakpoints, keyboard commands, collision-aware
//! positioning, plugin lifecycle, motion, and declarative triggers, all
//! running against an in-process document the host drives.
//!
//! ## Core Systems
//!
//! - **[`dom`]** — Slotmap-backed element tree with attributes, classes, focus and plugin back-references
//! - **[`media`]** — Breakpoint table and media query evaluation (logos tokenizer)
//! - **[`event`]** — Key input, chord commands, focus traps, namespaced events
//! - **[`collision`]** — Measurement, edge checks, anchored offsets, reposition protocol
//! - **[`plugin`]** — Plugin trait, option parsing, registry of definitions and instances
//! - **[`motion`]** — Enter/exit class transitions and frame-driven movement
//! - **[`trigger`]** — `data-open`/`data-close`/`data-toggle` routing and window listeners
//! - **[`page`]** — The application context owning the document and every service
//! - **[`testing`]** — Headless Pilot and outline snapshots
//! - **[`geometry`]** — Offset, Size, Rect, Viewport primitives

// Foundation
pub mod error;
pub mod geometry;

// Core systems
pub mod dom;
pub mod event;
pub mod media;

// Coordination services
pub mod collision;
pub mod motion;
pub mod plugin;
pub mod trigger;

// Application
pub mod page;
pub mod testing;

pub use error::{FoundationError, Result};
pub use page::{Page, PageConfig};
