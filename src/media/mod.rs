//! Breakpoint tracking: media query tokenizer, parser, and the service that
//! reports the current breakpoint.

pub mod query;
pub mod service;
pub mod tokenizer;

pub use query::{MediaQuery, MediaQueryList};
pub use service::{parse_style_to_object, Breakpoint, BreakpointChange, MediaQueryService};
