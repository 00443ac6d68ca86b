//! Breakpoint tracking.
//!
//! [`MediaQueryService`] reads the breakpoint table the stylesheet publishes
//! through `font-family` on the `.foundation-mq` marker element, turns every
//! entry into an `only screen and (min-width: ...)` query, and reports the
//! widest matching breakpoint as current.

use tracing::{debug, warn};

use super::query::MediaQueryList;
use crate::event::message::ZfEvent;
use crate::geometry::Viewport;

/// Decode the `name=value&...` breakpoint encoding.
///
/// Surrounding quotes (added by browsers when reading the style back) are
/// stripped, `+` decodes as a space and `%xx` escapes are decoded. Order is
/// preserved and the first value wins when a name repeats.
pub fn parse_style_to_object(style: &str) -> Vec<(String, String)> {
    let trimmed = style.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|&q| trimmed.strip_prefix(q).and_then(|s| s.strip_suffix(q)))
        .unwrap_or(trimmed);

    let mut pairs: Vec<(String, String)> = Vec::new();
    for (name, value) in url::form_urlencoded::parse(unquoted.as_bytes()) {
        if pairs.iter().any(|(existing, _)| *existing == name) {
            continue;
        }
        pairs.push((name.into_owned(), value.into_owned()));
    }
    pairs
}

// ---------------------------------------------------------------------------
// Breakpoint
// ---------------------------------------------------------------------------

/// One named breakpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    pub name: String,
    /// The raw value from the stylesheet, e.g. `40em`.
    pub value: String,
    /// The media query built from `value`.
    pub query: String,
    parsed: MediaQueryList,
}

impl Breakpoint {
    /// Whether the breakpoint's query matches the window.
    pub fn matches(&self, viewport: &Viewport) -> bool {
        self.parsed.matches(viewport)
    }
}

/// Payload of `changed.zf.mediaquery`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointChange {
    pub current: Option<String>,
    pub previous: Option<String>,
}

impl From<BreakpointChange> for ZfEvent {
    fn from(change: BreakpointChange) -> Self {
        ZfEvent::MediaQueryChanged {
            current: change.current,
            previous: change.previous,
        }
    }
}

// ---------------------------------------------------------------------------
// MediaQueryService
// ---------------------------------------------------------------------------

/// The ordered breakpoint table plus the last computed current breakpoint.
#[derive(Debug, Default)]
pub struct MediaQueryService {
    queries: Vec<Breakpoint>,
    current: Option<String>,
    watching: bool,
}

impl MediaQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)build the breakpoint table from `style` and start watching resizes.
    ///
    /// Entries with an empty or unparsable value are skipped with a warning.
    /// Calling this again replaces the table; the resize watch stays a single
    /// binding.
    pub fn init(&mut self, style: &str, viewport: &Viewport) {
        self.queries.clear();
        for (name, value) in parse_style_to_object(style) {
            if value.is_empty() {
                warn!(breakpoint = %name, "breakpoint has no value; skipping");
                continue;
            }
            let query = format!("only screen and (min-width: {value})");
            match query.parse::<MediaQueryList>() {
                Ok(parsed) => self.queries.push(Breakpoint {
                    name,
                    value,
                    query,
                    parsed,
                }),
                Err(err) => warn!(breakpoint = %name, error = %err, "skipping breakpoint"),
            }
        }

        self.current = self.current_size(viewport).map(str::to_owned);
        if self.watching {
            debug!("resize watch rebound");
        }
        self.watching = true;
        debug!(
            breakpoints = self.queries.len(),
            current = ?self.current,
            "media query service initialized"
        );
    }

    /// Whether `init` has bound the resize watch.
    pub fn is_watching(&self) -> bool {
        self.watching
    }

    /// The breakpoints in declared (narrow to wide) order.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.queries
    }

    fn find(&self, name: &str) -> Option<&Breakpoint> {
        self.queries.iter().find(|bp| bp.name == name)
    }

    /// Whether the window is at least as wide as breakpoint `name`.
    ///
    /// Unknown names log a warning and return `false`.
    pub fn at_least(&self, name: &str, viewport: &Viewport) -> bool {
        match self.find(name) {
            Some(bp) => bp.matches(viewport),
            None => {
                warn!(breakpoint = name, "unknown breakpoint");
                false
            }
        }
    }

    /// Whether the window is narrower than the breakpoint after `name`.
    pub fn up_to(&self, name: &str, viewport: &Viewport) -> bool {
        match self.next(name) {
            Some(next) => !self.at_least(next, viewport),
            None => true,
        }
    }

    /// Evaluate a size spec: `"medium"`, `"medium only"`, `"medium up"` or
    /// `"medium down"`.
    pub fn is(&self, spec: &str, viewport: &Viewport) -> bool {
        let mut parts = spec.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match parts.next() {
            Some("only") => self.current_size(viewport) == Some(name),
            Some("down") => self.up_to(name, viewport),
            _ => self.at_least(name, viewport),
        }
    }

    /// The media query for breakpoint `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).map(|bp| bp.query.as_str())
    }

    /// The name of the breakpoint declared after `name`.
    pub fn next(&self, name: &str) -> Option<&str> {
        let index = self.queries.iter().position(|bp| bp.name == name)?;
        self.queries.get(index + 1).map(|bp| bp.name.as_str())
    }

    /// The widest breakpoint whose query matches: the last match in
    /// declared order, not the first.
    pub fn current_size(&self, viewport: &Viewport) -> Option<&str> {
        self.queries
            .iter()
            .rev()
            .find(|bp| bp.matches(viewport))
            .map(|bp| bp.name.as_str())
    }

    /// The breakpoint stored by the last `init` or change.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Recompute after a window resize.
    ///
    /// Returns the change payload only when the current breakpoint actually
    /// changed. Nothing is debounced here.
    pub fn on_resize(&mut self, viewport: &Viewport) -> Option<BreakpointChange> {
        if !self.watching {
            return None;
        }
        let new_size = self.current_size(viewport).map(str::to_owned);
        if new_size == self.current {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, new_size.clone());
        debug!(current = ?new_size, previous = ?previous, "breakpoint changed");
        Some(BreakpointChange {
            current: new_size,
            previous,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
