//! The reposition protocol used by dropdowns and tooltips.
//!
//! The requested side is read from the element's position class (`top`,
//! `left`, `right`; none means bottom). After each placement that still
//! collides with the window, the element flips to the opposite side, then
//! falls back to a secondary side, then clears back to bottom, with a bounded
//! number of attempts.

use tracing::debug;

use super::dimensions::{fits_without_collision, get_dimensions};
use super::offsets::{compute_anchored_offset, Position};
use crate::dom::{Dom, NodeId};
use crate::error::{FoundationError, Result};
use crate::geometry::{Rect, Viewport};

/// Attempts allowed before the protocol gives up.
pub const MAX_ATTEMPTS: u8 = 4;

/// The side a floating element opens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// The class that selects this side; bottom is the unclassed default.
    pub fn class(self) -> Option<&'static str> {
        match self {
            Side::Top => Some("top"),
            Side::Left => Some("left"),
            Side::Right => Some("right"),
            Side::Bottom => None,
        }
    }

    /// Read the side from the first position class on the element.
    pub fn from_element(dom: &Dom, element: NodeId) -> Side {
        dom.get(element)
            .and_then(|data| {
                data.classes.iter().find_map(|c| match c.as_str() {
                    "top" => Some(Side::Top),
                    "left" => Some(Side::Left),
                    "right" => Some(Side::Right),
                    "bottom" => Some(Side::Bottom),
                    _ => None,
                })
            })
            .unwrap_or(Side::Bottom)
    }

    pub fn position(self) -> Position {
        match self {
            Side::Top => Position::Top,
            Side::Bottom => Position::Bottom,
            Side::Left => Position::Left,
            Side::Right => Position::Right,
        }
    }
}

/// How a `place` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The element fits on this side.
    Fits(Side),
    /// Attempts ran out; the element stays at its last attempted side.
    Exhausted(Side),
    /// The element is at least as wide as the window and was stretched
    /// across it below the anchor.
    FullWidth,
}

/// Per-element reposition state. Call [`Repositioner::reset`] when the
/// element closes so the next open starts fresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Repositioner {
    used: Vec<Side>,
    counter: u8,
    class_changed: bool,
    pub v_offset: f64,
    pub h_offset: f64,
}

impl Default for Repositioner {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Repositioner {
    pub fn new(v_offset: f64, h_offset: f64) -> Self {
        Self {
            used: Vec::new(),
            counter: MAX_ATTEMPTS,
            class_changed: false,
            v_offset,
            h_offset,
        }
    }

    /// Sides tried so far, in order.
    pub fn used_positions(&self) -> &[Side] {
        &self.used
    }

    /// Remaining attempts.
    pub fn attempts_left(&self) -> u8 {
        self.counter
    }

    /// Whether placement modified the element's classes or width.
    pub fn class_changed(&self) -> bool {
        self.class_changed
    }

    /// Re-arm for the next open.
    pub fn reset(&mut self) {
        self.used.clear();
        self.counter = MAX_ATTEMPTS;
        self.class_changed = false;
    }

    /// Position `element` next to `anchor`, flipping sides while it collides
    /// with the window.
    pub fn place(
        &mut self,
        dom: &mut Dom,
        viewport: &Viewport,
        element: NodeId,
        anchor: NodeId,
    ) -> Result<Placement> {
        loop {
            let side = Side::from_element(dom, element);
            let dims = get_dimensions(dom, viewport, element)?;

            if dims.width >= dims.window_dims.width {
                self.stretch(dom, viewport, element, anchor)?;
                return Ok(Placement::FullWidth);
            }

            let offset = compute_anchored_offset(
                dom,
                viewport,
                element,
                Some(anchor),
                side.position(),
                self.v_offset,
                self.h_offset,
                false,
            )?;
            move_to(dom, element, offset.left, offset.top, dims.width)?;

            if fits_without_collision(dom, viewport, element, None, false, false)? {
                return Ok(Placement::Fits(side));
            }
            if self.counter == 0 {
                debug!(side = ?side, "reposition attempts exhausted");
                return Ok(Placement::Exhausted(side));
            }
            self.reposition(dom, element, side);
        }
    }

    /// Pick the next side to try and rewrite the position classes.
    fn reposition(&mut self, dom: &mut Dom, element: NodeId, side: Side) {
        self.used.push(side);
        let used = |s: Side| self.used.contains(&s);

        let next = match side {
            Side::Bottom if !used(Side::Top) => Side::Top,
            Side::Top if !used(Side::Bottom) => Side::Bottom,
            Side::Left if !used(Side::Right) => Side::Right,
            Side::Right if !used(Side::Left) => Side::Left,
            Side::Bottom | Side::Top if !used(Side::Left) => Side::Left,
            _ => Side::Bottom,
        };

        if let Some(class) = side.class() {
            dom.remove_class(element, class);
        }
        if let Some(class) = next.class() {
            dom.add_class(element, class);
        }
        debug!(from = ?side, to = ?next, attempts_left = self.counter - 1, "repositioning");
        self.class_changed = true;
        self.counter -= 1;
    }

    /// Full-width fallback: `center bottom`, as wide as the window (or the
    /// parent, if narrower) minus the horizontal gaps.
    fn stretch(&mut self, dom: &mut Dom, viewport: &Viewport, element: NodeId, anchor: NodeId) -> Result<()> {
        let dims = get_dimensions(dom, viewport, element)?;
        let mut offset = compute_anchored_offset(
            dom,
            viewport,
            element,
            Some(anchor),
            Position::CenterBottom,
            self.v_offset,
            self.h_offset,
            true,
        )?;
        let mut bound = dims.window_dims.width;
        if let Some(parent) = dims.parent_dims.filter(|p| p.width > 0.0 && p.width < bound) {
            bound = parent.width;
            offset.left += parent.offset.left;
        }
        let width = (bound - self.h_offset * 2.0).max(0.0);
        move_to(dom, element, offset.left, offset.top, width)?;
        self.class_changed = true;
        Ok(())
    }
}

fn move_to(dom: &mut Dom, element: NodeId, left: f64, top: f64, width: f64) -> Result<()> {
    let rect = dom.rect(element).ok_or(FoundationError::NodeNotFound(element))?;
    dom.set_rect(element, Rect::new(left, top, width, rect.height));
    Ok(())
}
