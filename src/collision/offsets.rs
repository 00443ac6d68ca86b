//! Anchored placement: where a floating element goes relative to its anchor.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::dimensions::{get_dimensions, Dimensions};
use crate::dom::{Dom, NodeId};
use crate::error::{FoundationError, Result};
use crate::geometry::{Offset, Viewport};

/// Named placement of a floating element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    Top,
    Left,
    Right,
    CenterTop,
    CenterBottom,
    CenterLeft,
    CenterRight,
    /// Centered in the window.
    Center,
    /// Horizontally centered, near the top of the window (modals).
    Reveal,
    /// Covering the window.
    RevealFull,
    LeftBottom,
    RightBottom,
    /// Below the anchor, aligned to its start edge.
    #[default]
    Bottom,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Left => "left",
            Position::Right => "right",
            Position::CenterTop => "center top",
            Position::CenterBottom => "center bottom",
            Position::CenterLeft => "center left",
            Position::CenterRight => "center right",
            Position::Center => "center",
            Position::Reveal => "reveal",
            Position::RevealFull => "reveal full",
            Position::LeftBottom => "left bottom",
            Position::RightBottom => "right bottom",
            Position::Bottom => "bottom",
        }
    }

    /// Whether the placement is computed from an anchor's box.
    pub fn needs_anchor(self) -> bool {
        !matches!(self, Position::Center | Position::Reveal | Position::RevealFull)
    }
}

/// Unknown names fall through to [`Position::Bottom`].
impl FromStr for Position {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(match normalized.as_str() {
            "top" => Position::Top,
            "left" => Position::Left,
            "right" => Position::Right,
            "center top" => Position::CenterTop,
            "center bottom" => Position::CenterBottom,
            "center left" => Position::CenterLeft,
            "center right" => Position::CenterRight,
            "center" => Position::Center,
            "reveal" => Position::Reveal,
            "reveal full" => Position::RevealFull,
            "left bottom" => Position::LeftBottom,
            "right bottom" => Position::RightBottom,
            _ => Position::Bottom,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page coordinates placing `element` at `position` around `anchor`.
///
/// `v_offset`/`h_offset` are the gaps kept from the anchor. `is_overflow`
/// pins a `center bottom` element to `h_offset` (the full-width fallback).
/// In a right-to-left document `top` and `bottom` align to the anchor's
/// right edge instead of its left.
#[allow(clippy::too_many_arguments)]
pub fn compute_anchored_offset(
    dom: &Dom,
    viewport: &Viewport,
    element: NodeId,
    anchor: Option<NodeId>,
    position: Position,
    v_offset: f64,
    h_offset: f64,
    is_overflow: bool,
) -> Result<Offset> {
    let ele = get_dimensions(dom, viewport, element)?;
    let win = ele.window_dims;
    let anchor_dims = || -> Result<Dimensions> {
        let id = anchor.ok_or_else(|| FoundationError::MissingAnchor {
            position: position.to_string(),
        })?;
        get_dimensions(dom, viewport, id)
    };
    let rtl = dom.is_rtl();

    let offset = match position {
        Position::Top => {
            let a = anchor_dims()?;
            Offset {
                left: if rtl {
                    a.offset.left - ele.width + a.width
                } else {
                    a.offset.left
                },
                top: a.offset.top - (ele.height + v_offset),
            }
        }
        Position::Left => {
            let a = anchor_dims()?;
            Offset {
                left: a.offset.left - (ele.width + h_offset),
                top: a.offset.top,
            }
        }
        Position::Right => {
            let a = anchor_dims()?;
            Offset {
                left: a.offset.left + a.width + h_offset,
                top: a.offset.top,
            }
        }
        Position::CenterTop => {
            let a = anchor_dims()?;
            Offset {
                left: (a.offset.left + a.width / 2.0) - ele.width / 2.0,
                top: a.offset.top - (ele.height + v_offset),
            }
        }
        Position::CenterBottom => {
            let a = anchor_dims()?;
            Offset {
                left: if is_overflow {
                    h_offset
                } else {
                    (a.offset.left + a.width / 2.0) - ele.width / 2.0
                },
                top: a.offset.top + a.height + v_offset,
            }
        }
        Position::CenterLeft => {
            let a = anchor_dims()?;
            Offset {
                left: a.offset.left - (ele.width + h_offset),
                top: (a.offset.top + a.height / 2.0) - ele.height / 2.0,
            }
        }
        Position::CenterRight => {
            let a = anchor_dims()?;
            Offset {
                left: a.offset.left + a.width + h_offset + 1.0,
                top: (a.offset.top + a.height / 2.0) - ele.height / 2.0,
            }
        }
        Position::Center => Offset {
            left: (win.offset.left + win.width / 2.0) - ele.width / 2.0,
            top: (win.offset.top + win.height / 2.0) - ele.height / 2.0,
        },
        Position::Reveal => Offset {
            left: (win.width - ele.width) / 2.0,
            top: win.offset.top + v_offset,
        },
        Position::RevealFull => win.offset,
        Position::LeftBottom => {
            let a = anchor_dims()?;
            Offset {
                left: a.offset.left,
                top: a.offset.top + a.height + v_offset,
            }
        }
        Position::RightBottom => {
            let a = anchor_dims()?;
            Offset {
                left: a.offset.left + a.width + h_offset - ele.width,
                top: a.offset.top + a.height + v_offset,
            }
        }
        Position::Bottom => {
            let a = anchor_dims()?;
            Offset {
                left: if rtl {
                    a.offset.left - ele.width + a.width
                } else {
                    a.offset.left + h_offset
                },
                top: a.offset.top + a.height + v_offset,
            }
        }
    };
    Ok(offset)
}
