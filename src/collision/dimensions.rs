//! Live geometry snapshots and edge collision checks.

use crate::dom::{Dom, NodeId};
use crate::error::{FoundationError, Result};
use crate::geometry::{Offset, Viewport};

/// What to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Element(NodeId),
    /// The scrolling viewport itself; measuring it is an error.
    Viewport,
}

impl From<NodeId> for Measure {
    fn from(id: NodeId) -> Self {
        Measure::Element(id)
    }
}

/// Width, height and page offset of one box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub offset: Offset,
}

/// An element's box together with its parent's and the window's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub offset: Offset,
    /// `None` for the document root.
    pub parent_dims: Option<Geometry>,
    /// Window size, offset by the scroll position.
    pub window_dims: Geometry,
}

fn geometry_of(dom: &Dom, id: NodeId) -> Result<Geometry> {
    let rect = dom.rect(id).ok_or(FoundationError::NodeNotFound(id))?;
    Ok(Geometry {
        width: rect.width,
        height: rect.height,
        offset: rect.offset(),
    })
}

/// Measure an element. Nothing is cached: every call reads the document.
pub fn get_dimensions(dom: &Dom, viewport: &Viewport, target: impl Into<Measure>) -> Result<Dimensions> {
    let id = match target.into() {
        Measure::Element(id) => id,
        Measure::Viewport => return Err(FoundationError::ViewportMeasurement),
    };
    let own = geometry_of(dom, id)?;
    let parent_dims = dom.parent(id).map(|p| geometry_of(dom, p)).transpose()?;
    Ok(Dimensions {
        width: own.width,
        height: own.height,
        offset: own.offset,
        parent_dims,
        window_dims: Geometry {
            width: viewport.width,
            height: viewport.height,
            offset: viewport.scroll(),
        },
    })
}

/// Room left on each side of the element; negative values overflow.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slack {
    top: f64,
    bottom: f64,
    left: f64,
    right: f64,
}

fn slack(dom: &Dom, viewport: &Viewport, element: NodeId, container: Option<NodeId>) -> Result<Slack> {
    let ele = get_dimensions(dom, viewport, element)?;
    let slack = match container {
        Some(container) => {
            let par = get_dimensions(dom, viewport, container)?;
            Slack {
                bottom: (par.height + par.offset.top) - (ele.offset.top + ele.height),
                top: ele.offset.top - par.offset.top,
                left: ele.offset.left - par.offset.left,
                right: (par.width + par.offset.left) - (ele.offset.left + ele.width),
            }
        }
        None => {
            let win = ele.window_dims;
            Slack {
                bottom: (win.height + win.offset.top) - (ele.offset.top + ele.height),
                top: ele.offset.top - win.offset.top,
                left: ele.offset.left - win.offset.left,
                // Compared against the window width alone, horizontal scroll ignored.
                right: win.width - (ele.offset.left + ele.width),
            }
        }
    };
    Ok(slack)
}

/// Whether `element` sits inside `container` (or the window) on the checked edges.
///
/// `lr_only` checks left and right, `tb_only` top and bottom, otherwise all
/// four edges must fit.
pub fn fits_without_collision(
    dom: &Dom,
    viewport: &Viewport,
    element: NodeId,
    container: Option<NodeId>,
    lr_only: bool,
    tb_only: bool,
) -> Result<bool> {
    let s = slack(dom, viewport, element, container)?;
    let (top, bottom, left, right) = (s.top >= 0.0, s.bottom >= 0.0, s.left >= 0.0, s.right >= 0.0);
    Ok(if lr_only {
        left && right
    } else if tb_only {
        top && bottom
    } else {
        top && bottom && left && right
    })
}

/// How far `element` pokes out of `container` (or the window).
///
/// Zero when it fits. With `lr_only`/`tb_only` the (non-positive) overflow
/// sum on that axis is returned; otherwise the Euclidean length of the four
/// overflows. `ignore_bottom` discards overflow past the bottom edge.
pub fn overlap_area(
    dom: &Dom,
    viewport: &Viewport,
    element: NodeId,
    container: Option<NodeId>,
    lr_only: bool,
    tb_only: bool,
    ignore_bottom: bool,
) -> Result<f64> {
    let s = slack(dom, viewport, element, container)?;
    let bottom = if ignore_bottom { 0.0 } else { s.bottom.min(0.0) };
    let (top, left, right) = (s.top.min(0.0), s.left.min(0.0), s.right.min(0.0));
    Ok(if lr_only {
        left + right
    } else if tb_only {
        top + bottom
    } else {
        (top * top + bottom * bottom + left * left + right * right).sqrt()
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::ElementData;
    use crate::geometry::Rect;

    fn doc(child: Rect) -> (Dom, NodeId, NodeId) {
        let (mut dom, body) = Dom::with_body();
        let container = dom.insert_child(
            body,
            ElementData::new("div").with_rect(Rect::new(0.0, 0.0, 200.0, 200.0)),
        );
        let element = dom.insert_child(container, ElementData::new("div").with_rect(child));
        (dom, container, element)
    }

    // ── get_dimensions ───────────────────────────────────────────────

    #[test]
    fn viewport_cannot_be_measured() {
        let (dom, ..) = doc(Rect::EMPTY);
        let err = get_dimensions(&dom, &Viewport::default(), Measure::Viewport).unwrap_err();
        assert!(matches!(err, FoundationError::ViewportMeasurement));
    }

    #[test]
    fn dimensions_include_parent_and_window() {
        let (dom, _, element) = doc(Rect::new(10.0, 20.0, 30.0, 40.0));
        let mut vp = Viewport::new(800.0, 600.0);
        vp.scroll_top = 100.0;
        let dims = get_dimensions(&dom, &vp, element).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 30.0,
                height: 40.0,
                offset: Offset::new(10.0, 20.0),
                parent_dims: Some(Geometry {
                    width: 200.0,
                    height: 200.0,
                    offset: Offset::ZERO,
                }),
                window_dims: Geometry {
                    width: 800.0,
                    height: 600.0,
                    offset: Offset::new(0.0, 100.0),
                },
            }
        );
    }

    #[test]
    fn stale_node_is_an_error() {
        let (mut dom, _, element) = doc(Rect::EMPTY);
        dom.remove(element);
        let err = get_dimensions(&dom, &Viewport::default(), element).unwrap_err();
        assert!(matches!(err, FoundationError::NodeNotFound(_)));
    }

    // ── fits_without_collision ───────────────────────────────────────

    #[test]
    fn inside_on_all_edges_fits() {
        let (dom, container, element) = doc(Rect::new(10.0, 10.0, 50.0, 50.0));
        let vp = Viewport::default();
        assert!(fits_without_collision(&dom, &vp, element, Some(container), false, false).unwrap());
        assert_eq!(overlap_area(&dom, &vp, element, Some(container), false, false, false).unwrap(), 0.0);
    }

    #[test]
    fn right_overflow_fails_both_checks() {
        let (dom, container, element) = doc(Rect::new(160.0, 10.0, 50.0, 50.0));
        let vp = Viewport::default();
        assert!(!fits_without_collision(&dom, &vp, element, Some(container), false, false).unwrap());
        assert!(!fits_without_collision(&dom, &vp, element, Some(container), true, false).unwrap());
        assert!(fits_without_collision(&dom, &vp, element, Some(container), false, true).unwrap());
        assert_eq!(
            overlap_area(&dom, &vp, element, Some(container), true, false, false).unwrap(),
            -10.0
        );
    }

    #[test]
    fn window_fallback_respects_scroll() {
        let (dom, _, element) = doc(Rect::new(10.0, 50.0, 50.0, 50.0));
        let mut vp = Viewport::new(400.0, 300.0);
        assert!(fits_without_collision(&dom, &vp, element, None, false, false).unwrap());
        vp.scroll_top = 60.0;
        assert!(!fits_without_collision(&dom, &vp, element, None, false, false).unwrap());
        assert!(fits_without_collision(&dom, &vp, element, None, true, false).unwrap());
    }

    #[test]
    fn overlap_distance_combines_edges() {
        let (dom, container, element) = doc(Rect::new(-3.0, 196.0, 50.0, 8.0));
        let vp = Viewport::default();
        // left overflows by 3, bottom by 4.
        assert_eq!(overlap_area(&dom, &vp, element, Some(container), false, false, false).unwrap(), 5.0);
        assert_eq!(overlap_area(&dom, &vp, element, Some(container), false, false, true).unwrap(), 3.0);
        assert_eq!(overlap_area(&dom, &vp, element, Some(container), false, true, false).unwrap(), -4.0);
    }
}
