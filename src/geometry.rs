//! Core geometry types: Offset, Size, Rect, Viewport.
//!
//! All values are CSS pixels in page coordinates (scroll already applied), the
//! same space `getBoundingClientRect() + pageOffset` produces in a browser.

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A position or displacement, `{ top, left }` in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Offset {
    pub left: f64,
    pub top: f64,
}

impl Offset {
    /// The origin.
    pub const ZERO: Offset = Offset { left: 0.0, top: 0.0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset { left: self.left + rhs.left, top: self.top + rhs.top }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset { left: self.left - rhs.left, top: self.top - rhs.top }
    }
}

impl Neg for Offset {
    type Output = Offset;
    #[inline]
    fn neg(self) -> Offset {
        Offset { left: -self.left, top: -self.top }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A width/height pair in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Total area.
    #[inline]
    pub fn area(self) -> f64 {
        self.width * self.height
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An element's border box: top-left corner plus size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// An empty rect at the origin.
    pub const EMPTY: Rect = Rect { left: 0.0, top: 0.0, width: 0.0, height: 0.0 };

    /// Create a new rect.
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// The right edge: `left + width`.
    #[inline]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    /// The bottom edge: `top + height`.
    #[inline]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    /// The top-left corner.
    #[inline]
    pub const fn offset(self) -> Offset {
        Offset { left: self.left, top: self.top }
    }

    /// The dimensions.
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether `other` lies entirely within this rect (edges inclusive).
    #[inline]
    pub fn contains_rect(self, other: Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the two rects share a non-empty area.
    #[inline]
    pub fn overlaps(self, other: Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// The overlapping rect, or [`Rect::EMPTY`] when disjoint.
    pub fn intersection(self, other: Rect) -> Rect {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let width = self.right().min(other.right()) - left;
        let height = self.bottom().min(other.bottom()) - top;
        if width <= 0.0 || height <= 0.0 {
            Rect::EMPTY
        } else {
            Rect { left, top, width, height }
        }
    }

    /// Same size, moved so the top-left corner sits at `offset`.
    #[inline]
    pub const fn at(self, offset: Offset) -> Rect {
        Rect { left: offset.left, top: offset.top, width: self.width, height: self.height }
    }

    /// Translate by an offset.
    #[inline]
    pub fn translate(self, by: Offset) -> Rect {
        self.at(self.offset() + by)
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The browser window: visible size plus the document scroll position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// `pageXOffset`.
    pub scroll_left: f64,
    /// `pageYOffset`.
    pub scroll_top: f64,
}

impl Viewport {
    /// A viewport of the given size, scrolled to the origin.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height, scroll_left: 0.0, scroll_top: 0.0 }
    }

    /// The scroll position as an offset.
    #[inline]
    pub const fn scroll(self) -> Offset {
        Offset { left: self.scroll_left, top: self.scroll_top }
    }

    /// The visible area in page coordinates.
    #[inline]
    pub const fn visible_rect(self) -> Rect {
        Rect {
            left: self.scroll_left,
            top: self.scroll_top,
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
