//! Axis-aligned rectangles in fixed-point space
//!
//! Used for hitboxes and collision probes. Edges are half-open: a rectangle
//! covers `x..x+width` and `y..y+height`, so two rectangles that only share an
//! edge do not intersect.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::fixed::{Fixed, FixedPoint};

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: Fixed,
    pub y: Fixed,
    pub width: Fixed,
    pub height: Fixed,
}

impl Rectangle {
    pub const EMPTY: Rectangle = Rectangle::new(Fixed::ZERO, Fixed::ZERO, Fixed::ZERO, Fixed::ZERO);

    pub const fn new(x: Fixed, y: Fixed, width: Fixed, height: Fixed) -> Self {
        Self { x, y, width, height }
    }

    /// Create from whole-pixel position and size
    pub const fn from_pixels(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(
            Fixed::from_pixels(x),
            Fixed::from_pixels(y),
            Fixed::from_pixels(width),
            Fixed::from_pixels(height),
        )
    }

    pub const fn from_parts(location: FixedPoint, size: FixedPoint) -> Self {
        Self::new(location.x, location.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> Fixed {
        self.x
    }

    #[inline]
    pub fn right(&self) -> Fixed {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> Fixed {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> Fixed {
        self.y + self.height
    }

    #[inline]
    pub fn location(&self) -> FixedPoint {
        FixedPoint::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> FixedPoint {
        FixedPoint::new(self.width, self.height)
    }

    /// Center point (rounds toward the top-left)
    #[inline]
    pub fn center(&self) -> FixedPoint {
        FixedPoint::new(self.x + (self.width >> 1), self.y + (self.height >> 1))
    }

    pub fn is_empty(&self) -> bool {
        self.width.0 <= 0 || self.height.0 <= 0
    }

    /// Half-open overlap test
    #[inline]
    pub fn intersects(&self, other: &Rectangle) -> bool {
        other.left() < self.right()
            && self.left() < other.right()
            && other.top() < self.bottom()
            && self.top() < other.bottom()
    }

    /// Check if point is inside
    #[inline]
    pub fn contains(&self, p: FixedPoint) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Check if `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        self.x <= other.x
            && other.right() <= self.right()
            && self.y <= other.y
            && other.bottom() <= self.bottom()
    }

    /// Copy displaced by `(dx, dy)`
    #[inline]
    pub fn shift(&self, dx: Fixed, dy: Fixed) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    #[inline]
    pub fn offset(&self, by: FixedPoint) -> Self {
        self.shift(by.x, by.y)
    }

    /// Grow by `dx` on the left and right, `dy` on the top and bottom
    pub fn inflate(&self, dx: Fixed, dy: Fixed) -> Self {
        Self::new(self.x - dx, self.y - dy, self.width + dx * 2, self.height + dy * 2)
    }

    /// Overlapping region, or `None` when the rectangles are disjoint
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Self::new(x, y, right - x, bottom - y))
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }

    /// Floor position and size to whole pixels: (x, y, w, h)
    pub fn to_pixels(&self) -> (i32, i32, i32, i32) {
        (
            self.x.to_pixels(),
            self.y.to_pixels(),
            self.width.to_pixels(),
            self.height.to_pixels(),
        )
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {} {}x{}]", self.x, self.y, self.width, self.height)
    }
}
