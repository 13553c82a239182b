//! Fixed-point math primitives
//!
//! Scalars, points and rectangles shared by the whole simulation.

pub mod fixed;
pub mod rect;

pub use fixed::{Fixed, FixedPoint, FRAC_BITS};
pub use rect::Rectangle;
