//! Fixed-point coordinates
//!
//! Every position, size and velocity in the simulation uses a signed 32-bit
//! integer with 9 fractional bits, so one pixel is 512 raw units and the
//! smallest representable step is 1/512 of a pixel.
//!
//! Integer-only arithmetic keeps the simulation bit-for-bit reproducible
//! across platforms. Addition and subtraction wrap on overflow.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Shl, Shr, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Number of fractional bits (512 = 1 pixel)
pub const FRAC_BITS: u32 = 9;
const ONE_RAW: i32 = 1 << FRAC_BITS;
const FRAC_MASK: i32 = ONE_RAW - 1;

// =============================================================================
// Scalar
// =============================================================================

/// Fixed-point scalar in 23.9 format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    /// One raw unit, the smallest movement step
    pub const UNIT: Fixed = Fixed(1);
    /// One whole pixel
    pub const ONE: Fixed = Fixed(ONE_RAW);
    pub const MIN: Fixed = Fixed(i32::MIN);
    pub const MAX: Fixed = Fixed(i32::MAX);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Create from whole pixels
    #[inline]
    pub const fn from_pixels(px: i32) -> Self {
        Fixed(px << FRAC_BITS)
    }

    /// Floor to whole pixels (arithmetic shift, rounds toward negative infinity)
    #[inline]
    pub const fn to_pixels(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    /// Sub-pixel part, always in 0..512
    #[inline]
    pub const fn fraction(self) -> i32 {
        self.0 & FRAC_MASK
    }

    #[inline]
    pub fn from_f32(f: f32) -> Self {
        Fixed((f * ONE_RAW as f32) as i32)
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / ONE_RAW as f32
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// -1, 0 or +1 raw unit
    #[inline]
    pub const fn signum(self) -> Self {
        Fixed(self.0.signum())
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Fixed(self.0.wrapping_abs())
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Fixed(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Fixed(self.0.max(other.0))
    }

    #[inline]
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Fixed(self.0.clamp(lo.0, hi.0))
    }

    /// Fixed-point multiplication (23.9 * 23.9 -> 23.9)
    #[inline]
    pub fn mul_fixed(self, other: Self) -> Self {
        let result = (self.0 as i64 * other.0 as i64) >> FRAC_BITS;
        Fixed(result as i32)
    }

    /// Fixed-point division. Returns `None` for a zero divisor.
    #[inline]
    pub fn div_fixed(self, divisor: Self) -> Option<Self> {
        if divisor.0 == 0 {
            return None;
        }
        let result = ((self.0 as i64) << FRAC_BITS) / divisor.0 as i64;
        Some(Fixed(result as i32))
    }

    /// Move toward `target` by at most `step` (step must be non-negative)
    #[inline]
    pub fn approach(self, target: Self, step: Self) -> Self {
        if self < target {
            (self + step).min(target)
        } else {
            (self - step).max(target)
        }
    }
}

impl Add for Fixed {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Fixed(self.0.wrapping_add(other.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Fixed {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Fixed(self.0.wrapping_sub(other.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Fixed {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Fixed(self.0.wrapping_neg())
    }
}

impl Mul<i32> for Fixed {
    type Output = Self;
    #[inline]
    fn mul(self, k: i32) -> Self {
        Fixed(self.0.wrapping_mul(k))
    }
}

impl Div<i32> for Fixed {
    type Output = Self;
    #[inline]
    fn div(self, k: i32) -> Self {
        Fixed(self.0 / k)
    }
}

impl Shl<u32> for Fixed {
    type Output = Self;
    #[inline]
    fn shl(self, bits: u32) -> Self {
        Fixed(self.0 << bits)
    }
}

impl Shr<u32> for Fixed {
    type Output = Self;
    #[inline]
    fn shr(self, bits: u32) -> Self {
        Fixed(self.0 >> bits)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.to_pixels(), self.fraction())
    }
}

// =============================================================================
// Point
// =============================================================================

/// 2D point (or displacement) in fixed-point coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedPoint {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedPoint {
    pub const ZERO: FixedPoint = FixedPoint { x: Fixed::ZERO, y: Fixed::ZERO };

    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn from_raw(x: i32, y: i32) -> Self {
        Self { x: Fixed(x), y: Fixed(y) }
    }

    #[inline]
    pub const fn from_pixels(x: i32, y: i32) -> Self {
        Self {
            x: Fixed::from_pixels(x),
            y: Fixed::from_pixels(y),
        }
    }

    /// Floor both components to whole pixels
    #[inline]
    pub const fn to_pixels(self) -> (i32, i32) {
        (self.x.to_pixels(), self.y.to_pixels())
    }

    #[inline]
    pub fn to_f32(self) -> (f32, f32) {
        (self.x.to_f32(), self.y.to_f32())
    }

    #[inline]
    pub fn clamp(self, lo: FixedPoint, hi: FixedPoint) -> Self {
        Self::new(self.x.clamp(lo.x, hi.x), self.y.clamp(lo.y, hi.y))
    }
}

impl Add for FixedPoint {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for FixedPoint {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for FixedPoint {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for FixedPoint {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for FixedPoint {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<i32> for FixedPoint {
    type Output = Self;
    #[inline]
    fn mul(self, k: i32) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

impl Div<i32> for FixedPoint {
    type Output = Self;
    #[inline]
    fn div(self, k: i32) -> Self {
        Self::new(self.x / k, self.y / k)
    }
}

impl Shl<u32> for FixedPoint {
    type Output = Self;
    #[inline]
    fn shl(self, bits: u32) -> Self {
        Self::new(self.x << bits, self.y << bits)
    }
}

impl Shr<u32> for FixedPoint {
    type Output = Self;
    #[inline]
    fn shr(self, bits: u32) -> Self {
        Self::new(self.x >> bits, self.y >> bits)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
