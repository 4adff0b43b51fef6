//! Pixel-Space 2D Vector
//!
//! Positions and sizes on the puzzle board, in board pixels with the
//! origin at the top-left corner and y growing downwards.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

/// 2D vector in board pixels.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component (pixels from the left edge)
    pub x: f32,
    /// Y component (pixels from the top edge)
    pub y: f32,
}

impl Vec2 {
    /// Zero vector (board origin)
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Per-axis absolute difference to another point.
    #[inline]
    pub fn abs_diff(self, other: Self) -> Self {
        Self {
            x: (self.x - other.x).abs(),
            y: (self.y - other.y).abs(),
        }
    }

    /// True when both components lie within `tolerance` of `other`.
    ///
    /// This is a box test, not a radius: each axis is checked on its own.
    #[inline]
    pub fn within(self, other: Self, tolerance: f32) -> bool {
        let diff = self.abs_diff(other);
        diff.x <= tolerance && diff.y <= tolerance
    }

    /// Both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({:.2}, {:.2})", self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================
