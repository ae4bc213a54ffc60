//! Fixed-point math utilities for deterministic simulation.
//!
//! Positions, velocities and damage multipliers all use fixed-point
//! arithmetic so that two runs fed the same intents and timestamps land on
//! bit-identical state. Floating-point operations can produce different
//! results on different CPUs.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Convert an integer percentage (e.g. `125`) into a fixed-point factor (`1.25`).
#[must_use]
pub fn percent(value: u32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Convert a millisecond duration into fixed-point seconds.
#[must_use]
pub fn millis_to_secs(ms: u64) -> Fixed {
    Fixed::from_num(ms) / Fixed::from_num(1000)
}

/// Linear interpolation between two scalars.
#[must_use]
pub fn lerp(from: Fixed, to: Fixed, t: Fixed) -> Fixed {
    from + (to - from) * t
}

/// Fixed-point 2D vector.
///
/// The y axis points down: negative y velocity moves a combatant upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vec2Fixed {
    /// X coordinate.
    pub x: Fixed,
    /// Y coordinate.
    pub y: Fixed,
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Build a vector from integer components.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Convert to a float pair for display and reporting only.
    #[must_use]
    pub fn to_f32(self) -> (f32, f32) {
        (self.x.to_num::<f32>(), self.y.to_num::<f32>())
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Axis-aligned rectangle described by its center and half extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Aabb {
    /// Center of the rectangle.
    pub center: Vec2Fixed,
    /// Half of the width and height.
    pub half_extents: Vec2Fixed,
}

impl Aabb {
    /// Create a rectangle from a center point and full width/height.
    #[must_use]
    pub fn from_center(center: Vec2Fixed, width: Fixed, height: Fixed) -> Self {
        let two = Fixed::from_num(2);
        Self {
            center,
            half_extents: Vec2Fixed::new(width / two, height / two),
        }
    }

    /// Left edge.
    #[must_use]
    pub fn min_x(&self) -> Fixed {
        self.center.x - self.half_extents.x
    }

    /// Right edge.
    #[must_use]
    pub fn max_x(&self) -> Fixed {
        self.center.x + self.half_extents.x
    }

    /// Top edge.
    #[must_use]
    pub fn min_y(&self) -> Fixed {
        self.center.y - self.half_extents.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn max_y(&self) -> Fixed {
        self.center.y + self.half_extents.y
    }

    /// Strict overlap test. Rectangles that only touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }

    /// Horizontal penetration depth, zero when the rectangles do not overlap.
    #[must_use]
    pub fn horizontal_overlap(&self, other: &Self) -> Fixed {
        if !self.overlaps(other) {
            return Fixed::ZERO;
        }
        self.max_x().min(other.max_x()) - self.min_x().max(other.min_x())
    }
}
