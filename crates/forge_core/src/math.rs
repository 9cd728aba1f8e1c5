//! Deterministic math utilities.
//!
//! Unit positions and sight radii use fixed-point arithmetic so visibility
//! is identical on every peer. Stat arithmetic is plain integer math; the
//! helpers here pin down its rounding.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for positions and radii.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector at the center of a map tile.
    #[must_use]
    pub fn tile_center(x: i32, y: i32) -> Self {
        let half = Fixed::from_num(1) / Fixed::from_num(2);
        Self::new(Fixed::from_num(x) + half, Fixed::from_num(y) + half)
    }

    /// Map tile containing this point.
    #[must_use]
    pub fn tile(self) -> (i32, i32) {
        (self.x.floor().to_num(), self.y.floor().to_num())
    }

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// `value * numerator / denominator` in 64-bit, truncating toward zero and
/// saturating back into `i32`.
#[must_use]
pub fn scale_ratio(value: i32, numerator: i32, denominator: i32) -> i32 {
    debug_assert!(denominator != 0, "scale_ratio denominator must be nonzero");
    let scaled = i64::from(value) * i64::from(numerator) / i64::from(denominator);
    i32::try_from(scaled).unwrap_or(if scaled < 0 { i32::MIN } else { i32::MAX })
}

/// Grow `value` by `percent` percent: `value + value * percent / 100`.
#[must_use]
pub fn percent_apply(value: i32, percent: i32) -> i32 {
    value.saturating_add(scale_ratio(value, percent, 100))
}

/// Inverse of [`percent_apply`]: `value * 100 / (100 + percent)`.
///
/// Exact only when the applied value was divisible; otherwise the result
/// can drift by one from the original.
#[must_use]
pub fn percent_reverse(value: i32, percent: i32) -> i32 {
    scale_ratio(value, 100, 100 + percent)
}
