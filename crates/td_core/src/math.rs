//! Resolution-independent coordinates.
//!
//! Everything the decision core hands to the outside world is expressed as a
//! fraction of the window (or raster) size. Pixel coordinates are derived at
//! the point of use by multiplying with the actual dimensions.

use serde::{Deserialize, Serialize};

/// A position as a fraction of width and height, both in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormPos {
    /// Horizontal fraction.
    pub x: f64,
    /// Vertical fraction.
    pub y: f64,
}

impl NormPos {
    /// Create a normalized position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Normalize a pixel coordinate against a surface of the given size.
    #[must_use]
    pub fn from_pixels(px: f64, py: f64, width: u32, height: u32) -> Self {
        Self {
            x: px / f64::from(width.max(1)),
            y: py / f64::from(height.max(1)),
        }
    }

    /// Scale to pixel coordinates on a surface of the given size.
    #[must_use]
    pub fn to_pixels(self, width: u32, height: u32) -> (f64, f64) {
        (self.x * f64::from(width), self.y * f64::from(height))
    }

    /// Integer pixel on a surface, truncated like a screen lookup.
    #[must_use]
    pub fn to_pixel_index(self, width: u32, height: u32) -> (u32, u32) {
        let (px, py) = self.to_pixels(width, height);
        let x = (px.max(0.0) as u32).min(width.saturating_sub(1));
        let y = (py.max(0.0) as u32).min(height.saturating_sub(1));
        (x, y)
    }

    /// True when both components are within `0..=1`.
    #[must_use]
    pub fn is_normalized(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Component-wise closeness, used to match clicks against known buttons.
    #[must_use]
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl From<(f64, f64)> for NormPos {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// A rectangle as fractions of the window: origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width fraction.
    pub width: f64,
    /// Height fraction.
    pub height: f64,
}

impl NormRect {
    /// The whole window.
    pub const FULL: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Create a normalized rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel rectangle `(left, top, width, height)` inside a surface.
    #[must_use]
    pub fn to_pixels(self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let w = f64::from(width);
        let h = f64::from(height);
        (
            (self.x * w) as u32,
            (self.y * h) as u32,
            ((self.width * w) as u32).max(1),
            ((self.height * h) as u32).max(1),
        )
    }
}

impl Default for NormRect {
    fn default() -> Self {
        Self::FULL
    }
}
