//! Per-level map model: validity rasters, occupied space and flow points.
//!
//! All rasters of one [`MapModel`] share the same dimensions. Coordinates are
//! raster pixels with the origin at the top-left corner.

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::math::NormPos;

/// Game units to raster pixels on the reference capture size.
pub const PIXELS_PER_UNIT: f64 = 5.375;

/// Occupied-space clearance painted around a placed unit, as a multiple of its
/// footprint radius.
pub const OCCUPIED_CLEARANCE: f64 = 1.5;

/// A binary raster stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Raster {
    /// Create an all-clear raster.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, false)
    }

    /// Create a raster with every cell set to `value`.
    #[must_use]
    pub fn filled(width: u32, height: u32, value: bool) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }

    /// Create a raster from a per-pixel predicate.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Raster width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether two rasters have identical dimensions.
    #[must_use]
    pub const fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Cell value. Out-of-bounds cells read as clear.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.index(i64::from(x), i64::from(y))
            .is_some_and(|i| self.cells[i])
    }

    /// Set a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if let Some(i) = self.index(i64::from(x), i64::from(y)) {
            self.cells[i] = value;
        }
    }

    /// Cell-wise OR with a raster of the same size.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::InvalidMap`] when the dimensions differ.
    pub fn union(&self, other: &Self) -> Result<Self> {
        if !self.same_size(other) {
            return Err(BotError::InvalidMap(format!(
                "cannot combine {}x{} with {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        Ok(Self {
            width: self.width,
            height: self.height,
            cells: self
                .cells
                .iter()
                .zip(&other.cells)
                .map(|(a, b)| *a || *b)
                .collect(),
        })
    }

    /// Bounding box of a disc, clipped to the raster.
    fn disc_bounds(&self, cx: f64, cy: f64, radius: f64) -> (i64, i64, i64, i64) {
        let r = radius.max(0.0);
        let x0 = ((cx - r).floor() as i64).max(0);
        let y0 = ((cy - r).floor() as i64).max(0);
        let x1 = ((cx + r).ceil() as i64).min(i64::from(self.width) - 1);
        let y1 = ((cy + r).ceil() as i64).min(i64::from(self.height) - 1);
        (x0, y0, x1, y1)
    }

    /// Set every cell whose centre lies within `radius` of `(cx, cy)`.
    pub fn paint_disc(&mut self, cx: f64, cy: f64, radius: f64) {
        let (x0, y0, x1, y1) = self.disc_bounds(cx, cy, radius);
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= r2 {
                    if let Some(i) = self.index(x, y) {
                        self.cells[i] = true;
                    }
                }
            }
        }
    }

    /// Whether any set cell lies within `radius` of `(cx, cy)`.
    #[must_use]
    pub fn any_in_disc(&self, cx: f64, cy: f64, radius: f64) -> bool {
        let (x0, y0, x1, y1) = self.disc_bounds(cx, cy, radius);
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= r2 && self.index(x, y).is_some_and(|i| self.cells[i]) {
                    return true;
                }
            }
        }
        false
    }

    /// Clear every cell.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Number of set cells.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

/// Where a unit may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlacementMedium {
    /// Land only.
    #[default]
    Land,
    /// Water only.
    Water,
    /// Land or water.
    Either,
}

/// Static geometry of one level plus the space taken by placed units.
///
/// `occupied` is the only field that changes during a session. It grows with
/// each placement and is cleared only when a new level is selected.
#[derive(Debug, Clone)]
pub struct MapModel {
    land: Raster,
    water: Raster,
    track: Raster,
    either: Raster,
    occupied: Raster,
    flow_points: Vec<(f64, f64)>,
    pixels_per_unit: f64,
}

impl MapModel {
    /// Build a map from its three validity rasters and flow points.
    ///
    /// Flow points are in raster pixel space, in travel order.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::InvalidMap`] when raster dimensions differ or a
    /// raster is empty.
    pub fn new(
        land: Raster,
        water: Raster,
        track: Raster,
        flow_points: Vec<(f64, f64)>,
    ) -> Result<Self> {
        if land.width() == 0 || land.height() == 0 {
            return Err(BotError::InvalidMap("empty land raster".into()));
        }
        if !land.same_size(&track) {
            return Err(BotError::InvalidMap(format!(
                "track raster is {}x{}, land raster is {}x{}",
                track.width(),
                track.height(),
                land.width(),
                land.height()
            )));
        }
        let either = land.union(&water)?;
        let occupied = Raster::new(land.width(), land.height());
        Ok(Self {
            land,
            water,
            track,
            either,
            occupied,
            flow_points,
            pixels_per_unit: PIXELS_PER_UNIT,
        })
    }

    /// Override the game-unit to pixel scale.
    #[must_use]
    pub fn with_pixel_scale(mut self, pixels_per_unit: f64) -> Self {
        self.pixels_per_unit = pixels_per_unit;
        self
    }

    /// Raster width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.land.width()
    }

    /// Raster height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.land.height()
    }

    /// Validity raster for a placement medium.
    #[must_use]
    pub const fn validity(&self, medium: PlacementMedium) -> &Raster {
        match medium {
            PlacementMedium::Land => &self.land,
            PlacementMedium::Water => &self.water,
            PlacementMedium::Either => &self.either,
        }
    }

    /// Track raster.
    #[must_use]
    pub const fn track(&self) -> &Raster {
        &self.track
    }

    /// Occupied-space raster.
    #[must_use]
    pub const fn occupied(&self) -> &Raster {
        &self.occupied
    }

    /// Flow points in travel order.
    #[must_use]
    pub fn flow_points(&self) -> &[(f64, f64)] {
        &self.flow_points
    }

    /// Convert a game-unit distance to raster pixels.
    #[must_use]
    pub fn to_pixels(&self, game_units: f64) -> f64 {
        game_units * self.pixels_per_unit
    }

    /// Record a placed unit: paint its footprint, inflated by
    /// [`OCCUPIED_CLEARANCE`], into the occupied raster.
    pub fn mark_occupied(&mut self, position: NormPos, footprint_radius: f64) {
        let (px, py) = position.to_pixels(self.width(), self.height());
        let radius = self.to_pixels(footprint_radius) * OCCUPIED_CLEARANCE;
        self.occupied.paint_disc(px, py, radius);
    }

    /// Forget every placement. Called when a new level is selected.
    pub fn clear_occupied(&mut self) {
        self.occupied.clear();
    }
}
