//! Grid search for the best position of a unit on a map.
//!
//! Cells are visited row-major (top to bottom, then left to right) on a fixed
//! stride. A cell is accepted when its validity pixel is set and the unit's
//! footprint disc touches neither the track nor occupied space. Accepted cells
//! are scored by how many flow points lie within attack range; the first cell
//! with the strictly greatest score wins.

use tracing::debug;

use crate::data::UnitData;
use crate::error::{BotError, Result};
use crate::map::MapModel;
use crate::math::NormPos;

/// Stride for the quick feasibility probe.
pub const PROBE_STRIDE: u32 = 40;

/// Stride for the actual placement search.
pub const PLACEMENT_STRIDE: u32 = 10;

/// An accepted, scored placement cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementCandidate {
    /// Position normalized to the raster size.
    pub position: NormPos,
    /// Raster pixel of the cell.
    pub pixel: (u32, u32),
    /// Flow points within attack range.
    pub score: usize,
}

/// Cells of the scan grid in row-major order.
fn grid(map: &MapModel, stride: u32) -> impl Iterator<Item = (u32, u32)> {
    let step = stride.max(1) as usize;
    let width = map.width();
    (0..map.height())
        .step_by(step)
        .flat_map(move |y| (0..width).step_by(step).map(move |x| (x, y)))
}

fn accepts(map: &MapModel, unit: &UnitData, footprint_px: f64, x: u32, y: u32) -> bool {
    if !map.validity(unit.medium).get(x, y) {
        return false;
    }
    let (cx, cy) = (f64::from(x), f64::from(y));
    !map.track().any_in_disc(cx, cy, footprint_px)
        && !map.occupied().any_in_disc(cx, cy, footprint_px)
}

/// Flow points within `range_px` of a pixel.
#[must_use]
pub fn flow_coverage(map: &MapModel, x: f64, y: f64, range_px: f64) -> usize {
    let range2 = range_px * range_px;
    map.flow_points()
        .iter()
        .filter(|(fx, fy)| {
            let dx = fx - x;
            let dy = fy - y;
            dx * dx + dy * dy <= range2
        })
        .count()
}

/// Find the highest-scoring accepted cell for a unit.
///
/// # Errors
///
/// Returns [`BotError::InvalidPlacement`] if no cell is accepted.
pub fn find_best_placement(
    map: &MapModel,
    unit: &UnitData,
    stride: u32,
) -> Result<PlacementCandidate> {
    let footprint_px = map.to_pixels(unit.footprint.radius());
    let range_px = map.to_pixels(unit.range);

    let mut best: Option<PlacementCandidate> = None;
    for (x, y) in grid(map, stride) {
        if !accepts(map, unit, footprint_px, x, y) {
            continue;
        }
        let score = flow_coverage(map, f64::from(x), f64::from(y), range_px);
        if best.map_or(true, |b| score > b.score) {
            best = Some(PlacementCandidate {
                position: NormPos::from_pixels(
                    f64::from(x),
                    f64::from(y),
                    map.width(),
                    map.height(),
                ),
                pixel: (x, y),
                score,
            });
        }
    }

    match best {
        Some(candidate) => {
            debug!(
                unit = %unit.kind,
                x = candidate.pixel.0,
                y = candidate.pixel.1,
                score = candidate.score,
                "Best placement"
            );
            Ok(candidate)
        }
        None => Err(BotError::InvalidPlacement(unit.kind.name().into())),
    }
}

/// Whether any cell on the grid is accepted for the unit.
#[must_use]
pub fn can_place_anywhere(map: &MapModel, unit: &UnitData, stride: u32) -> bool {
    let footprint_px = map.to_pixels(unit.footprint.radius());
    grid(map, stride).any(|(x, y)| accepts(map, unit, footprint_px, x, y))
}
