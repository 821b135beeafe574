//! Test fixtures and helpers.
//!
//! Pre-built maps and unit tables for consistent testing.

use td_core::data::{Footprint, UnitCatalog, UnitData, UpgradeData};
use td_core::map::{MapModel, PlacementMedium, Raster};
use td_core::unit_kind::UnitKind;

/// Side length of [`banded_map`].
pub const MAP_SIZE: u32 = 200;

/// Rows covered by the track in [`banded_map`].
pub const TRACK_ROWS: std::ops::RangeInclusive<u32> = 90..=110;

/// First column of the water strip in [`banded_map`].
pub const WATER_FROM: u32 = 180;

/// A 200x200 level with a horizontal track through the middle.
///
/// Land everywhere off the track left of column 180, water to the right of
/// it. Flow points run along row 100 every 10 pixels. One game unit is one
/// pixel, so ranges and footprints read directly as pixel distances.
///
/// # Panics
///
/// Never; the rasters are built with matching sizes.
#[must_use]
pub fn banded_map() -> MapModel {
    let track = Raster::from_fn(MAP_SIZE, MAP_SIZE, |_, y| TRACK_ROWS.contains(&y));
    let land = Raster::from_fn(MAP_SIZE, MAP_SIZE, |x, y| {
        x < WATER_FROM && !TRACK_ROWS.contains(&y)
    });
    let water = Raster::from_fn(MAP_SIZE, MAP_SIZE, |x, y| {
        x >= WATER_FROM && !TRACK_ROWS.contains(&y)
    });
    let flow = (0..MAP_SIZE)
        .step_by(10)
        .map(|x| (f64::from(x), 100.0))
        .collect();
    MapModel::new(land, water, track, flow)
        .expect("fixture rasters share one size")
        .with_pixel_scale(1.0)
}

/// A plain land unit with flat prices and no upgrades.
#[must_use]
pub fn basic_unit(kind: UnitKind, cost: u32) -> UnitData {
    UnitData {
        kind,
        costs: [cost; 4],
        range: 40.0,
        footprint: Footprint::Circle { radius: 5.0 },
        medium: PlacementMedium::Land,
        sees_camo: false,
        pops_lead: false,
        damage: 1.0,
        cooldown: 1.0,
        pierce: 1.0,
        projectiles: 1.0,
        paths: Default::default(),
    }
}

/// Five flat-priced tiers on every path.
#[must_use]
pub fn flat_paths(cost: u32) -> [Vec<UpgradeData>; 3] {
    [
        vec![UpgradeData::priced("top", [cost; 4]); 5],
        vec![UpgradeData::priced("middle", [cost; 4]); 5],
        vec![UpgradeData::priced("bottom", [cost; 4]); 5],
    ]
}

/// A small catalog in the on-disk RON format.
pub const SAMPLE_CATALOG_RON: &str = r#"(
    units: [
        (
            kind: DartMonkey,
            costs: (170, 200, 215, 240),
            range: 32.0,
            footprint: Circle(radius: 6.0),
            damage: 1.0,
            cooldown: 0.95,
            pierce: 2.0,
            paths: ([
                (name: "Sharp Shots", costs: (120, 140, 150, 170), pierce: Some(3.0)),
                (name: "Razor Sharp Shots", costs: (185, 220, 235, 265), pierce: Some(5.0)),
            ], [
                (name: "Quick Shots", costs: (85, 100, 110, 120), cooldown: Some(0.8)),
                (name: "Very Quick Shots", costs: (160, 190, 205, 230), cooldown: Some(0.6)),
            ], [
                (name: "Long Range Darts", costs: (75, 90, 95, 110)),
                (name: "Enhanced Eyesight", costs: (170, 200, 215, 240), grants_camo: true),
            ]),
        ),
        (
            kind: TackShooter,
            costs: (240, 280, 300, 335),
            range: 23.0,
            footprint: Circle(radius: 6.5),
            damage: 1.0,
            cooldown: 1.4,
            projectiles: 8.0,
            paths: ([
                (name: "Faster Shooting", costs: (130, 150, 160, 180), cooldown: Some(1.05)),
            ], [
                (name: "Long Range Tacks", costs: (85, 100, 110, 120)),
            ], [
                (name: "More Tacks", costs: (85, 100, 110, 120), projectiles: Some(10.0)),
            ]),
        ),
        (
            kind: BombShooter,
            costs: (445, 525, 565, 630),
            range: 40.0,
            footprint: Circle(radius: 8.0),
            pops_lead: true,
            damage: 1.0,
            cooldown: 1.5,
            pierce: 14.0,
            paths: ([
                (name: "Bigger Bombs", costs: (295, 350, 375, 420), pierce: Some(22.0)),
            ], [], []),
        ),
        (
            kind: SniperMonkey,
            costs: (300, 350, 380, 420),
            range: 200.0,
            footprint: Rectangle(width: 10.0, height: 12.0),
            damage: 2.0,
            cooldown: 1.59,
            paths: ([
                (name: "Full Metal Jacket", costs: (295, 350, 380, 420), damage: Some(4.0), grants_lead: true),
            ], [], [
                (name: "Night Vision Goggles", costs: (255, 300, 325, 360), grants_camo: true),
            ]),
        ),
        (
            kind: NinjaMonkey,
            costs: (425, 500, 540, 600),
            range: 40.0,
            footprint: Circle(radius: 6.0),
            sees_camo: true,
            damage: 1.0,
            cooldown: 0.7,
            pierce: 2.0,
        ),
        (
            kind: MonkeySub,
            costs: (275, 325, 350, 390),
            range: 42.0,
            footprint: Circle(radius: 7.0),
            medium: Water,
            damage: 1.0,
            cooldown: 0.75,
        ),
    ],
)"#;

/// [`SAMPLE_CATALOG_RON`] parsed.
///
/// # Panics
///
/// If the embedded RON stops parsing.
#[must_use]
pub fn sample_catalog() -> UnitCatalog {
    UnitCatalog::from_ron_str(SAMPLE_CATALOG_RON).expect("sample catalog parses")
}
