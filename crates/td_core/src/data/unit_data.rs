//! Unit data structures for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use super::upgrade_data::UpgradeData;
use crate::map::PlacementMedium;
use crate::match_setup::Difficulty;
use crate::roster::UpgradePath;
use crate::unit_kind::UnitKind;

/// Placement-exclusion shape of a unit, in game units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Footprint {
    /// Round base.
    Circle {
        /// Radius in game units.
        radius: f64,
    },
    /// Rectangular base.
    Rectangle {
        /// Width in game units.
        width: f64,
        /// Height in game units.
        height: f64,
    },
}

impl Footprint {
    /// Radius of the circle used for exclusion tests.
    ///
    /// Rectangles use half their longer side.
    #[must_use]
    pub fn radius(self) -> f64 {
        match self {
            Self::Circle { radius } => radius,
            Self::Rectangle { width, height } => width.max(height) / 2.0,
        }
    }
}

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     kind: DartMonkey,
///     costs: (170, 200, 215, 240),
///     range: 32.0,
///     footprint: Circle(radius: 6.0),
///     damage: 1.0,
///     cooldown: 0.95,
///     pierce: 2.0,
///     paths: ([
///         UpgradeData(name: "Sharp Shots", costs: (120, 140, 150, 170), pierce: Some(3.0)),
///     ], [], []),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitData {
    /// Unit type this record describes.
    pub kind: UnitKind,

    /// Purchase price per difficulty (easy, medium, hard, impoppable).
    pub costs: [u32; 4],

    /// Attack range in game units.
    pub range: f64,

    /// Placement footprint.
    pub footprint: Footprint,

    /// Where the unit may be placed.
    #[serde(default)]
    pub medium: PlacementMedium,

    /// Base ability to see concealed targets.
    #[serde(default)]
    pub sees_camo: bool,

    /// Base ability to damage heavily armored targets.
    #[serde(default)]
    pub pops_lead: bool,

    /// Damage per hit.
    pub damage: f64,

    /// Seconds between attacks.
    pub cooldown: f64,

    /// Targets each projectile can hit.
    #[serde(default = "default_one")]
    pub pierce: f64,

    /// Projectiles per attack.
    #[serde(default = "default_one")]
    pub projectiles: f64,

    /// Upgrade chains for the top, middle and bottom paths, tier 1 first.
    #[serde(default)]
    pub paths: [Vec<UpgradeData>; 3],
}

const fn default_one() -> f64 {
    1.0
}

impl UnitData {
    /// Purchase price at a difficulty.
    #[must_use]
    pub const fn cost(&self, difficulty: Difficulty) -> u32 {
        self.costs[difficulty.cost_index()]
    }

    /// Upgrade record for `tier` (1-based) on a path.
    #[must_use]
    pub fn upgrade(&self, path: UpgradePath, tier: u8) -> Option<&UpgradeData> {
        let index = usize::from(tier).checked_sub(1)?;
        self.paths[path.index()].get(index)
    }

    /// Upgrade records for tiers `1..=tier` on a path.
    #[must_use]
    pub fn upgrades_through(&self, path: UpgradePath, tier: u8) -> &[UpgradeData] {
        let chain = &self.paths[path.index()];
        &chain[..usize::from(tier).min(chain.len())]
    }
}
