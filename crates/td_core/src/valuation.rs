//! Coverage, damage economics and action scores.
//!
//! Stats are rebuilt from a unit's base record by walking its unlocked
//! upgrade chain path by path (top, middle, bottom), tier 1 first. A tier
//! that sets a stat overrides the running value; absent fields leave it
//! unchanged.

use serde::{Deserialize, Serialize};

use crate::data::{UnitCatalog, UnitData, UpgradeData};
use crate::error::Result;
use crate::match_setup::Difficulty;
use crate::roster::{Roster, UpgradePath, UpgradeTiers, MAX_TIER};

/// Per-tier discount applied by [`future_value`].
pub const FUTURE_DISCOUNT: f64 = 0.8;

/// Decay of the placement bias per unit already placed.
pub const PLACEMENT_BIAS_DECAY: f64 = 0.3;

/// Bonus per distinct unit kind already placed.
pub const DIVERSITY_STEP: f64 = 0.1;

/// Upgrade score base value per target tier.
pub const UPGRADE_TIER_VALUE: f64 = 4.0;

/// Weight of efficiency terms in both action scores.
const EFFICIENCY_WEIGHT: f64 = 100.0;

/// Weight of future value relative to current cost efficiency.
const FUTURE_WEIGHT: f64 = 0.2;

/// Multiplier per missing coverage flag a placement would supply.
const PLACEMENT_GAP_BONUS: f64 = 1.5;

/// Multiplier for upgrades granting any coverage flag.
const GRANTS_COVERAGE_BONUS: f64 = 1.2;

/// Multiplier per missing coverage flag an upgrade would supply.
const UPGRADE_GAP_BONUS: f64 = 2.0;

/// Multiplier when an upgrade completes a unit's coverage.
const COMPLEMENT_BONUS: f64 = 2.0;

/// Special-target capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coverage {
    /// Sees concealed targets.
    pub camo: bool,
    /// Damages heavily armored targets.
    pub lead: bool,
}

impl Coverage {
    /// Base coverage of a unit record.
    #[must_use]
    pub const fn of_unit(unit: &UnitData) -> Self {
        Self {
            camo: unit.sees_camo,
            lead: unit.pops_lead,
        }
    }

    /// Coverage granted by an upgrade tier.
    #[must_use]
    pub const fn of_upgrade(upgrade: &UpgradeData) -> Self {
        Self {
            camo: upgrade.grants_camo,
            lead: upgrade.grants_lead,
        }
    }

    /// Flag-wise OR.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            camo: self.camo || other.camo,
            lead: self.lead || other.lead,
        }
    }

    /// Flags set in `self` but not in `existing`.
    #[must_use]
    pub const fn gaps_filled(self, existing: Self) -> usize {
        (self.camo && !existing.camo) as usize + (self.lead && !existing.lead) as usize
    }

    /// Number of set flags.
    #[must_use]
    pub const fn count(self) -> usize {
        self.camo as usize + self.lead as usize
    }
}

/// Coverage of a unit at given tiers: base flags OR every unlocked tier's
/// granted flags.
#[must_use]
pub fn unit_coverage(unit: &UnitData, tiers: UpgradeTiers) -> Coverage {
    UpgradePath::ALL
        .into_iter()
        .flat_map(|path| unit.upgrades_through(path, tiers.get(path)))
        .fold(Coverage::of_unit(unit), |acc, up| {
            acc.union(Coverage::of_upgrade(up))
        })
}

/// OR of every placed unit's coverage.
///
/// # Errors
///
/// Returns [`crate::error::BotError::UnknownUnit`] if a placed unit has no
/// catalog entry.
pub fn global_coverage(catalog: &UnitCatalog, roster: &Roster) -> Result<Coverage> {
    roster.iter().try_fold(Coverage::default(), |acc, placed| {
        let unit = catalog.get(placed.kind)?;
        Ok(acc.union(unit_coverage(unit, placed.tiers)))
    })
}

/// Running attack stats of a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatProfile {
    /// Damage per hit.
    pub damage: f64,
    /// Seconds between attacks.
    pub cooldown: f64,
    /// Targets per projectile.
    pub pierce: f64,
    /// Projectiles per attack.
    pub projectiles: f64,
}

impl CombatProfile {
    /// Base stats of a unit.
    #[must_use]
    pub const fn base(unit: &UnitData) -> Self {
        Self {
            damage: unit.damage,
            cooldown: unit.cooldown,
            pierce: unit.pierce,
            projectiles: unit.projectiles,
        }
    }

    /// Stats after unlocking `tiers`.
    #[must_use]
    pub fn at(unit: &UnitData, tiers: UpgradeTiers) -> Self {
        let mut profile = Self::base(unit);
        for path in UpgradePath::ALL {
            for upgrade in unit.upgrades_through(path, tiers.get(path)) {
                profile.apply(upgrade);
            }
        }
        profile
    }

    /// Apply one tier's overrides.
    pub fn apply(&mut self, upgrade: &UpgradeData) {
        if let Some(v) = upgrade.damage {
            self.damage = v;
        }
        if let Some(v) = upgrade.cooldown {
            self.cooldown = v;
        }
        if let Some(v) = upgrade.pierce {
            self.pierce = v;
        }
        if let Some(v) = upgrade.projectiles {
            self.projectiles = v;
        }
    }

    /// `damage × pierce × projectiles / cooldown`, or 0 for a non-positive
    /// cooldown.
    #[must_use]
    pub fn dps(self) -> f64 {
        if self.cooldown <= 0.0 {
            return 0.0;
        }
        self.damage * self.pierce * self.projectiles / self.cooldown
    }
}

/// DPS estimate of a unit at given tiers.
#[must_use]
pub fn estimate_dps(unit: &UnitData, tiers: UpgradeTiers) -> f64 {
    CombatProfile::at(unit, tiers).dps()
}

/// Price used as a divisor; free items count as 1.
fn divisor(cost: u32) -> f64 {
    f64::from(cost.max(1))
}

/// Base DPS per unit of purchase price.
#[must_use]
pub fn cost_efficiency(unit: &UnitData, difficulty: Difficulty) -> f64 {
    estimate_dps(unit, UpgradeTiers::default()) / divisor(unit.cost(difficulty))
}

/// DPS gained per unit of price by the next tier on `path`, floored at 0.
///
/// Returns 0 when the path has no further tier.
#[must_use]
pub fn upgrade_efficiency(
    unit: &UnitData,
    tiers: UpgradeTiers,
    path: UpgradePath,
    difficulty: Difficulty,
) -> f64 {
    let Some(upgrade) = unit.upgrade(path, tiers.get(path) + 1) else {
        return 0.0;
    };
    let delta = estimate_dps(unit, tiers.advanced(path)) - estimate_dps(unit, tiers);
    if delta <= 0.0 {
        return 0.0;
    }
    delta / divisor(upgrade.cost(difficulty))
}

/// Discounted DPS-per-price over every priced tier of every path.
///
/// Tier `t` on a path is valued with only that path unlocked to `t` and
/// discounted by `FUTURE_DISCOUNT^(t-1)`.
#[must_use]
pub fn future_value(unit: &UnitData, difficulty: Difficulty) -> f64 {
    let mut total = 0.0;
    for path in UpgradePath::ALL {
        let mut tiers = UpgradeTiers::default();
        for (i, upgrade) in unit.paths[path.index()]
            .iter()
            .take(usize::from(MAX_TIER))
            .enumerate()
        {
            tiers = tiers.advanced(path);
            let cost = upgrade.cost(difficulty);
            if cost == 0 {
                continue;
            }
            let dps = estimate_dps(unit, tiers);
            total += dps / f64::from(cost) * FUTURE_DISCOUNT.powi(i as i32);
        }
    }
    total
}

/// Score for placing a unit at a cell covering `flow_score` flow points.
#[must_use]
pub fn placement_score(
    flow_score: usize,
    unit: &UnitData,
    difficulty: Difficulty,
    roster: &Roster,
    global: Coverage,
) -> f64 {
    let bias = 1.0 / (1.0 + PLACEMENT_BIAS_DECAY * roster.len() as f64);
    let diversity = 1.0 + DIVERSITY_STEP * roster.distinct_kinds() as f64;
    let economics = 1.0
        + EFFICIENCY_WEIGHT
            * (cost_efficiency(unit, difficulty) + FUTURE_WEIGHT * future_value(unit, difficulty));
    let gaps = Coverage::of_unit(unit).gaps_filled(global);

    flow_score as f64 * bias * diversity * economics * PLACEMENT_GAP_BONUS.powi(gaps as i32)
}

/// Score for buying `upgrade` as tier `target_tier`.
///
/// `unit_coverage` is the unit's coverage before the upgrade.
#[must_use]
pub fn upgrade_score(
    target_tier: u8,
    upgrade: &UpgradeData,
    unit_coverage: Coverage,
    global: Coverage,
    efficiency: f64,
) -> f64 {
    let granted = Coverage::of_upgrade(upgrade);
    let mut score = UPGRADE_TIER_VALUE * f64::from(target_tier);

    if upgrade.grants_any_coverage() {
        score *= GRANTS_COVERAGE_BONUS;
    }
    score *= UPGRADE_GAP_BONUS.powi(granted.gaps_filled(global) as i32);

    let completes = (unit_coverage.camo && !unit_coverage.lead && granted.lead)
        || (unit_coverage.lead && !unit_coverage.camo && granted.camo);
    if completes {
        score *= COMPLEMENT_BONUS;
    }

    score * (1.0 + EFFICIENCY_WEIGHT * efficiency)
}
