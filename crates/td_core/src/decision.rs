//! Enumerating and choosing the next action.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::UnitCatalog;
use crate::error::{BotError, Result};
use crate::map::MapModel;
use crate::match_setup::Difficulty;
use crate::math::NormPos;
use crate::placement::{can_place_anywhere, find_best_placement, PLACEMENT_STRIDE, PROBE_STRIDE};
use crate::roster::{can_advance, Roster, UpgradePath};
use crate::unit_kind::UnitKind;
use crate::valuation::{
    global_coverage, placement_score, unit_coverage, upgrade_efficiency, upgrade_score,
};

/// A concrete action the executor can perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedAction {
    /// Buy and place a new unit.
    Place {
        /// Unit type to place.
        kind: UnitKind,
        /// Normalized window position.
        position: NormPos,
        /// Price at the active difficulty.
        cost: u32,
    },
    /// Buy the next tier on one path of a placed unit.
    Upgrade {
        /// Roster id of the unit.
        unit_id: u32,
        /// Its type.
        kind: UnitKind,
        /// Where to click to select it.
        position: NormPos,
        /// Path to advance.
        path: UpgradePath,
        /// Tier reached after the purchase.
        target_tier: u8,
        /// Price at the active difficulty.
        cost: u32,
    },
}

impl PlannedAction {
    /// Price of the action.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        match self {
            Self::Place { cost, .. } | Self::Upgrade { cost, .. } => *cost,
        }
    }
}

/// An action with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAction {
    /// The action.
    pub action: PlannedAction,
    /// Higher is better.
    pub score: f64,
}

/// Everything the chooser reads.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// Unit and upgrade tables.
    pub catalog: &'a UnitCatalog,
    /// Current level geometry.
    pub map: &'a MapModel,
    /// Units placed so far.
    pub roster: &'a Roster,
    /// Reported balance.
    pub money: u32,
    /// Difficulty used for prices.
    pub difficulty: Difficulty,
    /// Stride of the feasibility probe.
    pub probe_stride: u32,
    /// Stride of the placement search.
    pub placement_stride: u32,
}

impl<'a> DecisionContext<'a> {
    /// Context with the default strides.
    #[must_use]
    pub const fn new(
        catalog: &'a UnitCatalog,
        map: &'a MapModel,
        roster: &'a Roster,
        money: u32,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            catalog,
            map,
            roster,
            money,
            difficulty,
            probe_stride: PROBE_STRIDE,
            placement_stride: PLACEMENT_STRIDE,
        }
    }
}

/// Every affordable, feasible action with its score.
///
/// Placements come first in candidate order, followed by upgrades in roster
/// order and path order.
///
/// # Errors
///
/// Returns [`BotError::UnknownUnit`] if a placed unit has no catalog entry.
/// Unknown candidate kinds are skipped.
pub fn enumerate_actions(
    ctx: &DecisionContext<'_>,
    candidates: &[UnitKind],
) -> Result<Vec<ScoredAction>> {
    let global = global_coverage(ctx.catalog, ctx.roster)?;
    let mut actions = Vec::new();

    for &kind in candidates {
        let unit = match ctx.catalog.get(kind) {
            Ok(unit) => unit,
            Err(e) => {
                warn!(%kind, error = %e, "Skipping candidate");
                continue;
            }
        };
        let cost = unit.cost(ctx.difficulty);
        if cost > ctx.money || !can_place_anywhere(ctx.map, unit, ctx.probe_stride) {
            continue;
        }
        let candidate = match find_best_placement(ctx.map, unit, ctx.placement_stride) {
            Ok(candidate) => candidate,
            Err(BotError::InvalidPlacement(_)) => continue,
            Err(e) => return Err(e),
        };
        let score = placement_score(candidate.score, unit, ctx.difficulty, ctx.roster, global);
        actions.push(ScoredAction {
            action: PlannedAction::Place {
                kind,
                position: candidate.position,
                cost,
            },
            score,
        });
    }

    for placed in ctx.roster.iter() {
        let unit = ctx.catalog.get(placed.kind)?;
        let coverage = unit_coverage(unit, placed.tiers);
        for path in UpgradePath::ALL {
            if !can_advance(placed.tiers, path) {
                continue;
            }
            let target_tier = placed.tiers.get(path) + 1;
            let Some(upgrade) = unit.upgrade(path, target_tier) else {
                continue;
            };
            let cost = upgrade.cost(ctx.difficulty);
            if cost > ctx.money {
                continue;
            }
            let efficiency = upgrade_efficiency(unit, placed.tiers, path, ctx.difficulty);
            let score = upgrade_score(target_tier, upgrade, coverage, global, efficiency);
            actions.push(ScoredAction {
                action: PlannedAction::Upgrade {
                    unit_id: placed.id,
                    kind: placed.kind,
                    position: placed.position,
                    path,
                    target_tier,
                    cost,
                },
                score,
            });
        }
    }

    debug!(count = actions.len(), money = ctx.money, "Enumerated actions");
    Ok(actions)
}

/// The highest-scoring action, or `None` when nothing is affordable and
/// feasible. Equal scores keep the earliest enumerated action.
///
/// # Errors
///
/// See [`enumerate_actions`].
pub fn choose_best_action(
    ctx: &DecisionContext<'_>,
    candidates: &[UnitKind],
) -> Result<Option<ScoredAction>> {
    let mut best: Option<ScoredAction> = None;
    for action in enumerate_actions(ctx, candidates)? {
        if best.as_ref().map_or(true, |b| action.score > b.score) {
            best = Some(action);
        }
    }
    Ok(best)
}

/// Record a performed action in the map and roster.
///
/// Placements paint the unit's footprint into occupied space and join the
/// roster; upgrades advance the unit's path. Returns the id of the affected
/// unit.
///
/// # Errors
///
/// Returns [`BotError::UnknownUnit`] for a placement of an unlisted kind, or
/// [`BotError::InvalidUpgradePath`] if the upgrade is not legal for the unit.
pub fn apply_action(
    action: &PlannedAction,
    catalog: &UnitCatalog,
    map: &mut MapModel,
    roster: &mut Roster,
) -> Result<u32> {
    match *action {
        PlannedAction::Place { kind, position, .. } => {
            let unit = catalog.get(kind)?;
            map.mark_occupied(position, unit.footprint.radius());
            Ok(roster.place(kind, position))
        }
        PlannedAction::Upgrade { unit_id, path, .. } => {
            roster.upgrade(unit_id, path)?;
            Ok(unit_id)
        }
    }
}
