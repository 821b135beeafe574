//! Placed units, their upgrade tiers and the upgrade-path legality rules.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::math::NormPos;
use crate::unit_kind::UnitKind;

/// Highest tier on any upgrade path.
pub const MAX_TIER: u8 = 5;

/// Tier above which sibling paths are capped.
const CROSSPATH_CAP: u8 = 2;

/// One of the three upgrade paths of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradePath {
    /// First path.
    Top,
    /// Second path.
    Middle,
    /// Third path.
    Bottom,
}

impl UpgradePath {
    /// All paths in override order.
    pub const ALL: [Self; 3] = [Self::Top, Self::Middle, Self::Bottom];

    /// Array index of the path.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Middle => 1,
            Self::Bottom => 2,
        }
    }

    /// Key that buys the next tier while the unit is selected.
    #[must_use]
    pub const fn hotkey(self) -> &'static str {
        match self {
            Self::Top => ",",
            Self::Middle => ".",
            Self::Bottom => "/",
        }
    }

    /// The two other paths.
    #[must_use]
    pub fn siblings(self) -> [Self; 2] {
        match self {
            Self::Top => [Self::Middle, Self::Bottom],
            Self::Middle => [Self::Top, Self::Bottom],
            Self::Bottom => [Self::Top, Self::Middle],
        }
    }
}

impl fmt::Display for UpgradePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        })
    }
}

impl FromStr for UpgradePath {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "1" => Ok(Self::Top),
            "middle" | "2" => Ok(Self::Middle),
            "bottom" | "3" => Ok(Self::Bottom),
            other => Err(BotError::InvalidUpgradePath(format!(
                "unknown path name '{other}'"
            ))),
        }
    }
}

/// Current tier on each path, `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpgradeTiers(pub [u8; 3]);

impl UpgradeTiers {
    /// Tiers from a `top-middle-bottom` triple.
    #[must_use]
    pub const fn new(top: u8, middle: u8, bottom: u8) -> Self {
        Self([top, middle, bottom])
    }

    /// Tier on a path.
    #[must_use]
    pub const fn get(self, path: UpgradePath) -> u8 {
        self.0[path.index()]
    }

    /// Copy with one more tier on `path`, ignoring legality.
    #[must_use]
    pub fn advanced(mut self, path: UpgradePath) -> Self {
        let tier = &mut self.0[path.index()];
        *tier = tier.saturating_add(1).min(MAX_TIER);
        self
    }
}

impl fmt::Display for UpgradeTiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Whether `path` may gain one tier given the unit's current tiers.
///
/// - a path at tier 5 cannot advance;
/// - only two paths may ever hold investment;
/// - once a sibling reaches tier 3, this path stops at tier 2.
#[must_use]
pub fn can_advance(tiers: UpgradeTiers, path: UpgradePath) -> bool {
    advance_violation(tiers, path).is_none()
}

/// Like [`can_advance`], reporting the violated rule.
///
/// # Errors
///
/// Returns [`BotError::InvalidUpgradePath`] naming the rule that forbids it.
pub fn check_advance(tiers: UpgradeTiers, path: UpgradePath) -> Result<()> {
    match advance_violation(tiers, path) {
        None => Ok(()),
        Some(reason) => Err(BotError::InvalidUpgradePath(format!(
            "{path} path of a {tiers} unit: {reason}"
        ))),
    }
}

fn advance_violation(tiers: UpgradeTiers, path: UpgradePath) -> Option<&'static str> {
    let current = tiers.get(path);
    let siblings = path.siblings().map(|p| tiers.get(p));
    if current >= MAX_TIER {
        return Some("already at the last tier");
    }
    if siblings.iter().all(|t| *t > 0) {
        return Some("two other paths are already in use");
    }
    if siblings.iter().any(|t| *t > CROSSPATH_CAP) && current >= CROSSPATH_CAP {
        return Some("a sibling path is past tier 2");
    }
    None
}

/// A unit placed during the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedUnit {
    /// Session-unique identifier.
    pub id: u32,
    /// Unit type.
    pub kind: UnitKind,
    /// Normalized position on the window.
    pub position: NormPos,
    /// Current upgrade tiers.
    #[serde(default)]
    pub tiers: UpgradeTiers,
}

/// Units placed this session. Units are never removed.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<PlacedUnit>,
    next_id: u32,
}

impl Roster {
    /// Empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a roster from known units, e.g. a saved snapshot.
    #[must_use]
    pub fn from_units(units: Vec<PlacedUnit>) -> Self {
        let next_id = units
            .iter()
            .map(|u| u.id.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self { units, next_id }
    }

    /// Record a new placement and return its id.
    pub fn place(&mut self, kind: UnitKind, position: NormPos) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.units.push(PlacedUnit {
            id,
            kind,
            position,
            tiers: UpgradeTiers::default(),
        });
        id
    }

    /// Unit by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&PlacedUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Advance one path of a unit by a tier, returning the new tier.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::InvalidUpgradePath`] for an unknown unit id or
    /// when the legality rules forbid the upgrade.
    pub fn upgrade(&mut self, id: u32, path: UpgradePath) -> Result<u8> {
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| BotError::InvalidUpgradePath(format!("no placed unit with id {id}")))?;
        check_advance(unit.tiers, path)?;
        unit.tiers = unit.tiers.advanced(path);
        Ok(unit.tiers.get(path))
    }

    /// Units in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedUnit> {
        self.units.iter()
    }

    /// Snapshot of the units.
    #[must_use]
    pub fn units(&self) -> &[PlacedUnit] {
        &self.units
    }

    /// Number of placed units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether nothing has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of distinct unit kinds placed.
    #[must_use]
    pub fn distinct_kinds(&self) -> usize {
        self.units.iter().map(|u| u.kind).collect::<BTreeSet<_>>().len()
    }
}
