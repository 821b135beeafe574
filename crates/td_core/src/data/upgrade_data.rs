//! Upgrade tier data.

use serde::{Deserialize, Serialize};

use crate::match_setup::Difficulty;

/// One tier of an upgrade path.
///
/// Stat fields are overrides: `Some` replaces the running value when the
/// tier is applied, `None` leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeData {
    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Price per difficulty (easy, medium, hard, impoppable).
    pub costs: [u32; 4],

    /// Grants the ability to see concealed targets.
    #[serde(default)]
    pub grants_camo: bool,

    /// Grants the ability to damage heavily armored targets.
    #[serde(default)]
    pub grants_lead: bool,

    /// New damage per hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<f64>,

    /// New seconds between attacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f64>,

    /// New pierce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pierce: Option<f64>,

    /// New projectile count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projectiles: Option<f64>,
}

impl UpgradeData {
    /// A tier with a price and no other effect.
    #[must_use]
    pub fn priced(name: impl Into<String>, costs: [u32; 4]) -> Self {
        Self {
            name: name.into(),
            costs,
            ..Self::default()
        }
    }

    /// Price at a difficulty.
    #[must_use]
    pub const fn cost(&self, difficulty: Difficulty) -> u32 {
        self.costs[difficulty.cost_index()]
    }

    /// Whether this tier grants either special-target capability.
    #[must_use]
    pub const fn grants_any_coverage(&self) -> bool {
        self.grants_camo || self.grants_lead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priced_has_no_overrides() {
        let upgrade = UpgradeData::priced("Long Range Darts", [80, 90, 100, 110]);
        assert_eq!(upgrade.cost(Difficulty::Hard), 100);
        assert!(upgrade.damage.is_none());
        assert!(!upgrade.grants_any_coverage());
    }

    #[test]
    fn test_deserialize_partial() {
        let upgrade: UpgradeData =
            ron::from_str("(costs: (1, 2, 3, 4), grants_lead: true, pierce: Some(5.0))").unwrap();
        assert!(upgrade.grants_lead);
        assert!(upgrade.grants_any_coverage());
        assert_eq!(upgrade.pierce, Some(5.0));
        assert!(upgrade.name.is_empty());
    }
}
