//! Unit catalog combining every unit record used in a session.

use serde::{Deserialize, Serialize};

use super::unit_data::UnitData;
use super::upgrade_data::UpgradeData;
use crate::error::{BotError, Result};
use crate::roster::{UpgradePath, MAX_TIER};
use crate::unit_kind::UnitKind;

/// All unit records available to the planner.
///
/// Loaded once from a RON file and read-only for the session.
///
/// # Example RON
///
/// ```ron
/// UnitCatalog(
///     units: [
///         UnitData(kind: DartMonkey, ...),
///         UnitData(kind: SniperMonkey, ...),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitCatalog {
    /// Unit records, at most one per kind.
    pub units: Vec<UnitData>,
}

impl UnitCatalog {
    /// Build a catalog from unit records.
    #[must_use]
    pub fn from_units(units: impl IntoIterator<Item = UnitData>) -> Self {
        Self {
            units: units.into_iter().collect(),
        }
    }

    /// Parse a catalog from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::DataParse`] on malformed RON or when
    /// [`validate`](Self::validate) reports problems.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let catalog: Self = ron::from_str(source).map_err(|e| BotError::DataParse {
            what: "unit catalog".into(),
            message: e.to_string(),
        })?;
        let problems = catalog.validate();
        if problems.is_empty() {
            Ok(catalog)
        } else {
            Err(BotError::DataParse {
                what: "unit catalog".into(),
                message: problems.join("; "),
            })
        }
    }

    /// Record for a unit kind.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::UnknownUnit`] when the catalog has no entry.
    pub fn get(&self, kind: UnitKind) -> Result<&UnitData> {
        self.units
            .iter()
            .find(|u| u.kind == kind)
            .ok_or_else(|| BotError::UnknownUnit(kind.name().into()))
    }

    /// Upgrade record for `(kind, path, tier)`.
    #[must_use]
    pub fn upgrade(&self, kind: UnitKind, path: UpgradePath, tier: u8) -> Option<&UpgradeData> {
        self.get(kind).ok()?.upgrade(path, tier)
    }

    /// Kinds present in the catalog, in file order.
    pub fn kinds(&self) -> impl Iterator<Item = UnitKind> + '_ {
        self.units.iter().map(|u| u.kind)
    }

    /// Check internal consistency.
    ///
    /// Checks for:
    /// - Duplicate unit kinds
    /// - Upgrade paths longer than five tiers
    /// - Negative range or footprint
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (i, unit) in self.units.iter().enumerate() {
            if self.units[..i].iter().any(|u| u.kind == unit.kind) {
                errors.push(format!("Duplicate unit '{}'", unit.kind));
            }
            if unit.range < 0.0 {
                errors.push(format!("Unit '{}' has negative range", unit.kind));
            }
            if unit.footprint.radius() < 0.0 {
                errors.push(format!("Unit '{}' has negative footprint", unit.kind));
            }
            for path in UpgradePath::ALL {
                let tiers = unit.paths[path.index()].len();
                if tiers > usize::from(MAX_TIER) {
                    errors.push(format!(
                        "Unit '{}' has {tiers} tiers on the {path} path",
                        unit.kind
                    ));
                }
            }
        }

        errors
    }
}
