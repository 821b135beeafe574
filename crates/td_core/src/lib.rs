//! # TD Core
//!
//! Decision core for the tower-defense autopilot.
//!
//! This crate contains **only** pure decision logic:
//! - No screen capture or input injection
//! - No file IO
//! - No threads and no sleeping
//!
//! This separation enables:
//! - Offline planning from a captured snapshot
//! - Reproducible placement and scoring (fixed scan order, fixed tie-breaks)
//! - Unit testing every heuristic in isolation
//!
//! ## Crate Structure
//!
//! - [`screen`] / [`transitions`] - UI screens and the typed transition graph
//! - [`vision`] - Screen identification from pixel probes
//! - [`match_setup`] - Tracks, game modes and difficulty tables
//! - [`map`] / [`placement`] - Validity rasters and the placement search
//! - [`data`] / [`roster`] - Unit catalog, placed units, upgrade legality
//! - [`valuation`] / [`decision`] - Coverage, DPS economics, action choice
//! - [`ledger`] - Optical vs. predicted money reconciliation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod data;
pub mod decision;
pub mod error;
pub mod ledger;
pub mod map;
pub mod match_setup;
pub mod math;
pub mod placement;
pub mod roster;
pub mod screen;
pub mod transitions;
pub mod unit_kind;
pub mod valuation;
pub mod vision;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{Footprint, UnitCatalog, UnitData, UpgradeData};
    pub use crate::decision::{
        apply_action, choose_best_action, DecisionContext, PlannedAction, ScoredAction,
    };
    pub use crate::error::{BotError, Result};
    pub use crate::ledger::MoneyLedger;
    pub use crate::map::{MapModel, PlacementMedium, Raster};
    pub use crate::match_setup::{Difficulty, GameMode, Track};
    pub use crate::math::{NormPos, NormRect};
    pub use crate::placement::{can_place_anywhere, find_best_placement, PlacementCandidate};
    pub use crate::roster::{PlacedUnit, Roster, UpgradePath, UpgradeTiers};
    pub use crate::screen::Screen;
    pub use crate::transitions::{Procedure, Transition, TransitionAction, TransitionGraph};
    pub use crate::unit_kind::UnitKind;
    pub use crate::valuation::Coverage;
}
