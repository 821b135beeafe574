//! Error types for the decision core.

use thiserror::Error;

use crate::screen::Screen;

/// Result type alias using [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;

/// Top-level error type for all autopilot errors.
///
/// A transition that does not confirm in time is not an error: navigation
/// reports it through its outcome so the caller can react.
#[derive(Debug, Error)]
pub enum BotError {
    /// A level raster, descriptor or data table is missing.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Data file parsing error.
    #[error("Failed to parse '{what}': {message}")]
    DataParse {
        /// What was being parsed (file path or table name).
        what: String,
        /// Error message.
        message: String,
    },

    /// The transition graph has no route between two screens.
    #[error("No route from {from} to {to}")]
    NavigationUnreachable {
        /// Screen the search started from.
        from: Screen,
        /// Requested destination.
        to: Screen,
    },

    /// No accepted placement cell exists for the unit.
    #[error("No valid placement for {0}")]
    InvalidPlacement(String),

    /// The action costs more than the reported balance.
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Price of the action.
        required: u32,
        /// Balance reported by the ledger.
        available: u32,
    },

    /// Unknown path name, or a path-ordering rule forbids the upgrade.
    #[error("Invalid upgrade path: {0}")]
    InvalidUpgradePath(String),

    /// The unit kind has no entry in the catalog.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// The game mode is not part of the difficulty membership table.
    #[error("Game mode '{0}' has no difficulty mapping")]
    UnmappedGameMode(String),

    /// A custom transition needs state that was never selected.
    #[error("Missing context for transition: {0}")]
    MissingContext(String),

    /// A derived grid index lies outside the known grid.
    #[error("{what} index {index} exceeds grid size {limit}")]
    IndexOutOfRange {
        /// Which grid the index belongs to.
        what: &'static str,
        /// Offending index.
        index: usize,
        /// Number of cells known on that axis.
        limit: usize,
    },

    /// Map rasters are inconsistent.
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// The target window vanished or cannot report its geometry.
    #[error("Target window is not available")]
    WindowLost,

    /// A capture, OCR or input backend failed.
    #[error("Collaborator failure: {0}")]
    Collaborator(String),
}

impl BotError {
    /// Whether the error ends the session rather than skipping one action.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::WindowLost | Self::ResourceNotFound(_))
    }
}
