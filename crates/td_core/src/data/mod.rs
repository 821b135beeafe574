//! Static unit and upgrade tables.
//!
//! This module contains pure data structures describing what each unit costs,
//! how far it reaches, what it occupies and what each upgrade tier changes.
//! All structs are designed to be deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `td_bot`.

mod catalog;
mod unit_data;
mod upgrade_data;

pub use catalog::UnitCatalog;
pub use unit_data::{Footprint, UnitData};
pub use upgrade_data::UpgradeData;
