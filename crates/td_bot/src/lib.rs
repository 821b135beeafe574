//! # TD Bot
//!
//! Runtime around the decision core:
//!
//! - [`collaborators`] - traits for capture, OCR and input backends
//! - [`navigator`] - walks the screen graph and runs match-entry procedures
//! - [`money`] - background money sampling into a shared ledger
//! - [`session`] - the decision loop
//! - [`config`] / [`assets`] - RON configuration, masks, flow points, catalog
//!
//! Platform capture and input backends live outside this crate; anything
//! implementing [`ScreenCapture`], [`NumberReader`] and [`InputDriver`] can
//! drive a [`Session`].
//!
//! Logs go to stderr through `tracing`. The `td_bot` binary prints results
//! of its offline subcommands as JSON on stdout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod assets;
pub mod collaborators;
pub mod config;
pub mod money;
pub mod navigator;
pub mod session;

pub use assets::{load_catalog, load_track_assets, AssetError, Snapshot};
pub use collaborators::{Frame, InputDriver, NumberReader, ScreenCapture, ScreenPos, WindowGeometry};
pub use config::{BotConfig, ConfigError};
pub use money::{MoneyConfig, MoneySampler, SharedLedger};
pub use navigator::{Confirmation, MatchSelection, NavigationOutcome, Navigator, NavigatorConfig};
pub use session::{EndReason, Session, SessionConfig, SessionSummary, StepOutcome};
