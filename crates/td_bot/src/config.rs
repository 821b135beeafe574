//! Autopilot configuration loaded from RON.
//!
//! Every field has a default, so a partial file is enough:
//!
//! ```ron
//! BotConfig(
//!     track: Some(MonkeyMeadow),
//!     game_mode: Some(EasyStandard),
//!     candidate_units: [DartMonkey, TackShooter, SniperMonkey],
//!     max_iterations: Some(500),
//! )
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use td_core::error::{BotError, Result};
use td_core::map::PIXELS_PER_UNIT;
use td_core::match_setup::{Difficulty, GameMode, Track};
use td_core::math::NormRect;
use td_core::placement::{PLACEMENT_STRIDE, PROBE_STRIDE};
use td_core::transitions::TransitionGraph;
use td_core::unit_kind::UnitKind;

use crate::money::MoneyConfig;
use crate::navigator::{MatchSelection, NavigatorConfig};
use crate::session::SessionConfig;

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

impl From<ConfigError> for BotError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::FileNotFound(path) => Self::ResourceNotFound(path),
            other => Self::DataParse {
                what: "config".into(),
                message: other.to_string(),
            },
        }
    }
}

/// Complete autopilot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Title of the game window.
    pub window_title: String,
    /// Money display region, normalized.
    pub money_region: NormRect,
    /// Money sampling interval.
    pub money_interval_ms: u64,
    /// Screen confirmation timeout.
    pub navigation_timeout_ms: u64,
    /// Pause between screen polls.
    pub poll_interval_ms: u64,
    /// Pause after each decision-loop iteration and between procedure clicks.
    pub action_pacing_ms: u64,
    /// Pause when nothing is affordable.
    pub idle_delay_ms: u64,
    /// Pause before re-checking a screen that is not in play.
    pub recheck_delay_ms: u64,
    /// Feasibility probe stride, in raster pixels.
    pub probe_stride: u32,
    /// Placement search stride, in raster pixels.
    pub placement_stride: u32,
    /// Game units to raster pixels.
    pub pixels_per_unit: f64,
    /// Units the planner may place.
    pub candidate_units: Vec<UnitKind>,
    /// Track to play.
    pub track: Option<Track>,
    /// Mode to play.
    pub game_mode: Option<GameMode>,
    /// Unit catalog RON file.
    pub catalog_path: PathBuf,
    /// Folder holding one asset folder per track.
    pub tracks_dir: PathBuf,
    /// Optional RON transition graph replacing the built-in one.
    pub graph_path: Option<PathBuf>,
    /// Stop after this many iterations.
    pub max_iterations: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        let money = MoneyConfig::default();
        Self {
            window_title: "BloonsTD6".into(),
            money_region: money.region,
            money_interval_ms: money.interval.as_millis() as u64,
            navigation_timeout_ms: 5000,
            poll_interval_ms: 100,
            action_pacing_ms: 250,
            idle_delay_ms: 1000,
            recheck_delay_ms: 1000,
            probe_stride: PROBE_STRIDE,
            placement_stride: PLACEMENT_STRIDE,
            pixels_per_unit: PIXELS_PER_UNIT,
            candidate_units: vec![
                UnitKind::DartMonkey,
                UnitKind::TackShooter,
                UnitKind::BombShooter,
                UnitKind::SniperMonkey,
                UnitKind::NinjaMonkey,
            ],
            track: None,
            game_mode: None,
            catalog_path: PathBuf::from("data/units.ron"),
            tracks_dir: PathBuf::from("data/tracks"),
            graph_path: None,
            max_iterations: None,
        }
    }
}

impl BotConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron)?;
        Ok(config)
    }

    /// Track and mode for match entry.
    #[must_use]
    pub const fn match_selection(&self) -> MatchSelection {
        MatchSelection {
            track: self.track,
            game_mode: self.game_mode,
        }
    }

    /// Price tier implied by the game mode.
    ///
    /// # Errors
    ///
    /// [`BotError::MissingContext`] without a game mode.
    pub fn difficulty(&self) -> Result<Difficulty> {
        self.game_mode
            .ok_or_else(|| BotError::MissingContext("no game mode configured".into()))?
            .cost_tier()
    }

    /// Navigator timing.
    #[must_use]
    pub const fn navigator_config(&self) -> NavigatorConfig {
        NavigatorConfig {
            timeout: Duration::from_millis(self.navigation_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            step_delay: Duration::from_millis(self.action_pacing_ms),
        }
    }

    /// Money sampling settings.
    #[must_use]
    pub const fn money_config(&self) -> MoneyConfig {
        MoneyConfig {
            region: self.money_region,
            interval: Duration::from_millis(self.money_interval_ms),
        }
    }

    /// Decision loop settings.
    ///
    /// # Errors
    ///
    /// See [`BotConfig::difficulty`].
    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig {
            candidate_units: self.candidate_units.clone(),
            difficulty: self.difficulty()?,
            probe_stride: self.probe_stride,
            placement_stride: self.placement_stride,
            action_pacing: Duration::from_millis(self.action_pacing_ms),
            idle_delay: Duration::from_millis(self.idle_delay_ms),
            recheck_delay: Duration::from_millis(self.recheck_delay_ms),
            max_iterations: self.max_iterations,
            money: self.money_config(),
        })
    }

    /// The configured transition graph, or the built-in one.
    ///
    /// # Errors
    ///
    /// [`BotError::ResourceNotFound`] for a missing graph file,
    /// [`BotError::DataParse`] for a malformed one.
    pub fn transition_graph(&self) -> Result<TransitionGraph> {
        match &self.graph_path {
            None => Ok(TransitionGraph::standard()),
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .map_err(|_| BotError::ResourceNotFound(path.display().to_string()))?;
                TransitionGraph::from_ron(&source)
            }
        }
    }
}
