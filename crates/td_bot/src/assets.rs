//! Loading track assets, the unit catalog and planner snapshots from disk.
//!
//! A track folder holds three mask images and a flow-point file:
//!
//! ```text
//! data/tracks/monkey_meadow/
//!   land_placement_mask.png
//!   water_placement_mask.png
//!   track_mask.png
//!   path_points.json        {"flow_points": [[x, y], ...]}
//! ```
//!
//! Mask pixels brighter than 127 are set.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use td_core::data::UnitCatalog;
use td_core::error::BotError;
use td_core::map::{MapModel, Raster};
use td_core::match_setup::Track;
use td_core::roster::PlacedUnit;

/// Land validity mask file name.
pub const LAND_MASK: &str = "land_placement_mask.png";
/// Water validity mask file name.
pub const WATER_MASK: &str = "water_placement_mask.png";
/// Track area mask file name.
pub const TRACK_MASK: &str = "track_mask.png";
/// Flow point file name.
pub const FLOW_POINTS: &str = "path_points.json";

const MASK_THRESHOLD: u8 = 127;

/// Error type for asset loading.
#[derive(Error, Debug)]
pub enum AssetError {
    /// File not found.
    #[error("Asset not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read asset: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to decode an image.
    #[error("Failed to decode image: {0}")]
    ImageError(#[from] image::ImageError),
    /// Failed to parse JSON.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Failed to parse RON.
    #[error("Failed to parse RON: {0}")]
    RonError(#[from] ron::error::SpannedError),
    /// Parsed but unusable content.
    #[error("Invalid asset '{path}': {message}")]
    Invalid {
        /// Offending file or folder.
        path: String,
        /// What is wrong with it.
        message: String,
    },
}

impl From<AssetError> for BotError {
    fn from(e: AssetError) -> Self {
        match e {
            AssetError::FileNotFound(path) => Self::ResourceNotFound(path),
            AssetError::Invalid { path, message } => Self::DataParse {
                what: path,
                message,
            },
            other => Self::DataParse {
                what: "asset".into(),
                message: other.to_string(),
            },
        }
    }
}

fn require(path: &Path) -> Result<(), AssetError> {
    if path.exists() {
        Ok(())
    } else {
        Err(AssetError::FileNotFound(path.display().to_string()))
    }
}

/// Load a mask image as a raster.
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<Raster, AssetError> {
    let path = path.as_ref();
    require(path)?;
    let image = image::open(path)?.to_luma8();
    Ok(Raster::from_fn(image.width(), image.height(), |x, y| {
        image.get_pixel(x, y).0[0] > MASK_THRESHOLD
    }))
}

#[derive(Debug, Serialize, Deserialize)]
struct FlowPointsFile {
    #[serde(default)]
    flow_points: Vec<[f64; 2]>,
}

/// Load the ordered flow points of a track.
pub fn load_flow_points<P: AsRef<Path>>(path: P) -> Result<Vec<(f64, f64)>, AssetError> {
    let path = path.as_ref();
    require(path)?;
    let contents = std::fs::read_to_string(path)?;
    let file: FlowPointsFile = serde_json::from_str(&contents)?;
    if file.flow_points.is_empty() {
        return Err(AssetError::Invalid {
            path: path.display().to_string(),
            message: "no flow points".into(),
        });
    }
    Ok(file.flow_points.into_iter().map(|[x, y]| (x, y)).collect())
}

/// Asset folder of a track under `tracks_dir`.
#[must_use]
pub fn track_dir(tracks_dir: &Path, track: Track) -> PathBuf {
    tracks_dir.join(track.asset_dir_name())
}

/// Load a track folder into a map model.
pub fn load_track_assets<P: AsRef<Path>>(dir: P) -> Result<MapModel, AssetError> {
    let dir = dir.as_ref();
    let land = load_mask(dir.join(LAND_MASK))?;
    let water = load_mask(dir.join(WATER_MASK))?;
    let track = load_mask(dir.join(TRACK_MASK))?;
    let flow_points = load_flow_points(dir.join(FLOW_POINTS))?;

    let map = MapModel::new(land, water, track, flow_points).map_err(|e| AssetError::Invalid {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;
    info!(
        dir = %dir.display(),
        width = map.width(),
        height = map.height(),
        flow_points = map.flow_points().len(),
        "Track assets loaded"
    );
    Ok(map)
}

/// Load and validate a unit catalog RON file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<UnitCatalog, AssetError> {
    let path = path.as_ref();
    require(path)?;
    let contents = std::fs::read_to_string(path)?;
    UnitCatalog::from_ron_str(&contents).map_err(|e| AssetError::Invalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Game state captured for offline planning.
///
/// # Example RON
///
/// ```ron
/// Snapshot(
///     money: 650,
///     units: [
///         (id: 0, kind: DartMonkey, position: (x: 0.42, y: 0.31), tiers: ((1, 0, 2))),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Balance shown on screen.
    pub money: u32,
    /// Units already placed.
    #[serde(default)]
    pub units: Vec<PlacedUnit>,
}

/// Load a planner snapshot.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Snapshot, AssetError> {
    let path = path.as_ref();
    require(path)?;
    let contents = std::fs::read_to_string(path)?;
    Ok(ron::from_str(&contents)?)
}
