//! Loading track folders, catalogs, snapshots and configs from disk.

use std::fs;
use std::path::Path;

use image::{GrayImage, Luma};
use tempfile::TempDir;

use td_bot::assets::{
    load_catalog, load_flow_points, load_mask, load_snapshot, load_track_assets, track_dir,
    AssetError, FLOW_POINTS, LAND_MASK, TRACK_MASK, WATER_MASK,
};
use td_bot::config::BotConfig;
use td_core::error::BotError;
use td_core::map::PlacementMedium;
use td_core::match_setup::Track;
use td_core::placement::find_best_placement;
use td_core::roster::Roster;
use td_core::unit_kind::UnitKind;
use td_test_utils::fixtures::SAMPLE_CATALOG_RON;

fn write_mask(path: &Path, width: u32, height: u32, set: impl Fn(u32, u32) -> bool) {
    let image = GrayImage::from_fn(width, height, |x, y| {
        if set(x, y) {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    image.save(path).unwrap();
}

/// A 60x40 track folder: track on rows 18..=22, land elsewhere, no water.
fn write_track(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    write_mask(&dir.join(LAND_MASK), 60, 40, |_, y| !(18..=22).contains(&y));
    write_mask(&dir.join(WATER_MASK), 60, 40, |_, _| false);
    write_mask(&dir.join(TRACK_MASK), 60, 40, |_, y| (18..=22).contains(&y));
    fs::write(
        dir.join(FLOW_POINTS),
        r#"{"flow_points": [[0, 20], [15, 20], [30, 20], [45, 20], [59, 20]]}"#,
    )
    .unwrap();
}

// =============================================================================
// Track folders
// =============================================================================

#[test]
fn test_load_track_folder() {
    let tmp = TempDir::new().unwrap();
    write_track(tmp.path());

    let map = load_track_assets(tmp.path()).unwrap();

    assert_eq!((map.width(), map.height()), (60, 40));
    assert_eq!(map.flow_points().len(), 5);
    assert!(map.validity(PlacementMedium::Land).get(0, 0));
    assert!(!map.validity(PlacementMedium::Land).get(0, 20));
    assert!(map.track().get(10, 20));
    assert_eq!(map.validity(PlacementMedium::Water).count_set(), 0);
}

#[test]
fn test_mask_threshold() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("mask.png");
    let image = GrayImage::from_fn(3, 1, |x, _| Luma([[127, 128, 255][x as usize]]));
    image.save(&path).unwrap();

    let raster = load_mask(&path).unwrap();

    assert!(!raster.get(0, 0));
    assert!(raster.get(1, 0));
    assert!(raster.get(2, 0));
}

#[test]
fn test_missing_mask_is_resource_not_found() {
    let tmp = TempDir::new().unwrap();
    write_track(tmp.path());
    fs::remove_file(tmp.path().join(TRACK_MASK)).unwrap();

    let err = load_track_assets(tmp.path()).unwrap_err();

    assert!(matches!(err, AssetError::FileNotFound(_)));
    let err = BotError::from(err);
    assert!(matches!(err, BotError::ResourceNotFound(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_empty_flow_points_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(FLOW_POINTS);
    fs::write(&path, r#"{"flow_points": []}"#).unwrap();

    let err = load_flow_points(&path).unwrap_err();

    assert!(matches!(err, AssetError::Invalid { .. }));
}

#[test]
fn test_mismatched_masks_rejected() {
    let tmp = TempDir::new().unwrap();
    write_track(tmp.path());
    write_mask(&tmp.path().join(TRACK_MASK), 30, 40, |_, _| false);

    let err = load_track_assets(tmp.path()).unwrap_err();

    assert!(matches!(err, AssetError::Invalid { .. }));
}

#[test]
fn test_loaded_track_supports_placement() {
    let tmp = TempDir::new().unwrap();
    write_track(tmp.path());
    fs::write(tmp.path().join("units.ron"), SAMPLE_CATALOG_RON).unwrap();

    let map = load_track_assets(tmp.path()).unwrap().with_pixel_scale(1.0);
    let catalog = load_catalog(tmp.path().join("units.ron")).unwrap();
    let best = find_best_placement(&map, catalog.get(UnitKind::DartMonkey).unwrap(), 2).unwrap();

    assert!(best.score > 0);
    assert!(!(18..=22).contains(&best.pixel.1));
}

// =============================================================================
// Catalog, snapshot, config
// =============================================================================

#[test]
fn test_load_catalog() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("units.ron");
    fs::write(&path, SAMPLE_CATALOG_RON).unwrap();

    let catalog = load_catalog(&path).unwrap();

    assert_eq!(catalog.units.len(), 6);
    assert!(catalog.get(UnitKind::NinjaMonkey).unwrap().sees_camo);
    assert_eq!(
        catalog.get(UnitKind::MonkeySub).unwrap().medium,
        PlacementMedium::Water
    );
}

#[test]
fn test_duplicate_catalog_entries_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("units.ron");
    let dart = "(kind: DartMonkey, costs: (1, 1, 1, 1), range: 10.0, \
                footprint: Circle(radius: 1.0), damage: 1.0, cooldown: 1.0)";
    fs::write(&path, format!("(units: [{dart}, {dart}])")).unwrap();

    let err = load_catalog(&path).unwrap_err();

    assert!(matches!(err, AssetError::Invalid { .. }));
}

#[test]
fn test_malformed_catalog_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("units.ron");
    fs::write(&path, "(units: [(kind: NotAMonkey)])").unwrap();

    let err = load_catalog(&path).unwrap_err();

    assert!(matches!(err, AssetError::Invalid { .. }));
    assert!(err.to_string().contains("units.ron"));
}

#[test]
fn test_missing_catalog() {
    let err = load_catalog("/definitely/not/here/units.ron").unwrap_err();
    assert!(matches!(
        BotError::from(err),
        BotError::ResourceNotFound(_)
    ));
}

#[test]
fn test_load_snapshot() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("snapshot.ron");
    fs::write(
        &path,
        "(money: 650, units: [(id: 3, kind: DartMonkey, position: (x: 0.42, y: 0.31), tiers: ((1, 0, 2)))])",
    )
    .unwrap();

    let snapshot = load_snapshot(&path).unwrap();

    assert_eq!(snapshot.money, 650);
    let roster = Roster::from_units(snapshot.units);
    assert_eq!(roster.get(3).unwrap().tiers.to_string(), "1-0-2");
    assert_eq!(roster.distinct_kinds(), 1);
}

#[test]
fn test_config_points_at_track_folder() {
    let tmp = TempDir::new().unwrap();
    let tracks = tmp.path().join("tracks");
    write_track(&track_dir(&tracks, Track::MonkeyMeadow));
    let config_path = tmp.path().join("bot.ron");
    fs::write(
        &config_path,
        format!(
            "BotConfig(track: Some(MonkeyMeadow), game_mode: Some(EasyStandard), tracks_dir: {:?})",
            tracks.display().to_string()
        ),
    )
    .unwrap();

    let config = BotConfig::load(&config_path).unwrap();
    let track = config.track.unwrap();
    let map = load_track_assets(track_dir(&config.tracks_dir, track)).unwrap();

    assert_eq!(map.width(), 60);
    assert!(track_dir(&tracks, track).ends_with("monkey_meadow"));
}
