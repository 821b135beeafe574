//! Match setup tables: tracks, map picker layout, difficulties and game modes.
//!
//! Difficulty is never chosen directly. It follows from the game mode via
//! the mode membership table, which also lists where each mode's button sits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::math::NormPos;

/// Number of pages in the map picker.
pub const MAP_PAGES: usize = 15;

/// Thumbnails per map picker page.
pub const THUMBNAILS_PER_PAGE: usize = 6;

/// Thumbnail positions on a page, row-major.
pub const THUMBNAIL_POSITIONS: [(f64, f64); THUMBNAILS_PER_PAGE] = [
    (0.280, 0.240),
    (0.505, 0.240),
    (0.730, 0.240),
    (0.280, 0.533),
    (0.505, 0.533),
    (0.730, 0.533),
];

/// Arrow that moves one page forward.
pub const NEXT_PAGE_ARROW: NormPos = NormPos::new(0.856, 0.400);

/// Arrow that moves one page back.
pub const PREV_PAGE_ARROW: NormPos = NormPos::new(0.144, 0.400);

/// Price tier. Also the index into per-difficulty cost tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    /// Cheapest prices.
    Easy,
    /// Standard prices.
    Medium,
    /// Raised prices.
    Hard,
    /// Highest prices; has no selector button of its own.
    Impoppable,
}

impl Difficulty {
    /// Index into `[u32; 4]` cost tables.
    #[must_use]
    pub const fn cost_index(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
            Self::Impoppable => 3,
        }
    }

    /// Selector button in the difficulty dialog.
    #[must_use]
    pub const fn button(self) -> Option<NormPos> {
        match self {
            Self::Easy => Some(NormPos::new(0.327, 0.375)),
            Self::Medium => Some(NormPos::new(0.504, 0.375)),
            Self::Hard => Some(NormPos::new(0.673, 0.375)),
            Self::Impoppable => None,
        }
    }
}

/// Game mode selectable after a difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Easy standard game.
    EasyStandard,
    /// Easy, primary units only.
    PrimaryOnly,
    /// Easy, fixed starting cash and no income.
    Deflation,
    /// Easy sandbox.
    EasySandbox,
    /// Medium standard game.
    MediumStandard,
    /// Medium, military units only.
    MilitaryOnly,
    /// Medium, rounds play back to back.
    Apopalypse,
    /// Medium, enemies travel the track backwards.
    Reverse,
    /// Medium sandbox.
    MediumSandbox,
    /// Hard sandbox.
    HardSandbox,
    /// Hard standard game.
    HardStandard,
    /// Hard, magic units only.
    MagicMonkeysOnly,
    /// Hard, blimps have double health.
    DoubleHpMoabs,
    /// Hard, half income.
    HalfCash,
    /// Hard, alternate round set.
    AlternateBloonsRounds,
    /// Impoppable prices and lives.
    Impoppable,
    /// Impoppable with no income, lives, powers or selling.
    Chimps,
}

/// Which modes belong to which difficulty, and where their buttons are.
const MODE_MEMBERSHIP: [(Difficulty, &[(GameMode, (f64, f64))]); 3] = [
    (
        Difficulty::Easy,
        &[
            (GameMode::EasyStandard, (0.331, 0.552)),
            (GameMode::PrimaryOnly, (0.499, 0.425)),
            (GameMode::Deflation, (0.672, 0.423)),
            (GameMode::EasySandbox, (0.503, 0.692)),
        ],
    ),
    (
        Difficulty::Medium,
        &[
            (GameMode::MediumStandard, (0.331, 0.552)),
            (GameMode::MilitaryOnly, (0.503, 0.422)),
            (GameMode::Apopalypse, (0.672, 0.419)),
            (GameMode::Reverse, (0.501, 0.693)),
            (GameMode::MediumSandbox, (0.674, 0.685)),
        ],
    ),
    (
        Difficulty::Hard,
        &[
            (GameMode::HardStandard, (0.331, 0.556)),
            (GameMode::HardSandbox, (0.160, 0.544)),
            (GameMode::MagicMonkeysOnly, (0.498, 0.418)),
            (GameMode::DoubleHpMoabs, (0.665, 0.417)),
            (GameMode::HalfCash, (0.836, 0.413)),
            (GameMode::AlternateBloonsRounds, (0.499, 0.688)),
            (GameMode::Impoppable, (0.668, 0.688)),
            (GameMode::Chimps, (0.838, 0.684)),
        ],
    ),
];

impl GameMode {
    /// Every mode.
    pub const ALL: [Self; 17] = [
        Self::EasyStandard,
        Self::PrimaryOnly,
        Self::Deflation,
        Self::EasySandbox,
        Self::MediumStandard,
        Self::MilitaryOnly,
        Self::Apopalypse,
        Self::Reverse,
        Self::MediumSandbox,
        Self::HardSandbox,
        Self::HardStandard,
        Self::MagicMonkeysOnly,
        Self::DoubleHpMoabs,
        Self::HalfCash,
        Self::AlternateBloonsRounds,
        Self::Impoppable,
        Self::Chimps,
    ];

    /// Display name as shown in the game.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EasyStandard => "Easy Standard",
            Self::PrimaryOnly => "Primary Only",
            Self::Deflation => "Deflation",
            Self::EasySandbox => "Easy Sandbox",
            Self::MediumStandard => "Medium Standard",
            Self::MilitaryOnly => "Military Only",
            Self::Apopalypse => "Apopalypse",
            Self::Reverse => "Reverse",
            Self::MediumSandbox => "Medium Sandbox",
            Self::HardSandbox => "Hard Sandbox",
            Self::HardStandard => "Hard Standard",
            Self::MagicMonkeysOnly => "Magic Monkeys Only",
            Self::DoubleHpMoabs => "Double HP MOABs",
            Self::HalfCash => "Half Cash",
            Self::AlternateBloonsRounds => "Alternate Bloons Rounds",
            Self::Impoppable => "Impoppable",
            Self::Chimps => "CHIMPS",
        }
    }

    /// The difficulty this mode is listed under, with the mode's button.
    fn membership(self) -> Option<(Difficulty, NormPos)> {
        MODE_MEMBERSHIP.iter().find_map(|(difficulty, modes)| {
            modes
                .iter()
                .find(|(mode, _)| *mode == self)
                .map(|&(_, (x, y))| (*difficulty, NormPos::new(x, y)))
        })
    }

    /// Difficulty selected before this mode.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::UnmappedGameMode`] if the mode has no membership.
    pub fn difficulty(self) -> Result<Difficulty> {
        self.membership()
            .map(|(difficulty, _)| difficulty)
            .ok_or_else(|| BotError::UnmappedGameMode(self.name().into()))
    }

    /// Mode button in the mode dialog.
    pub fn button(self) -> Result<NormPos> {
        self.membership()
            .map(|(_, pos)| pos)
            .ok_or_else(|| BotError::UnmappedGameMode(self.name().into()))
    }

    /// Price tier while playing this mode.
    pub fn cost_tier(self) -> Result<Difficulty> {
        match self {
            Self::Impoppable | Self::Chimps => Ok(Difficulty::Impoppable),
            _ => self.difficulty(),
        }
    }

    /// Sandbox modes open a start popup instead of the match.
    #[must_use]
    pub const fn is_sandbox(self) -> bool {
        matches!(
            self,
            Self::EasySandbox | Self::MediumSandbox | Self::HardSandbox
        )
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameMode {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| {
                mode.name().eq_ignore_ascii_case(wanted)
                    || format!("{mode:?}").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| BotError::UnmappedGameMode(wanted.into()))
    }
}

/// Map category tab at the bottom of the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapCategory {
    /// Pages 0 to 4.
    Beginner,
    /// Pages 5 to 8.
    Intermediate,
    /// Pages 9 to 12.
    Advanced,
    /// Pages 13 and 14.
    Expert,
}

impl MapCategory {
    /// Category of a picker page.
    #[must_use]
    pub const fn of_page(page: usize) -> Self {
        match page {
            0..=4 => Self::Beginner,
            5..=8 => Self::Intermediate,
            9..=12 => Self::Advanced,
            _ => Self::Expert,
        }
    }

    /// Page the picker shows after clicking this category.
    #[must_use]
    pub const fn first_page(self) -> usize {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 5,
            Self::Advanced => 9,
            Self::Expert => 13,
        }
    }

    /// Category button position.
    #[must_use]
    pub const fn button(self) -> NormPos {
        match self {
            Self::Beginner => NormPos::new(0.303, 0.906),
            Self::Intermediate => NormPos::new(0.435, 0.906),
            Self::Advanced => NormPos::new(0.566, 0.906),
            Self::Expert => NormPos::new(0.697, 0.906),
        }
    }
}

/// Where a track's thumbnail lives in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Zero-based page.
    pub page: usize,
    /// Zero-based slot on the page, row-major.
    pub slot: usize,
}

impl Thumbnail {
    /// Click position of the thumbnail.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::IndexOutOfRange`] if the page or slot exceeds the grid.
    pub fn position(self) -> Result<NormPos> {
        if self.page >= MAP_PAGES {
            return Err(BotError::IndexOutOfRange {
                what: "map page",
                index: self.page,
                limit: MAP_PAGES,
            });
        }
        THUMBNAIL_POSITIONS
            .get(self.slot)
            .map(|&(x, y)| NormPos::new(x, y))
            .ok_or(BotError::IndexOutOfRange {
                what: "thumbnail slot",
                index: self.slot,
                limit: THUMBNAILS_PER_PAGE,
            })
    }
}

/// Signed number of page steps from `current` to `target`.
#[must_use]
pub fn page_distance(current: usize, target: usize) -> i64 {
    target as i64 - current as i64
}

macro_rules! tracks {
    ($($variant:ident => ($name:literal, $page:literal, $slot:literal)),* $(,)?) => {
        /// A playable track.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Track {
            $(
                #[doc = $name]
                $variant,
            )*
        }

        impl Track {
            /// Every track.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Display name as shown in the game.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Picker location of the track's thumbnail.
            #[must_use]
            pub const fn thumbnail(self) -> Thumbnail {
                match self {
                    $(Self::$variant => Thumbnail { page: $page, slot: $slot },)*
                }
            }
        }
    };
}

tracks! {
    // Beginner
    MonkeyMeadow => ("Monkey Meadow", 0, 0),
    InTheLoop => ("In The Loop", 0, 1),
    ThreeMinesRound => ("Three Mines Round", 0, 2),
    SpaPits => ("Spa Pits", 0, 3),
    Tinkerton => ("Tinkerton", 0, 4),
    TreeStump => ("Tree Stump", 0, 5),
    TownCenter => ("Town Center", 1, 0),
    MiddleOfTheRoad => ("Middle of the Road", 1, 1),
    OneTwoTree => ("One Two Tree", 1, 2),
    Scrapyard => ("Scrapyard", 1, 3),
    TheCabin => ("The Cabin", 1, 4),
    Resort => ("Resort", 1, 5),
    Skates => ("Skates", 2, 0),
    LotusIsland => ("Lotus Island", 2, 1),
    CandyFalls => ("Candy Falls", 2, 2),
    WinterPark => ("Winter Park", 2, 3),
    Carved => ("Carved", 2, 4),
    ParkPath => ("Park Path", 2, 5),
    AlpineRun => ("Alpine Run", 3, 0),
    FrozenOver => ("Frozen Over", 3, 1),
    Cubism => ("Cubism", 3, 2),
    FourCircles => ("Four Circles", 3, 3),
    Hedge => ("Hedge", 3, 4),
    EndOfTheRoad => ("End Of The Road", 3, 5),
    Logs => ("Logs", 4, 0),
    // Intermediate
    LostCrevasse => ("Lost Crevasse", 5, 0),
    LuminousCove => ("Luminous Cove", 5, 1),
    SulfurSprings => ("Sulfur Springs", 5, 2),
    WaterPark => ("Water Park", 5, 3),
    Polyphemus => ("Polyphemus", 5, 4),
    CoveredGarden => ("Covered Garden", 5, 5),
    Quarry => ("Quarry", 6, 0),
    QuietStreet => ("Quiet Street", 6, 1),
    BloonariusPrime => ("Bloonarius Prime", 6, 2),
    Balance => ("Balance", 6, 3),
    Encrypted => ("Encrypted", 6, 4),
    Bazaar => ("Bazaar", 6, 5),
    AdorasTemple => ("Adora's Temple", 7, 0),
    SpringSpring => ("Spring Spring", 7, 1),
    KartsNDarts => ("KartsNDarts", 7, 2),
    MoonLanding => ("Moon Landing", 7, 3),
    Haunted => ("Haunted", 7, 4),
    Downstream => ("Downstream", 7, 5),
    FiringRange => ("Firing Range", 8, 0),
    Cracked => ("Cracked", 8, 1),
    Streambed => ("Streambed", 8, 2),
    Chutes => ("Chutes", 8, 3),
    Rake => ("Rake", 8, 4),
    SpiceIslands => ("Spice Islands", 8, 5),
    // Advanced
    SunsetGulch => ("Sunset Gulch", 9, 0),
    EnchantedGlade => ("Enchanted Glade", 9, 1),
    LastResort => ("Last Resort", 9, 2),
    AncientPortal => ("Ancient Portal", 9, 3),
    CastleRevenge => ("Castle Revenge", 9, 4),
    DarkPath => ("Dark Path", 9, 5),
    Erosion => ("Erosion", 10, 0),
    MidnightMansion => ("Midnight Mansion", 10, 1),
    SunkenColumns => ("Sunken Columns", 10, 2),
    XFactor => ("X Factor", 10, 3),
    Mesa => ("Mesa", 10, 4),
    Geared => ("Geared", 10, 5),
    Spillway => ("Spillway", 11, 0),
    Cargo => ("Cargo", 11, 1),
    PatsPond => ("Pat's Pond", 11, 2),
    Peninsula => ("Peninsula", 11, 3),
    HighFinance => ("High Finance", 11, 4),
    AnotherBrick => ("Another Brick", 11, 5),
    OffTheCoast => ("Off The Coast", 12, 0),
    Cornfield => ("Cornfield", 12, 1),
    Underground => ("Underground", 12, 2),
    // Expert
    GlacialTrail => ("Glacial Trail", 13, 0),
    DarkDungeons => ("Dark Dungeons", 13, 1),
    Sanctuary => ("Sanctuary", 13, 2),
    Ravine => ("Ravine", 13, 3),
    FloodedValley => ("Flooded Valley", 13, 4),
    Infernal => ("Infernal", 13, 5),
    BloodyPuddles => ("Bloody Puddles", 14, 0),
    Workshop => ("Workshop", 14, 1),
    Quad => ("Quad", 14, 2),
    DarkCastle => ("Dark Castle", 14, 3),
    MuddyPuddles => ("Muddy Puddles", 14, 4),
    Ouch => ("Ouch", 14, 5),
}

impl Track {
    /// Folder name used for the track's assets, e.g. `monkey_meadow`.
    #[must_use]
    pub fn asset_dir_name(self) -> String {
        self.name()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
            .collect::<String>()
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Category tab containing the track.
    #[must_use]
    pub const fn category(self) -> MapCategory {
        MapCategory::of_page(self.thumbnail().page)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Track {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|track| {
                track.name().eq_ignore_ascii_case(wanted)
                    || format!("{track:?}").eq_ignore_ascii_case(wanted)
                    || track.asset_dir_name() == wanted
            })
            .ok_or_else(|| BotError::DataParse {
                what: "track name".into(),
                message: format!("unknown track '{wanted}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_mode_has_membership() {
        for mode in GameMode::ALL {
            assert!(mode.difficulty().is_ok(), "{mode} is unmapped");
            assert!(mode.button().unwrap().is_normalized());
        }
    }

    #[test]
    fn test_difficulty_derived_from_mode() {
        assert_eq!(GameMode::Deflation.difficulty().unwrap(), Difficulty::Easy);
        assert_eq!(GameMode::Reverse.difficulty().unwrap(), Difficulty::Medium);
        assert_eq!(GameMode::Chimps.difficulty().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn test_cost_tier() {
        assert_eq!(GameMode::Chimps.cost_tier().unwrap(), Difficulty::Impoppable);
        assert_eq!(GameMode::Impoppable.cost_tier().unwrap(), Difficulty::Impoppable);
        assert_eq!(GameMode::HalfCash.cost_tier().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(matches!(
            "Speedrun".parse::<GameMode>(),
            Err(BotError::UnmappedGameMode(name)) if name == "Speedrun"
        ));
        assert_eq!("chimps".parse::<GameMode>().unwrap(), GameMode::Chimps);
    }

    #[test]
    fn test_thumbnails_unique_and_in_grid() {
        let mut seen = HashSet::new();
        for &track in Track::ALL {
            let thumb = track.thumbnail();
            assert!(thumb.position().is_ok(), "{track} outside grid");
            assert!(seen.insert((thumb.page, thumb.slot)), "{track} shares a slot");
        }
        assert_eq!(Track::ALL.len(), 82);
    }

    #[test]
    fn test_thumbnail_out_of_range() {
        let bad_slot = Thumbnail { page: 0, slot: 6 };
        assert!(matches!(
            bad_slot.position(),
            Err(BotError::IndexOutOfRange {
                what: "thumbnail slot",
                index: 6,
                limit: 6
            })
        ));
        let bad_page = Thumbnail { page: 15, slot: 0 };
        assert!(bad_page.position().is_err());
    }

    #[test]
    fn test_page_distance_signed() {
        assert_eq!(page_distance(2, 7), 5);
        assert_eq!(page_distance(7, 2), -5);
        assert_eq!(page_distance(4, 4), 0);
    }

    #[test]
    fn test_categories() {
        assert_eq!(Track::MonkeyMeadow.category(), MapCategory::Beginner);
        assert_eq!(Track::Logs.category(), MapCategory::Beginner);
        assert_eq!(Track::SpiceIslands.category(), MapCategory::Intermediate);
        assert_eq!(Track::Underground.category(), MapCategory::Advanced);
        assert_eq!(Track::Ouch.category(), MapCategory::Expert);
    }

    #[test]
    fn test_asset_dir_name() {
        assert_eq!(Track::MonkeyMeadow.asset_dir_name(), "monkey_meadow");
        assert_eq!(Track::AdorasTemple.asset_dir_name(), "adoras_temple");
        assert_eq!("monkey_meadow".parse::<Track>().unwrap(), Track::MonkeyMeadow);
    }
}
