//! UI screens the autopilot can recognise and move between.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

/// A distinct UI state of the game window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Screen {
    /// Title screen with the play button.
    MainMenu,
    /// Paginated track picker (also hosts difficulty and mode dialogs).
    MapSelect,
    /// A standard match in progress.
    InGame,
    /// Pause overlay during a match.
    PauseMenu,
    /// Confirmation dialog for restarting a match.
    RestartPopup,
    /// Dialog shown before a sandbox match starts.
    SandboxStartPopup,
    /// Sandbox match with the enemy spawning panel open.
    SandboxBloons,
    /// Sandbox match with the unit panel open.
    SandboxMonkeys,
    /// First game-over panel.
    GameOverSummary,
    /// Second game-over panel with the home button.
    GameOverRewards,
}

impl Screen {
    /// Every screen, in identification order.
    pub const ALL: [Self; 10] = [
        Self::MainMenu,
        Self::MapSelect,
        Self::InGame,
        Self::PauseMenu,
        Self::RestartPopup,
        Self::SandboxStartPopup,
        Self::SandboxBloons,
        Self::SandboxMonkeys,
        Self::GameOverSummary,
        Self::GameOverRewards,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MainMenu => "Main Menu",
            Self::MapSelect => "Map Select",
            Self::InGame => "In Game",
            Self::PauseMenu => "Pause Menu",
            Self::RestartPopup => "Restart Popup",
            Self::SandboxStartPopup => "Sandbox Start Popup",
            Self::SandboxBloons => "In Game Sandbox (Bloon Screen)",
            Self::SandboxMonkeys => "In Game Sandbox (Monkey Screen)",
            Self::GameOverSummary => "Game Over Screen 1",
            Self::GameOverRewards => "Game Over Screen 2",
        }
    }

    /// True for screens where units can be placed and upgraded.
    #[must_use]
    pub const fn is_in_play(self) -> bool {
        matches!(
            self,
            Self::InGame | Self::SandboxBloons | Self::SandboxMonkeys
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Screen {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|screen| {
                screen.name().eq_ignore_ascii_case(wanted)
                    || format!("{screen:?}").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| BotError::DataParse {
                what: "screen name".into(),
                message: format!("unknown screen '{wanted}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_play_screens() {
        let in_play: Vec<Screen> = Screen::ALL.into_iter().filter(|s| s.is_in_play()).collect();
        assert_eq!(
            in_play,
            vec![Screen::InGame, Screen::SandboxBloons, Screen::SandboxMonkeys]
        );
    }

    #[test]
    fn test_parse_by_name_or_variant() {
        assert_eq!("Main Menu".parse::<Screen>().unwrap(), Screen::MainMenu);
        assert_eq!("ingame".parse::<Screen>().unwrap(), Screen::InGame);
        assert_eq!("mapselect".parse::<Screen>().unwrap(), Screen::MapSelect);
        assert!("Nowhere".parse::<Screen>().is_err());
    }
}
