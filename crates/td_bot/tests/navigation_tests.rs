//! Screen navigation against a scripted game.
//!
//! The fake game reacts to clicks and keys the way the real menus do, so
//! these tests drive full routes including the map picker procedures.

use std::sync::Arc;

use td_bot::navigator::{MatchSelection, NavigationOutcome};
use td_core::error::BotError;
use td_core::match_setup::{Difficulty, GameMode, Track};
use td_core::screen::Screen;
use td_test_utils::fakes::{fake_navigator, EnteredMatch, FakeGame};

fn select(track: Track, mode: GameMode) -> MatchSelection {
    MatchSelection {
        track: Some(track),
        game_mode: Some(mode),
    }
}

// =============================================================================
// Plain edges
// =============================================================================

mod edges {
    use super::*;

    #[test]
    fn test_click_edge_confirmed() {
        let game = FakeGame::shared(Screen::MainMenu);
        let mut navigator = fake_navigator(&game);

        let outcome = navigator.navigate_to(Screen::MapSelect).unwrap();

        assert_eq!(
            outcome,
            NavigationOutcome::Arrived {
                path: vec![Screen::MainMenu, Screen::MapSelect]
            }
        );
        assert_eq!(game.screen(), Screen::MapSelect);
        assert_eq!(game.clicks().len(), 1);
    }

    #[test]
    fn test_already_there_sends_nothing() {
        let game = FakeGame::shared(Screen::MainMenu);
        let mut navigator = fake_navigator(&game);

        let outcome = navigator.navigate_to(Screen::MainMenu).unwrap();

        assert_eq!(outcome, NavigationOutcome::AlreadyThere(Screen::MainMenu));
        assert!(outcome.reached());
        assert!(game.inputs().is_empty());
    }

    #[test]
    fn test_key_then_click_route() {
        let game = FakeGame::shared(Screen::InGame);
        let mut navigator = fake_navigator(&game);

        let outcome = navigator.navigate_to(Screen::MainMenu).unwrap();

        assert_eq!(
            outcome,
            NavigationOutcome::Arrived {
                path: vec![Screen::InGame, Screen::PauseMenu, Screen::MainMenu]
            }
        );
        assert_eq!(game.screen(), Screen::MainMenu);
    }

    #[test]
    fn test_current_screen_identified() {
        let game = FakeGame::shared(Screen::PauseMenu);
        let navigator = fake_navigator(&game);
        assert_eq!(navigator.current_screen().unwrap(), Some(Screen::PauseMenu));

        game.set_screen(Screen::GameOverRewards);
        assert_eq!(
            navigator.current_screen().unwrap(),
            Some(Screen::GameOverRewards)
        );
    }
}

// =============================================================================
// Failures
// =============================================================================

mod failures {
    use super::*;

    #[test]
    fn test_frozen_game_times_out() {
        let game = FakeGame::shared(Screen::MainMenu);
        game.freeze(true);
        let mut navigator = fake_navigator(&game);

        let outcome = navigator.navigate_to(Screen::InGame).unwrap();

        assert_eq!(
            outcome,
            NavigationOutcome::TimedOut {
                expected: Screen::MapSelect,
                observed: Some(Screen::MainMenu),
            }
        );
        assert!(!outcome.reached());
        // The route is abandoned after the first unconfirmed step.
        assert_eq!(game.clicks().len(), 1);
    }

    #[test]
    fn test_unrecognized_start_times_out() {
        let game = FakeGame::shared(Screen::MainMenu);
        game.blank(true);
        let mut navigator = fake_navigator(&game);

        let outcome = navigator.navigate_to(Screen::InGame).unwrap();

        assert_eq!(
            outcome,
            NavigationOutcome::TimedOut {
                expected: Screen::InGame,
                observed: None,
            }
        );
        assert!(game.inputs().is_empty());
    }

    #[test]
    fn test_no_route_is_unreachable() {
        let game = FakeGame::shared(Screen::MainMenu);
        let mut navigator = fake_navigator(&game);

        let err = navigator.navigate_to(Screen::GameOverSummary).unwrap_err();

        assert!(matches!(
            err,
            BotError::NavigationUnreachable {
                from: Screen::MainMenu,
                to: Screen::GameOverSummary,
            }
        ));
    }

    #[test]
    fn test_lost_window_propagates() {
        let game = FakeGame::shared(Screen::MainMenu);
        game.lose_window();
        let mut navigator = fake_navigator(&game);

        let err = navigator.navigate_to(Screen::MapSelect).unwrap_err();

        assert!(matches!(err, BotError::WindowLost));
        assert!(err.is_fatal());
    }
}

// =============================================================================
// Match entry procedures
// =============================================================================

mod match_entry {
    use super::*;

    #[test]
    fn test_enter_match_pages_back() {
        let game = FakeGame::shared(Screen::MapSelect);
        game.set_page(3);
        let mut navigator = fake_navigator(&game);
        navigator.select_match(select(Track::MonkeyMeadow, GameMode::MediumStandard));

        let outcome = navigator.navigate_to(Screen::InGame).unwrap();

        assert_eq!(
            outcome,
            NavigationOutcome::Arrived {
                path: vec![Screen::MapSelect, Screen::InGame]
            }
        );
        assert_eq!(
            game.entered(),
            Some(EnteredMatch {
                page: 0,
                slot: 0,
                difficulty: Difficulty::Medium,
                mode: GameMode::MediumStandard,
            })
        );
        // Three arrows, thumbnail, difficulty, mode.
        assert_eq!(game.clicks().len(), 6);
    }

    #[test]
    fn test_enter_match_pages_forward() {
        let game = FakeGame::shared(Screen::MapSelect);
        let mut navigator = fake_navigator(&game);
        navigator.select_match(select(Track::Logs, GameMode::Chimps));

        navigator.navigate_to(Screen::InGame).unwrap();

        let entered = game.entered().unwrap();
        assert_eq!((entered.page, entered.slot), (4, 0));
        assert_eq!(entered.difficulty, Difficulty::Hard);
        assert_eq!(entered.mode, GameMode::Chimps);
        assert_eq!(game.screen(), Screen::InGame);
    }

    #[test]
    fn test_unreadable_page_jumps_to_category() {
        let game = FakeGame::shared(Screen::MapSelect);
        game.set_page(7);
        game.hide_page_dot(true);
        let mut navigator = fake_navigator(&game);
        navigator.select_match(select(Track::Logs, GameMode::EasyStandard));

        let outcome = navigator.navigate_to(Screen::InGame).unwrap();

        assert!(outcome.reached());
        let entered = game.entered().unwrap();
        assert_eq!((entered.page, entered.slot), (4, 0));
        // Category, four arrows, thumbnail, difficulty, mode.
        assert_eq!(game.clicks().len(), 8);
    }

    #[test]
    fn test_full_route_from_main_menu() {
        let game = FakeGame::shared(Screen::MainMenu);
        let mut navigator = fake_navigator(&game);
        navigator.select_match(select(Track::DarkCastle, GameMode::HardStandard));

        let outcome = navigator.navigate_to(Screen::InGame).unwrap();

        assert_eq!(
            outcome,
            NavigationOutcome::Arrived {
                path: vec![Screen::MainMenu, Screen::MapSelect, Screen::InGame]
            }
        );
        let entered = game.entered().unwrap();
        assert_eq!((entered.page, entered.slot), (14, 3));
        assert_eq!(entered.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_sandbox_route() {
        let game = FakeGame::shared(Screen::MapSelect);
        let mut navigator = fake_navigator(&game);
        navigator.select_match(select(Track::MonkeyMeadow, GameMode::EasySandbox));

        let outcome = navigator.navigate_to(Screen::SandboxBloons).unwrap();

        assert_eq!(
            outcome,
            NavigationOutcome::Arrived {
                path: vec![
                    Screen::MapSelect,
                    Screen::SandboxStartPopup,
                    Screen::SandboxBloons
                ]
            }
        );
        assert_eq!(game.entered().unwrap().mode, GameMode::EasySandbox);
    }

    #[test]
    fn test_missing_selection_is_missing_context() {
        let game = FakeGame::shared(Screen::MapSelect);
        let mut navigator = fake_navigator(&game);

        let err = navigator.navigate_to(Screen::InGame).unwrap_err();

        assert!(matches!(err, BotError::MissingContext(_)));
        assert!(game.inputs().is_empty());
    }

    #[test]
    fn test_sandbox_mode_rejected_for_standard_entry() {
        let game = FakeGame::shared(Screen::MapSelect);
        let mut navigator = fake_navigator(&game);
        navigator.select_match(select(Track::MonkeyMeadow, GameMode::MediumSandbox));

        let err = navigator.navigate_to(Screen::InGame).unwrap_err();

        assert!(matches!(err, BotError::MissingContext(_)));
        assert!(game.entered().is_none());
    }

    #[test]
    fn test_frozen_picker_times_out_on_map_select() {
        let game = FakeGame::shared(Screen::MapSelect);
        game.freeze(true);
        let mut navigator = fake_navigator(&game);
        navigator.select_match(select(Track::MonkeyMeadow, GameMode::EasyStandard));

        let outcome = navigator.navigate_to(Screen::InGame).unwrap();

        assert_eq!(
            outcome,
            NavigationOutcome::TimedOut {
                expected: Screen::InGame,
                observed: Some(Screen::MapSelect),
            }
        );
        // Thumbnail, difficulty, mode. No retries.
        assert_eq!(game.clicks().len(), 3);
        assert!(game.entered().is_none());
    }

    #[test]
    fn test_selection_is_kept() {
        let game = Arc::new(FakeGame::new(Screen::MapSelect));
        let mut navigator = fake_navigator(&game);
        let selection = select(Track::Quad, GameMode::Impoppable);
        navigator.select_match(selection);
        assert_eq!(navigator.selection(), selection);
    }
}
