//! Decision loop tests against a scripted game and OCR.

use std::sync::Arc;
use std::time::Duration;

use td_bot::money::MoneyConfig;
use td_bot::navigator::MatchSelection;
use td_bot::session::{EndReason, Session, SessionConfig, StepOutcome};
use td_core::data::UnitCatalog;
use td_core::decision::PlannedAction;
use td_core::error::BotError;
use td_core::match_setup::{Difficulty, GameMode, Track};
use td_core::math::NormPos;
use td_core::roster::{Roster, UpgradePath};
use td_core::screen::Screen;
use td_core::unit_kind::UnitKind;
use td_test_utils::fakes::{fake_navigator, FakeGame, ScriptedReader};
use td_test_utils::fixtures::{banded_map, sample_catalog};

type FakeSession = Session<FakeGame, ScriptedReader, FakeGame>;

fn session(
    game: &Arc<FakeGame>,
    reader: ScriptedReader,
    max_iterations: Option<u64>,
) -> FakeSession {
    let config = SessionConfig {
        candidate_units: vec![
            UnitKind::DartMonkey,
            UnitKind::TackShooter,
            UnitKind::SniperMonkey,
        ],
        difficulty: Difficulty::Medium,
        action_pacing: Duration::from_millis(1),
        idle_delay: Duration::from_millis(1),
        recheck_delay: Duration::from_millis(5),
        max_iterations,
        money: MoneyConfig {
            interval: Duration::from_millis(5),
            ..MoneyConfig::default()
        },
        ..SessionConfig::default()
    };
    Session::new(
        fake_navigator(game),
        Arc::new(reader),
        sample_catalog(),
        banded_map(),
        config,
    )
}

/// Everything the roster cost at medium prices.
fn spent(catalog: &UnitCatalog, roster: &Roster) -> u32 {
    roster
        .iter()
        .map(|unit| {
            let data = catalog.get(unit.kind).unwrap();
            let upgrades: u32 = UpgradePath::ALL
                .iter()
                .flat_map(|&path| data.upgrades_through(path, unit.tiers.get(path)))
                .map(|upgrade| upgrade.cost(Difficulty::Medium))
                .sum();
            data.cost(Difficulty::Medium) + upgrades
        })
        .sum()
}

fn tiers_bought(roster: &Roster) -> usize {
    roster
        .iter()
        .map(|unit| unit.tiers.0.iter().map(|&t| usize::from(t)).sum::<usize>())
        .sum()
}

// =============================================================================
// Full runs
// =============================================================================

mod runs {
    use super::*;

    #[test]
    fn test_spends_and_tracks_prediction() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::once(650), Some(5));

        let summary = session.run().unwrap();

        assert_eq!(summary.iterations, 5);
        assert_eq!(summary.ended_by, EndReason::IterationLimit);
        assert_eq!(summary.skipped, 0);
        assert!(summary.actions >= 1);
        assert_eq!(summary.actions + summary.idles, 5);

        let roster = session.roster();
        assert_eq!(game.placements().len(), roster.len());
        assert_eq!(game.upgrades().len(), tiers_bought(roster));
        assert_eq!(
            session.ledger().reported_balance(),
            650 - spent(&sample_catalog(), roster)
        );
    }

    #[test]
    fn test_placement_uses_unit_hotkey() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::once(650), Some(1));

        session.run().unwrap();

        let placed = &session.roster().units()[0];
        let (hotkey, position) = game.placements()[0].clone();
        assert_eq!(hotkey, placed.kind.hotkey());
        assert!(position.approx_eq(placed.position, 0.01));
        assert!(session.map().occupied().count_set() > 0);
    }

    #[test]
    fn test_game_over_ends_session() {
        let game = FakeGame::shared(Screen::InGame);
        game.end_game_after(1);
        let mut session = session(&game, ScriptedReader::once(2000), None);

        let summary = session.run().unwrap();

        assert_eq!(summary.actions, 1);
        assert_eq!(summary.iterations, 2);
        assert_eq!(
            summary.ended_by,
            EndReason::LeftPlay(Some(Screen::GameOverSummary))
        );
    }

    #[test]
    fn test_nothing_affordable_idles() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::fixed(0), Some(3));

        let summary = session.run().unwrap();

        assert_eq!(summary.idles, 3);
        assert_eq!(summary.actions, 0);
        assert!(game.inputs().is_empty());
    }

    #[test]
    fn test_failed_input_is_skipped() {
        let game = FakeGame::shared(Screen::InGame);
        game.fail_input(true);
        let mut session = session(&game, ScriptedReader::once(650), Some(3));

        let summary = session.run().unwrap();

        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.actions, 0);
        assert!(session.roster().is_empty());
        assert_eq!(session.ledger().reported_balance(), 650);
    }

    #[test]
    fn test_lost_window_is_fatal() {
        let game = FakeGame::shared(Screen::InGame);
        game.lose_window();
        let mut session = session(&game, ScriptedReader::fixed(650), None);

        let err = session.run().unwrap_err();

        assert!(matches!(err, BotError::WindowLost));
    }
}

// =============================================================================
// Single steps
// =============================================================================

mod steps {
    use super::*;

    #[test]
    fn test_step_places_first() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::unreadable(), None);
        session.ledger().reset_prediction(400);

        let outcome = session.step().unwrap();

        let StepOutcome::Acted(PlannedAction::Place { kind, cost, .. }) = outcome else {
            panic!("expected a placement, got {outcome:?}");
        };
        assert_eq!(session.roster().len(), 1);
        assert_eq!(session.roster().units()[0].kind, kind);
        assert_eq!(session.ledger().reported_balance(), 400 - cost);
    }

    #[test]
    fn test_unaffordable_action_sends_no_input() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::unreadable(), None);
        session.ledger().reset_prediction(100);

        let err = session
            .execute(&PlannedAction::Place {
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.5, 0.2),
                cost: 200,
            })
            .unwrap_err();

        assert!(matches!(
            err,
            BotError::InsufficientFunds {
                required: 200,
                available: 100
            }
        ));
        assert!(game.inputs().is_empty());
        assert!(session.roster().is_empty());
    }

    #[test]
    fn test_upgrade_of_unknown_unit_rejected() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::unreadable(), None);
        session.ledger().reset_prediction(1000);

        let err = session
            .execute(&PlannedAction::Upgrade {
                unit_id: 7,
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.5, 0.2),
                path: UpgradePath::Top,
                target_tier: 1,
                cost: 140,
            })
            .unwrap_err();

        assert!(matches!(err, BotError::InvalidUpgradePath(_)));
        assert!(game.inputs().is_empty());
        assert_eq!(session.ledger().reported_balance(), 1000);
    }

    #[test]
    fn test_upgrade_selects_buys_and_deselects() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::unreadable(), None);
        session.ledger().reset_prediction(1000);
        session
            .execute(&PlannedAction::Place {
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.3, 0.2),
                cost: 200,
            })
            .unwrap();

        session
            .execute(&PlannedAction::Upgrade {
                unit_id: 0,
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.3, 0.2),
                path: UpgradePath::Middle,
                target_tier: 1,
                cost: 100,
            })
            .unwrap();

        assert_eq!(game.upgrades(), vec![".".to_string()]);
        assert_eq!(game.screen(), Screen::InGame);
        assert_eq!(session.roster().get(0).unwrap().tiers.get(UpgradePath::Middle), 1);
        assert_eq!(session.ledger().reported_balance(), 700);
    }

    #[test]
    fn test_upgrade_recorded_when_deselect_fails() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::unreadable(), None);
        session.ledger().reset_prediction(1000);
        session
            .execute(&PlannedAction::Place {
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.3, 0.2),
                cost: 200,
            })
            .unwrap();
        game.reject_key("esc");

        session
            .execute(&PlannedAction::Upgrade {
                unit_id: 0,
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.3, 0.2),
                path: UpgradePath::Middle,
                target_tier: 1,
                cost: 100,
            })
            .unwrap();

        assert_eq!(game.upgrades(), vec![".".to_string()]);
        assert_eq!(session.roster().get(0).unwrap().tiers.get(UpgradePath::Middle), 1);
        assert_eq!(session.ledger().reported_balance(), 700);
    }

    #[test]
    fn test_failed_placement_click_cancels_hotkey() {
        let game = FakeGame::shared(Screen::InGame);
        game.fail_clicks(true);
        let mut session = session(&game, ScriptedReader::unreadable(), None);
        session.ledger().reset_prediction(1000);

        let err = session
            .execute(&PlannedAction::Place {
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.3, 0.2),
                cost: 200,
            })
            .unwrap_err();

        assert!(matches!(err, BotError::Collaborator(_)));
        assert_eq!(game.pending_unit(), None);
        assert_eq!(game.screen(), Screen::InGame);
        assert!(game.placements().is_empty());
        assert!(session.roster().is_empty());
        assert_eq!(session.ledger().reported_balance(), 1000);
    }

    #[test]
    fn test_failed_upgrade_key_deselects() {
        let game = FakeGame::shared(Screen::InGame);
        let mut session = session(&game, ScriptedReader::unreadable(), None);
        session.ledger().reset_prediction(1000);
        session
            .execute(&PlannedAction::Place {
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.3, 0.2),
                cost: 200,
            })
            .unwrap();
        game.reject_key(UpgradePath::Top.hotkey());

        let err = session
            .execute(&PlannedAction::Upgrade {
                unit_id: 0,
                kind: UnitKind::DartMonkey,
                position: NormPos::new(0.3, 0.2),
                path: UpgradePath::Top,
                target_tier: 1,
                cost: 100,
            })
            .unwrap_err();

        assert!(matches!(err, BotError::Collaborator(_)));
        assert!(!game.unit_selected());
        assert_eq!(session.roster().get(0).unwrap().tiers.get(UpgradePath::Top), 0);
        assert_eq!(session.ledger().reported_balance(), 800);
    }
}

// =============================================================================
// Match entry
// =============================================================================

mod entry {
    use super::*;

    #[test]
    fn test_enter_match_resets_level_state() {
        let game = FakeGame::shared(Screen::MainMenu);
        let mut session = session(&game, ScriptedReader::unreadable(), None);
        let selection = MatchSelection {
            track: Some(Track::MonkeyMeadow),
            game_mode: Some(GameMode::MediumStandard),
        };

        assert!(session.enter_match(selection).unwrap().reached());
        session.ledger().reset_prediction(650);
        session.step().unwrap();
        assert_eq!(session.roster().len(), 1);

        game.set_screen(Screen::MainMenu);
        assert!(session.enter_match(selection).unwrap().reached());
        assert!(session.roster().is_empty());
        assert_eq!(session.map().occupied().count_set(), 0);
    }

    #[test]
    fn test_sandbox_entry_targets_sandbox_screen() {
        let game = FakeGame::shared(Screen::MapSelect);
        let mut session = session(&game, ScriptedReader::unreadable(), None);

        let outcome = session
            .enter_match(MatchSelection {
                track: Some(Track::MonkeyMeadow),
                game_mode: Some(GameMode::HardSandbox),
            })
            .unwrap();

        assert!(outcome.reached());
        assert_eq!(game.screen(), Screen::SandboxBloons);
    }
}
