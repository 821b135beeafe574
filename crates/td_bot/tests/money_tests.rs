//! Money sampling against a scripted OCR.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use td_bot::money::{read_money, refresh_now, MoneyConfig, MoneySampler, SharedLedger};
use td_core::screen::Screen;
use td_test_utils::fakes::{FakeGame, ScriptedReader};

fn fast() -> MoneyConfig {
    MoneyConfig {
        interval: Duration::from_millis(5),
        ..MoneyConfig::default()
    }
}

fn start(
    game: &Arc<FakeGame>,
    reader: &Arc<ScriptedReader>,
    ledger: &SharedLedger,
) -> MoneySampler {
    MoneySampler::start(Arc::clone(game), Arc::clone(reader), ledger.clone(), fast()).unwrap()
}

/// Poll `check` for up to a second.
fn eventually(check: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(1);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    check()
}

#[test]
fn test_read_money_from_region() {
    let game = FakeGame::new(Screen::InGame);
    let reader = ScriptedReader::fixed(1234);
    assert_eq!(
        read_money(&game, &reader, MoneyConfig::default().region).unwrap(),
        Some(1234)
    );
}

#[test]
fn test_refresh_now_records_optical() {
    let game = FakeGame::new(Screen::InGame);
    let ledger = SharedLedger::default();

    let value = refresh_now(&game, &ScriptedReader::fixed(640), &ledger, fast().region).unwrap();

    assert_eq!(value, Some(640));
    let (optical, at) = ledger.snapshot().optical();
    assert_eq!(optical, 640);
    assert!(at.is_some());
    assert_eq!(ledger.reported_balance(), 640);
}

#[test]
fn test_refresh_now_unreadable_leaves_ledger() {
    let game = FakeGame::new(Screen::InGame);
    let ledger = SharedLedger::default();

    let value = refresh_now(&game, &ScriptedReader::unreadable(), &ledger, fast().region).unwrap();

    assert_eq!(value, None);
    assert!(ledger.snapshot().optical().1.is_none());
}

#[test]
fn test_sampler_updates_ledger() {
    let game = FakeGame::shared(Screen::InGame);
    let reader = Arc::new(ScriptedReader::fixed(900));
    let ledger = SharedLedger::default();

    let mut sampler = start(&game, &reader, &ledger);

    assert!(eventually(|| ledger.snapshot().optical().0 == 900));
    assert!(sampler.is_running());
    sampler.stop();
    assert!(!sampler.is_running());
}

#[test]
fn test_sampler_survives_unreadable_values() {
    let game = FakeGame::shared(Screen::InGame);
    let reader = Arc::new(ScriptedReader::sequence([None, None, None], Some(300)));
    let ledger = SharedLedger::default();

    let mut sampler = start(&game, &reader, &ledger);

    assert!(eventually(|| ledger.reported_balance() == 300));
    assert!(reader.reads() > 3);
    sampler.stop();
}

#[test]
fn test_sampler_survives_capture_failures() {
    let game = FakeGame::shared(Screen::InGame);
    game.lose_window();
    let reader = Arc::new(ScriptedReader::fixed(50));
    let ledger = SharedLedger::default();

    let mut sampler = start(&game, &reader, &ledger);

    thread::sleep(Duration::from_millis(30));
    assert!(sampler.is_running());
    assert_eq!(reader.reads(), 0);
    sampler.stop();
}

#[test]
fn test_stop_joins_thread() {
    let game = FakeGame::shared(Screen::InGame);
    let reader = Arc::new(ScriptedReader::fixed(10));
    let ledger = SharedLedger::default();

    {
        let _sampler = start(&game, &reader, &ledger);
        assert!(eventually(|| reader.reads() > 0));
    }

    // Dropped and joined: no more reads.
    let reads = reader.reads();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(reader.reads(), reads);
}

#[test]
fn test_prediction_outranks_older_reading() {
    let ledger = SharedLedger::default();
    ledger.record_optical(1000);
    ledger.reset_prediction(1000);
    ledger.apply_spend(300);
    assert_eq!(ledger.reported_balance(), 700);

    thread::sleep(Duration::from_millis(1));
    ledger.record_optical(760);
    assert_eq!(ledger.reported_balance(), 760);
    assert_eq!(ledger.snapshot().predicted().0, 700);
}
