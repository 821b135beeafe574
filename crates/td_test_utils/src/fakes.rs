//! Scripted stand-ins for the capture, OCR and input backends.
//!
//! [`FakeGame`] is a tiny model of the game's UI. It renders each screen's
//! identifier pixels into a black frame and reacts to clicks and keys the
//! way the real menus do: graph edges move between screens, the map picker
//! pages, opens the difficulty and mode dialogs, and starts a match. Inside a
//! match it records placements and upgrades.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use image::{imageops, Rgb, RgbImage};

use td_bot::collaborators::{InputDriver, NumberReader, ScreenCapture, WindowGeometry};
use td_bot::navigator::{Navigator, NavigatorConfig};
use td_core::error::{BotError, Result};
use td_core::match_setup::{
    Difficulty, GameMode, MapCategory, MAP_PAGES, NEXT_PAGE_ARROW, PREV_PAGE_ARROW,
    THUMBNAIL_POSITIONS,
};
use td_core::math::{NormPos, NormRect};
use td_core::screen::Screen;
use td_core::transitions::{TransitionAction, TransitionGraph};
use td_core::vision::{signatures, MAP_PAGE_DOTS, SELECTED_PAGE_COLOR};

/// Fake window width in pixels.
pub const FAKE_WIDTH: u32 = 800;
/// Fake window height in pixels.
pub const FAKE_HEIGHT: u32 = 600;

const CLICK_TOLERANCE: f64 = 0.01;

/// One input event as the fake saw it, normalized to the window.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved.
    Move(NormPos),
    /// Left click.
    Click(NormPos),
    /// Key press.
    Key(String),
}

/// The match the picker dialogs started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnteredMatch {
    /// Picker page of the clicked thumbnail.
    pub page: usize,
    /// Slot of the clicked thumbnail.
    pub slot: usize,
    /// Difficulty button pressed.
    pub difficulty: Difficulty,
    /// Mode button pressed.
    pub mode: GameMode,
}

#[derive(Debug, Clone, Copy)]
enum PickerStage {
    Browsing,
    Difficulty { page: usize, slot: usize },
    Mode {
        page: usize,
        slot: usize,
        difficulty: Difficulty,
    },
}

#[derive(Debug)]
struct GameState {
    screen: Screen,
    page: usize,
    picker: PickerStage,
    pending_unit: Option<String>,
    selected: bool,
    frozen: bool,
    blank: bool,
    hide_page_dot: bool,
    window_lost: bool,
    fail_input: bool,
    fail_clicks: bool,
    rejected_key: Option<String>,
    end_after_placements: Option<usize>,
    placements: Vec<(String, NormPos)>,
    upgrades: Vec<String>,
    entered: Option<EnteredMatch>,
    inputs: Vec<InputEvent>,
}

/// Scripted game window implementing capture and input.
#[derive(Debug)]
pub struct FakeGame {
    graph: TransitionGraph,
    state: Mutex<GameState>,
}

impl FakeGame {
    /// A game showing `screen`, picker on page 0.
    #[must_use]
    pub fn new(screen: Screen) -> Self {
        Self {
            graph: TransitionGraph::standard(),
            state: Mutex::new(GameState {
                screen,
                page: 0,
                picker: PickerStage::Browsing,
                pending_unit: None,
                selected: false,
                frozen: false,
                blank: false,
                hide_page_dot: false,
                window_lost: false,
                fail_input: false,
                fail_clicks: false,
                rejected_key: None,
                end_after_placements: None,
                placements: Vec::new(),
                upgrades: Vec::new(),
                entered: None,
                inputs: Vec::new(),
            }),
        }
    }

    /// Same game, shared.
    #[must_use]
    pub fn shared(screen: Screen) -> Arc<Self> {
        Arc::new(Self::new(screen))
    }

    fn state(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Screen currently shown.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.state().screen
    }

    /// Jump to a screen.
    pub fn set_screen(&self, screen: Screen) {
        let mut state = self.state();
        state.screen = screen;
        state.picker = PickerStage::Browsing;
    }

    /// Current map picker page.
    #[must_use]
    pub fn page(&self) -> usize {
        self.state().page
    }

    /// Set the map picker page.
    pub fn set_page(&self, page: usize) {
        self.state().page = page.min(MAP_PAGES - 1);
    }

    /// Ignore all input while frozen.
    pub fn freeze(&self, frozen: bool) {
        self.state().frozen = frozen;
    }

    /// Render plain black frames nothing can identify.
    pub fn blank(&self, blank: bool) {
        self.state().blank = blank;
    }

    /// Leave the selected page dot unpainted.
    pub fn hide_page_dot(&self, hide: bool) {
        self.state().hide_page_dot = hide;
    }

    /// Make the window disappear.
    pub fn lose_window(&self) {
        self.state().window_lost = true;
    }

    /// Reject every input event.
    pub fn fail_input(&self, fail: bool) {
        self.state().fail_input = fail;
    }

    /// Reject clicks only.
    pub fn fail_clicks(&self, fail: bool) {
        self.state().fail_clicks = fail;
    }

    /// Reject presses of one key.
    pub fn reject_key(&self, key: &str) {
        self.state().rejected_key = Some(key.to_string());
    }

    /// Hotkey of a unit waiting to be placed.
    #[must_use]
    pub fn pending_unit(&self) -> Option<String> {
        self.state().pending_unit.clone()
    }

    /// Whether a placed unit is selected.
    #[must_use]
    pub fn unit_selected(&self) -> bool {
        self.state().selected
    }

    /// Show the game-over summary after this many placements.
    pub fn end_game_after(&self, placements: usize) {
        self.state().end_after_placements = Some(placements);
    }

    /// Units placed in the match: hotkey and position.
    #[must_use]
    pub fn placements(&self) -> Vec<(String, NormPos)> {
        self.state().placements.clone()
    }

    /// Path hotkeys pressed on a selected unit.
    #[must_use]
    pub fn upgrades(&self) -> Vec<String> {
        self.state().upgrades.clone()
    }

    /// The match started through the picker, if any.
    #[must_use]
    pub fn entered(&self) -> Option<EnteredMatch> {
        self.state().entered
    }

    /// Every input event received.
    #[must_use]
    pub fn inputs(&self) -> Vec<InputEvent> {
        self.state().inputs.clone()
    }

    /// Clicks received, in order.
    #[must_use]
    pub fn clicks(&self) -> Vec<NormPos> {
        self.state()
            .inputs
            .iter()
            .filter_map(|event| match event {
                InputEvent::Click(pos) => Some(*pos),
                _ => None,
            })
            .collect()
    }

    fn render(&self) -> RgbImage {
        let state = self.state();
        let mut image = RgbImage::new(FAKE_WIDTH, FAKE_HEIGHT);
        if state.blank {
            return image;
        }
        let mut paint = |(x, y): (f64, f64), color: [u8; 3]| {
            let (px, py) = NormPos::new(x, y).to_pixel_index(FAKE_WIDTH, FAKE_HEIGHT);
            image.put_pixel(px, py, Rgb(color));
        };
        if let Some(signature) = signatures(state.screen).first() {
            for &(at, color) in *signature {
                paint(at, color);
            }
        }
        if state.screen == Screen::MapSelect && !state.hide_page_dot {
            paint(MAP_PAGE_DOTS[state.page], SELECTED_PAGE_COLOR);
        }
        image
    }

    fn follow_edge(&self, state: &mut GameState, hit: impl Fn(&TransitionAction) -> bool) -> bool {
        let next = self
            .graph
            .edges_from(state.screen)
            .iter()
            .find(|edge| hit(&edge.transition.action))
            .map(|edge| edge.to);
        match next {
            Some(to) => {
                state.screen = to;
                state.picker = PickerStage::Browsing;
                true
            }
            None => false,
        }
    }

    fn click_picker(state: &mut GameState, pos: NormPos) {
        let near = |target: NormPos| pos.approx_eq(target, CLICK_TOLERANCE);
        match state.picker {
            PickerStage::Browsing => {
                if near(NEXT_PAGE_ARROW) {
                    state.page = (state.page + 1).min(MAP_PAGES - 1);
                } else if near(PREV_PAGE_ARROW) {
                    state.page = state.page.saturating_sub(1);
                } else if let Some(category) = [
                    MapCategory::Beginner,
                    MapCategory::Intermediate,
                    MapCategory::Advanced,
                    MapCategory::Expert,
                ]
                .into_iter()
                .find(|c| near(c.button()))
                {
                    state.page = category.first_page();
                } else if let Some(slot) = THUMBNAIL_POSITIONS
                    .iter()
                    .position(|&(x, y)| near(NormPos::new(x, y)))
                {
                    state.picker = PickerStage::Difficulty {
                        page: state.page,
                        slot,
                    };
                }
            }
            PickerStage::Difficulty { page, slot } => {
                if let Some(difficulty) = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
                    .into_iter()
                    .find(|d| d.button().is_some_and(near))
                {
                    state.picker = PickerStage::Mode {
                        page,
                        slot,
                        difficulty,
                    };
                }
            }
            PickerStage::Mode {
                page,
                slot,
                difficulty,
            } => {
                let mode = GameMode::ALL.into_iter().find(|mode| {
                    mode.difficulty().ok() == Some(difficulty)
                        && mode.button().is_ok_and(near)
                });
                if let Some(mode) = mode {
                    state.entered = Some(EnteredMatch {
                        page,
                        slot,
                        difficulty,
                        mode,
                    });
                    state.screen = if mode.is_sandbox() {
                        Screen::SandboxStartPopup
                    } else {
                        Screen::InGame
                    };
                    state.picker = PickerStage::Browsing;
                }
            }
        }
    }

    fn click_in_game(state: &mut GameState, pos: NormPos) {
        match state.pending_unit.take() {
            Some(hotkey) => {
                state.placements.push((hotkey, pos));
                if state
                    .end_after_placements
                    .is_some_and(|n| state.placements.len() >= n)
                {
                    state.screen = Screen::GameOverSummary;
                }
            }
            None => state.selected = true,
        }
    }
}

fn to_window(x: i32, y: i32) -> NormPos {
    NormPos::from_pixels(f64::from(x), f64::from(y), FAKE_WIDTH, FAKE_HEIGHT)
}

impl ScreenCapture for FakeGame {
    fn window_geometry(&self) -> Option<WindowGeometry> {
        if self.state().window_lost {
            return None;
        }
        Some(WindowGeometry {
            left: 0,
            top: 0,
            width: FAKE_WIDTH,
            height: FAKE_HEIGHT,
        })
    }

    fn capture_region(&self, region: NormRect) -> Result<RgbImage> {
        if self.state().window_lost {
            return Err(BotError::WindowLost);
        }
        let frame = self.render();
        let (x, y, w, h) = region.to_pixels(FAKE_WIDTH, FAKE_HEIGHT);
        Ok(imageops::crop_imm(&frame, x, y, w, h).to_image())
    }
}

impl InputDriver for FakeGame {
    fn move_to(&self, x: i32, y: i32) -> Result<()> {
        let mut state = self.state();
        if state.fail_input {
            return Err(BotError::Collaborator("input rejected".into()));
        }
        state.inputs.push(InputEvent::Move(to_window(x, y)));
        Ok(())
    }

    fn click(&self, x: i32, y: i32) -> Result<()> {
        let mut state = self.state();
        if state.fail_input || state.fail_clicks {
            return Err(BotError::Collaborator("input rejected".into()));
        }
        let pos = to_window(x, y);
        state.inputs.push(InputEvent::Click(pos));
        if state.frozen {
            return Ok(());
        }

        let followed = self.follow_edge(&mut state, |action| {
            matches!(action, TransitionAction::Click(at) if at.approx_eq(pos, CLICK_TOLERANCE))
        });
        if followed {
            return Ok(());
        }
        match state.screen {
            Screen::MapSelect => Self::click_picker(&mut state, pos),
            Screen::InGame | Screen::SandboxBloons | Screen::SandboxMonkeys => {
                Self::click_in_game(&mut state, pos);
            }
            _ => {}
        }
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        let mut state = self.state();
        if state.fail_input || state.rejected_key.as_deref() == Some(key) {
            return Err(BotError::Collaborator(format!("key {key} rejected")));
        }
        state.inputs.push(InputEvent::Key(key.to_string()));
        if state.frozen {
            return Ok(());
        }

        let in_match = state.screen.is_in_play();
        if in_match && state.selected {
            if key == "esc" {
                state.selected = false;
            } else {
                state.upgrades.push(key.to_string());
            }
            return Ok(());
        }
        if in_match && key == "esc" && state.pending_unit.take().is_some() {
            return Ok(());
        }
        if self.follow_edge(&mut state, |action| {
            matches!(action, TransitionAction::Key(k) if k == key)
        }) {
            return Ok(());
        }
        if in_match {
            state.pending_unit = Some(key.to_string());
        }
        Ok(())
    }
}

/// OCR fake returning scripted values, then a fallback.
#[derive(Debug)]
pub struct ScriptedReader {
    values: Mutex<VecDeque<Option<u32>>>,
    fallback: Option<u32>,
    reads: AtomicUsize,
}

impl ScriptedReader {
    /// Return `values` in order, then `fallback` forever.
    #[must_use]
    pub fn sequence(values: impl IntoIterator<Item = Option<u32>>, fallback: Option<u32>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
            fallback,
            reads: AtomicUsize::new(0),
        }
    }

    /// Always read `value`.
    #[must_use]
    pub fn fixed(value: u32) -> Self {
        Self::sequence([], Some(value))
    }

    /// Read `value` once, then nothing.
    #[must_use]
    pub fn once(value: u32) -> Self {
        Self::sequence([Some(value)], None)
    }

    /// Never read anything.
    #[must_use]
    pub fn unreadable() -> Self {
        Self::sequence([], None)
    }

    /// Number of reads so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl NumberReader for ScriptedReader {
    fn read_number(&self, _image: &RgbImage) -> Option<u32> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

/// Navigator timing short enough for tests.
#[must_use]
pub fn fast_navigator_config() -> NavigatorConfig {
    NavigatorConfig {
        timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(5),
        step_delay: Duration::ZERO,
    }
}

/// A navigator over the standard graph driving `game`.
#[must_use]
pub fn fake_navigator(game: &Arc<FakeGame>) -> Navigator<FakeGame, FakeGame> {
    Navigator::new(
        TransitionGraph::standard(),
        Arc::clone(game),
        Arc::clone(game),
        fast_navigator_config(),
    )
}
