//! Screen navigator: walks the transition graph and confirms every step.
//!
//! Routes come from [`TransitionGraph::find_path`]. Each edge's action is
//! performed, then the screen is polled until the expected screen shows or
//! the timeout passes. A timed-out edge aborts the rest of the route and is
//! reported as [`NavigationOutcome::TimedOut`], never retried.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use td_core::error::{BotError, Result};
use td_core::match_setup::{page_distance, GameMode, Track, NEXT_PAGE_ARROW, PREV_PAGE_ARROW};
use td_core::math::{NormPos, NormRect};
use td_core::screen::Screen;
use td_core::transitions::{Procedure, Transition, TransitionAction, TransitionGraph};
use td_core::vision::{identify_screen, Identification};

use crate::collaborators::{Frame, InputDriver, ScreenCapture, WindowInput};

/// Timing of confirmation polls and procedure steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// How long to wait for an expected screen.
    pub timeout: Duration,
    /// Pause between screen polls.
    pub poll_interval: Duration,
    /// Pause between the clicks of a multi-step procedure.
    pub step_delay: Duration,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(100),
            step_delay: Duration::from_millis(250),
        }
    }
}

/// Runtime context needed by match-entry procedures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSelection {
    /// Track to open.
    pub track: Option<Track>,
    /// Mode to play; also decides the difficulty.
    pub game_mode: Option<GameMode>,
}

/// How a navigation attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The target was already showing.
    AlreadyThere(Screen),
    /// Every step was confirmed.
    Arrived {
        /// Screens visited, start and target included.
        path: Vec<Screen>,
    },
    /// A step was not confirmed in time. The rest of the route was skipped.
    TimedOut {
        /// Screen that should have appeared.
        expected: Screen,
        /// Screen last seen, if any was recognized.
        observed: Option<Screen>,
    },
}

impl NavigationOutcome {
    /// Whether the target screen is now showing.
    #[must_use]
    pub const fn reached(&self) -> bool {
        !matches!(self, Self::TimedOut { .. })
    }
}

/// Result of waiting for a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The expected screen showed up.
    Confirmed,
    /// It did not, within the timeout. Carries the last screen seen.
    TimedOut(Option<Screen>),
}

/// Drives the game UI between screens.
pub struct Navigator<C, I> {
    graph: TransitionGraph,
    capture: Arc<C>,
    input: Arc<I>,
    config: NavigatorConfig,
    selection: MatchSelection,
}

impl<C: ScreenCapture, I: InputDriver> Navigator<C, I> {
    /// Create a navigator over a graph.
    pub fn new(
        graph: TransitionGraph,
        capture: Arc<C>,
        input: Arc<I>,
        config: NavigatorConfig,
    ) -> Self {
        Self {
            graph,
            capture,
            input,
            config,
            selection: MatchSelection::default(),
        }
    }

    /// Set the track and mode used by match-entry procedures.
    pub fn select_match(&mut self, selection: MatchSelection) {
        self.selection = selection;
    }

    /// Current match selection.
    #[must_use]
    pub const fn selection(&self) -> MatchSelection {
        self.selection
    }

    /// The capture backend, shared with other samplers.
    #[must_use]
    pub fn capture(&self) -> &Arc<C> {
        &self.capture
    }

    /// Window-relative input.
    pub fn input(&self) -> WindowInput<'_, C, I> {
        WindowInput::new(self.capture.as_ref(), self.input.as_ref())
    }

    /// Identify the current screen from a full-window capture.
    ///
    /// # Errors
    ///
    /// Propagates capture failures.
    pub fn identify(&self) -> Result<Option<Identification>> {
        let image = self.capture.capture_region(NormRect::FULL)?;
        Ok(identify_screen(&Frame(image)))
    }

    /// The current screen, if recognized.
    ///
    /// # Errors
    ///
    /// Propagates capture failures.
    pub fn current_screen(&self) -> Result<Option<Screen>> {
        Ok(self.identify()?.map(|id| id.screen))
    }

    /// Poll until `expected` shows or the timeout passes.
    ///
    /// Capture failures other than a lost window count as "not recognized".
    ///
    /// # Errors
    ///
    /// Returns [`BotError::WindowLost`] if the window disappears.
    pub fn wait_for_screen(&self, expected: Screen) -> Result<Confirmation> {
        let deadline = Instant::now() + self.config.timeout;
        let mut observed = None;
        loop {
            match self.current_screen() {
                Ok(screen) => observed = screen,
                Err(BotError::WindowLost) => return Err(BotError::WindowLost),
                Err(e) => debug!(error = %e, "Capture failed while polling"),
            }
            if observed == Some(expected) {
                return Ok(Confirmation::Confirmed);
            }
            if Instant::now() >= deadline {
                return Ok(Confirmation::TimedOut(observed));
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Poll until `screen` is no longer showing. `false` on timeout.
    fn wait_to_leave(&self, screen: Screen) -> Result<bool> {
        let deadline = Instant::now() + self.config.timeout;
        loop {
            match self.current_screen() {
                Ok(current) if current != Some(screen) => return Ok(true),
                Ok(_) => {}
                Err(BotError::WindowLost) => return Err(BotError::WindowLost),
                Err(e) => debug!(error = %e, "Capture failed while polling"),
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Poll until any known screen shows.
    fn wait_for_any_screen(&self) -> Result<Option<Screen>> {
        let deadline = Instant::now() + self.config.timeout;
        loop {
            match self.current_screen() {
                Ok(Some(screen)) => return Ok(Some(screen)),
                Ok(None) => {}
                Err(BotError::WindowLost) => return Err(BotError::WindowLost),
                Err(e) => debug!(error = %e, "Capture failed while polling"),
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Move the UI to `target`.
    ///
    /// # Errors
    ///
    /// [`BotError::NavigationUnreachable`] if the graph has no route, errors
    /// from procedures (missing selection, grid index out of range) and
    /// collaborator failures. A step that is not confirmed in time is not an
    /// error; see [`NavigationOutcome::TimedOut`].
    pub fn navigate_to(&mut self, target: Screen) -> Result<NavigationOutcome> {
        let Some(start) = self.wait_for_any_screen()? else {
            warn!(%target, "Current screen not recognized");
            return Ok(NavigationOutcome::TimedOut {
                expected: target,
                observed: None,
            });
        };
        if start == target {
            debug!(%target, "Already there");
            return Ok(NavigationOutcome::AlreadyThere(target));
        }

        let path = self.graph.find_path(start, target)?;
        info!(from = %start, to = %target, steps = path.len() - 1, "Navigating");

        for step in path.windows(2) {
            let (from, to) = (step[0], step[1]);
            let transition = self
                .graph
                .transition(from, to)
                .cloned()
                .ok_or(BotError::NavigationUnreachable { from, to })?;

            info!(%from, %to, "Transition");
            self.perform(&transition)?;

            if let Confirmation::TimedOut(observed) = self.wait_for_screen(to)? {
                warn!(expected = %to, ?observed, "Transition not confirmed");
                return Ok(NavigationOutcome::TimedOut {
                    expected: to,
                    observed,
                });
            }
        }

        Ok(NavigationOutcome::Arrived { path })
    }

    fn perform(&self, transition: &Transition) -> Result<()> {
        sleep_ms(transition.pre_delay_ms);
        match &transition.action {
            TransitionAction::Click(pos) => self.input().click(*pos)?,
            TransitionAction::Key(key) => self.input().press_key(key)?,
            TransitionAction::Custom(procedure) => self.run_procedure(*procedure)?,
        }
        sleep_ms(transition.post_delay_ms);
        Ok(())
    }

    fn run_procedure(&self, procedure: Procedure) -> Result<()> {
        match procedure {
            Procedure::EnterMatch => self.enter_match(false),
            Procedure::EnterSandbox => self.enter_match(true),
        }
    }

    /// Page to the selected track, open it, then pick difficulty and mode.
    ///
    /// The difficulty and mode dialogs have no signatures of their own, so
    /// the clicks inside the picker are paced by `step_delay`. After the mode
    /// click the picker must go away before the edge's own confirmation runs.
    fn enter_match(&self, sandbox: bool) -> Result<()> {
        let track = self
            .selection
            .track
            .ok_or_else(|| BotError::MissingContext("no track selected".into()))?;
        let mode = self
            .selection
            .game_mode
            .ok_or_else(|| BotError::MissingContext("no game mode selected".into()))?;
        if mode.is_sandbox() != sandbox {
            let wanted = if sandbox { "a sandbox" } else { "a standard" };
            return Err(BotError::MissingContext(format!(
                "{mode} is not {wanted} game mode"
            )));
        }

        let difficulty = mode.difficulty()?;
        let difficulty_button = difficulty.button().ok_or_else(|| {
            BotError::MissingContext(format!("{difficulty:?} has no selector button"))
        })?;
        let mode_button = mode.button()?;
        let thumbnail = track.thumbnail();
        let thumbnail_button = thumbnail.position()?;

        let current_page = match self.identify()?.and_then(|id| id.map_page) {
            Some(page) => page,
            None => {
                let category = track.category();
                debug!(?category, "Page unreadable, jumping to category");
                self.click_step(category.button())?;
                self.identify()?
                    .and_then(|id| id.map_page)
                    .unwrap_or_else(|| category.first_page())
            }
        };

        let distance = page_distance(current_page, thumbnail.page);
        let arrow = if distance > 0 {
            NEXT_PAGE_ARROW
        } else {
            PREV_PAGE_ARROW
        };
        debug!(%track, current_page, target_page = thumbnail.page, distance, "Paging");
        for _ in 0..distance.unsigned_abs() {
            self.click_step(arrow)?;
        }

        info!(%track, %mode, ?difficulty, "Entering match");
        self.click_step(thumbnail_button)?;
        self.click_step(difficulty_button)?;
        self.input().click(mode_button)?;
        if !self.wait_to_leave(Screen::MapSelect)? {
            warn!(%track, %mode, "Map picker still showing after mode click");
        }
        Ok(())
    }

    fn click_step(&self, pos: NormPos) -> Result<()> {
        self.input().click(pos)?;
        thread::sleep(self.config.step_delay);
        Ok(())
    }
}

fn sleep_ms(millis: u64) {
    if millis > 0 {
        thread::sleep(Duration::from_millis(millis));
    }
}
