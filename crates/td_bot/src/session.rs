//! The decision loop.
//!
//! Each iteration confirms the game is in play, asks the valuation engine for
//! the best action and performs it. A failed action is logged and skipped;
//! only a lost window, missing resources or leaving play end the session.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use td_core::data::UnitCatalog;
use td_core::decision::{apply_action, choose_best_action, DecisionContext, PlannedAction};
use td_core::error::{BotError, Result};
use td_core::map::MapModel;
use td_core::match_setup::Difficulty;
use td_core::placement::{PLACEMENT_STRIDE, PROBE_STRIDE};
use td_core::roster::{check_advance, Roster};
use td_core::screen::Screen;
use td_core::unit_kind::UnitKind;

use crate::collaborators::{InputDriver, NumberReader, ScreenCapture};
use crate::money::{refresh_now, MoneyConfig, MoneySampler, SharedLedger};
use crate::navigator::{MatchSelection, NavigationOutcome, Navigator};

/// Decision loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Units the planner may place.
    pub candidate_units: Vec<UnitKind>,
    /// Price tier of the match.
    pub difficulty: Difficulty,
    /// Stride of the placement feasibility probe.
    pub probe_stride: u32,
    /// Stride of the placement search.
    pub placement_stride: u32,
    /// Pause after every iteration.
    pub action_pacing: Duration,
    /// Pause when nothing is affordable.
    pub idle_delay: Duration,
    /// Pause before re-checking a screen that is not in play.
    pub recheck_delay: Duration,
    /// Stop after this many iterations.
    pub max_iterations: Option<u64>,
    /// Money sampling.
    pub money: MoneyConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            candidate_units: Vec::new(),
            difficulty: Difficulty::Medium,
            probe_stride: PROBE_STRIDE,
            placement_stride: PLACEMENT_STRIDE,
            action_pacing: Duration::from_millis(250),
            idle_delay: Duration::from_millis(1000),
            recheck_delay: Duration::from_millis(1000),
            max_iterations: None,
            money: MoneyConfig::default(),
        }
    }
}

/// What one iteration did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// An action was performed.
    Acted(PlannedAction),
    /// Nothing was affordable or feasible.
    Idle,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// Play was not confirmed twice in a row.
    LeftPlay(Option<Screen>),
    /// The configured iteration cap was reached.
    IterationLimit,
}

/// Counters for a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Iterations started.
    pub iterations: u64,
    /// Actions performed.
    pub actions: u64,
    /// Iterations with nothing to do.
    pub idles: u64,
    /// Actions that failed and were skipped.
    pub skipped: u64,
    /// Why the loop stopped.
    pub ended_by: EndReason,
}

/// One match played by the autopilot.
pub struct Session<C, R, I> {
    navigator: Navigator<C, I>,
    reader: Arc<R>,
    catalog: UnitCatalog,
    map: MapModel,
    roster: Roster,
    ledger: SharedLedger,
    config: SessionConfig,
}

impl<C, R, I> Session<C, R, I>
where
    C: ScreenCapture + Send + Sync + 'static,
    R: NumberReader + Send + Sync + 'static,
    I: InputDriver,
{
    /// Create a session for a loaded level.
    pub fn new(
        navigator: Navigator<C, I>,
        reader: Arc<R>,
        catalog: UnitCatalog,
        map: MapModel,
        config: SessionConfig,
    ) -> Self {
        Self {
            navigator,
            reader,
            catalog,
            map,
            roster: Roster::new(),
            ledger: SharedLedger::default(),
            config,
        }
    }

    /// Units placed so far.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Current level geometry.
    #[must_use]
    pub const fn map(&self) -> &MapModel {
        &self.map
    }

    /// The money ledger shared with the sampler.
    #[must_use]
    pub const fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Navigate into the selected match and reset per-level state.
    ///
    /// # Errors
    ///
    /// Navigation errors; see [`Navigator::navigate_to`].
    pub fn enter_match(&mut self, selection: MatchSelection) -> Result<NavigationOutcome> {
        let target = match selection.game_mode {
            Some(mode) if mode.is_sandbox() => Screen::SandboxBloons,
            _ => Screen::InGame,
        };
        self.navigator.select_match(selection);
        let outcome = self.navigator.navigate_to(target)?;
        if outcome.reached() {
            self.map.clear_occupied();
            self.roster = Roster::new();
        }
        Ok(outcome)
    }

    /// Run until play ends, a fatal error occurs or the iteration cap is hit.
    ///
    /// # Errors
    ///
    /// Fatal errors ([`BotError::is_fatal`]) end the session and are returned.
    pub fn run(&mut self) -> Result<SessionSummary> {
        if let Some(initial) = refresh_now(
            self.navigator.capture().as_ref(),
            self.reader.as_ref(),
            &self.ledger,
            self.config.money.region,
        )? {
            self.ledger.reset_prediction(initial);
        }
        let mut sampler = MoneySampler::start(
            Arc::clone(self.navigator.capture()),
            Arc::clone(&self.reader),
            self.ledger.clone(),
            self.config.money,
        )?;

        let result = self.run_loop();
        sampler.stop();

        match &result {
            Ok(summary) => info!(?summary, "Session finished"),
            Err(e) => error!(error = %e, "Session aborted"),
        }
        result
    }

    fn run_loop(&mut self) -> Result<SessionSummary> {
        let mut summary = SessionSummary {
            iterations: 0,
            actions: 0,
            idles: 0,
            skipped: 0,
            ended_by: EndReason::IterationLimit,
        };

        loop {
            if self
                .config
                .max_iterations
                .is_some_and(|max| summary.iterations >= max)
            {
                summary.ended_by = EndReason::IterationLimit;
                return Ok(summary);
            }
            summary.iterations += 1;

            if let Some(observed) = self.confirm_in_play()? {
                warn!(?observed, "Not in play, ending session");
                summary.ended_by = EndReason::LeftPlay(observed);
                return Ok(summary);
            }

            match self.step() {
                Ok(StepOutcome::Acted(_)) => summary.actions += 1,
                Ok(StepOutcome::Idle) => summary.idles += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "Action skipped");
                    summary.skipped += 1;
                }
            }
            thread::sleep(self.config.action_pacing);
        }
    }

    /// `None` when in play; otherwise the screen seen on the second check.
    fn confirm_in_play(&self) -> Result<Option<Option<Screen>>> {
        let first = self.screen_or_none()?;
        if first.is_some_and(Screen::is_in_play) {
            return Ok(None);
        }
        debug!(?first, "Not in play, re-checking");
        thread::sleep(self.config.recheck_delay);
        let second = self.screen_or_none()?;
        if second.is_some_and(Screen::is_in_play) {
            Ok(None)
        } else {
            Ok(Some(second))
        }
    }

    fn screen_or_none(&self) -> Result<Option<Screen>> {
        match self.navigator.current_screen() {
            Err(BotError::WindowLost) => Err(BotError::WindowLost),
            Err(e) => {
                debug!(error = %e, "Capture failed");
                Ok(None)
            }
            other => other,
        }
    }

    /// Choose and perform one action.
    ///
    /// # Errors
    ///
    /// Errors from planning or executing the chosen action.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let money = self.ledger.reported_balance();
        let ctx = DecisionContext {
            catalog: &self.catalog,
            map: &self.map,
            roster: &self.roster,
            money,
            difficulty: self.config.difficulty,
            probe_stride: self.config.probe_stride,
            placement_stride: self.config.placement_stride,
        };
        let Some(best) = choose_best_action(&ctx, &self.config.candidate_units)? else {
            debug!(money, "No affordable action");
            thread::sleep(self.config.idle_delay);
            return Ok(StepOutcome::Idle);
        };

        info!(action = ?best.action, score = best.score, money, "Executing");
        self.execute(&best.action)?;
        Ok(StepOutcome::Acted(best.action))
    }

    /// Perform an action through the input backend and record it.
    ///
    /// Funds and upgrade legality are checked before any input is sent. The
    /// action is recorded as soon as the purchasing input succeeds; a failed
    /// deselect afterwards is only logged.
    ///
    /// # Errors
    ///
    /// [`BotError::InsufficientFunds`], [`BotError::InvalidUpgradePath`] or
    /// input failures.
    pub fn execute(&mut self, action: &PlannedAction) -> Result<()> {
        let available = self.ledger.reported_balance();
        let cost = action.cost();
        if cost > available {
            return Err(BotError::InsufficientFunds {
                required: cost,
                available,
            });
        }

        match *action {
            PlannedAction::Place { kind, position, .. } => {
                let input = self.navigator.input();
                input.press_key(kind.hotkey())?;
                if let Err(e) = input.click(position) {
                    if let Err(cancel) = input.press_key("esc") {
                        warn!(error = %cancel, "Could not cancel pending placement");
                    }
                    return Err(e);
                }
                self.record(action)
            }
            PlannedAction::Upgrade {
                unit_id,
                position,
                path,
                ..
            } => {
                let placed = self.roster.get(unit_id).ok_or_else(|| {
                    BotError::InvalidUpgradePath(format!("no placed unit with id {unit_id}"))
                })?;
                check_advance(placed.tiers, path)?;
                let input = self.navigator.input();
                input.click(position)?;
                if let Err(e) = input.press_key(path.hotkey()) {
                    if let Err(deselect) = input.press_key("esc") {
                        warn!(error = %deselect, "Could not deselect unit");
                    }
                    return Err(e);
                }
                self.record(action)?;
                if let Err(e) = self.navigator.input().press_key("esc") {
                    warn!(error = %e, unit_id, "Upgrade bought but unit not deselected");
                }
                Ok(())
            }
        }
    }

    fn record(&mut self, action: &PlannedAction) -> Result<()> {
        apply_action(action, &self.catalog, &mut self.map, &mut self.roster)?;
        self.ledger.apply_spend(action.cost());
        Ok(())
    }
}
