//! Reproducibility testing utilities.
//!
//! The planner must make the same choices for the same inputs: a fixed scan
//! order, strictly-greater tie-breaks and no hidden state. These helpers
//! replay the decision core without any IO and compare the results.
//!
//! Sources of non-determinism to watch for:
//!
//! - **HashMap iteration order**: the default hasher is randomized. Anything
//!   that feeds a choice must iterate in a fixed order.
//! - **Float comparisons**: ties must resolve by position in the enumeration,
//!   never by accident of rounding in a different evaluation order.
//! - **Wall-clock time**: only the ledger reads timestamps, and only to
//!   compare its own two values.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use td_core::data::UnitCatalog;
use td_core::decision::{apply_action, choose_best_action, DecisionContext, PlannedAction};
use td_core::map::MapModel;
use td_core::match_setup::Difficulty;
use td_core::roster::Roster;
use td_core::unit_kind::UnitKind;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic planner).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Planner is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a process multiple times and verify every run ends in the same state.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute a state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Offline game: everything the planner reads plus the actions taken.
#[derive(Debug, Clone)]
pub struct Replay {
    /// Unit tables.
    pub catalog: UnitCatalog,
    /// Level geometry, including occupied space.
    pub map: MapModel,
    /// Units placed so far.
    pub roster: Roster,
    /// Balance left.
    pub money: u32,
    /// Price tier.
    pub difficulty: Difficulty,
    /// Units the planner may place.
    pub candidates: Vec<UnitKind>,
    /// Actions taken, in order.
    pub actions: Vec<PlannedAction>,
}

impl Replay {
    /// Start a replay with an empty roster.
    #[must_use]
    pub fn new(
        catalog: UnitCatalog,
        map: MapModel,
        money: u32,
        difficulty: Difficulty,
        candidates: Vec<UnitKind>,
    ) -> Self {
        Self {
            catalog,
            map,
            roster: Roster::new(),
            money,
            difficulty,
            candidates,
            actions: Vec::new(),
        }
    }

    /// Choose and apply one action. Returns `false` when nothing is affordable.
    ///
    /// # Panics
    ///
    /// Panics on planner errors; replays use consistent fixtures.
    pub fn step(&mut self) -> bool {
        let ctx = DecisionContext::new(
            &self.catalog,
            &self.map,
            &self.roster,
            self.money,
            self.difficulty,
        );
        let Some(best) = choose_best_action(&ctx, &self.candidates).expect("planning failed") else {
            return false;
        };
        apply_action(&best.action, &self.catalog, &mut self.map, &mut self.roster)
            .expect("chosen action applies");
        self.money -= best.action.cost();
        self.actions.push(best.action);
        true
    }

    /// Grant income, as a finished round would.
    pub fn earn(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Hash of the action log.
    #[must_use]
    pub fn plan_hash(&self) -> u64 {
        compute_hash(&format!("{:?}", self.actions))
    }
}

/// Replay `runs` times with the same setup, `income` granted before each step.
pub fn verify_replay_determinism<F>(
    setup: F,
    runs: usize,
    steps: u64,
    income: u32,
) -> DeterminismResult
where
    F: Fn() -> Replay,
{
    verify_determinism(
        runs,
        steps,
        setup,
        |replay| {
            replay.earn(income);
            replay.step();
        },
        Replay::plan_hash,
    )
}

/// Run replays on parallel threads and collect their plan hashes.
///
/// # Panics
///
/// Panics if a replay thread panics.
pub fn run_parallel_replays<F>(
    setup: F,
    threads: usize,
    steps: u64,
    income: u32,
) -> DeterminismResult
where
    F: Fn() -> Replay + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    let mut replay = setup();
                    for _ in 0..steps {
                        replay.earn(income);
                        replay.step();
                    }
                    replay.plan_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("replay thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
