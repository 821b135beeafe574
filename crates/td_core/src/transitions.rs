//! Screen transition graph and breadth-first route search.
//!
//! Each directed edge carries the action that moves the game from one screen
//! to the next. Edges whose parameters depend on runtime context (which
//! track, which mode) are named [`Procedure`]s and executed by the navigator.
//!
//! Route search is deterministic: neighbours are explored in edge insertion
//! order, so a fixed graph always yields the same shortest route.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::math::NormPos;
use crate::screen::Screen;

/// Multi-step procedures that cannot be expressed as one click or key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Procedure {
    /// Page to the selected track, pick difficulty and a standard mode.
    EnterMatch,
    /// Same as [`Procedure::EnterMatch`] but for sandbox modes.
    EnterSandbox,
}

/// What to do to traverse an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransitionAction {
    /// Click at a normalized window position.
    Click(NormPos),
    /// Press and release a key.
    Key(String),
    /// Run a named runtime procedure.
    Custom(Procedure),
}

/// Action plus optional pacing around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// The action to perform.
    pub action: TransitionAction,
    /// Wait before acting, in milliseconds.
    #[serde(default)]
    pub pre_delay_ms: u64,
    /// Wait after acting, before confirmation polling starts.
    #[serde(default)]
    pub post_delay_ms: u64,
}

impl Transition {
    /// A click edge without delays.
    #[must_use]
    pub const fn click(x: f64, y: f64) -> Self {
        Self {
            action: TransitionAction::Click(NormPos::new(x, y)),
            pre_delay_ms: 0,
            post_delay_ms: 0,
        }
    }

    /// A key edge without delays.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            action: TransitionAction::Key(key.into()),
            pre_delay_ms: 0,
            post_delay_ms: 0,
        }
    }

    /// A custom procedure edge without delays.
    #[must_use]
    pub const fn custom(procedure: Procedure) -> Self {
        Self {
            action: TransitionAction::Custom(procedure),
            pre_delay_ms: 0,
            post_delay_ms: 0,
        }
    }

    /// Set the post-action delay.
    #[must_use]
    pub const fn with_post_delay(mut self, millis: u64) -> Self {
        self.post_delay_ms = millis;
        self
    }
}

/// One edge as written in a RON graph file.
///
/// # Example RON
///
/// ```ron
/// [
///     (from: MainMenu, to: MapSelect, action: Click((x: 0.5, y: 0.875))),
///     (from: InGame, to: PauseMenu, action: Key("esc")),
///     (from: MapSelect, to: InGame, action: Custom(EnterMatch), post_delay_ms: 500),
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Source screen.
    pub from: Screen,
    /// Destination screen.
    pub to: Screen,
    /// Action to perform.
    pub action: TransitionAction,
    /// Wait before acting.
    #[serde(default)]
    pub pre_delay_ms: u64,
    /// Wait after acting.
    #[serde(default)]
    pub post_delay_ms: u64,
}

/// An outgoing edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Destination screen.
    pub to: Screen,
    /// How to get there.
    pub transition: Transition,
}

/// Directed graph of screens. Static configuration, never mutated at runtime.
#[derive(Debug, Clone, Default)]
pub struct TransitionGraph {
    adjacency: HashMap<Screen, Vec<Edge>>,
}

impl TransitionGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from configured edges, keeping their order.
    #[must_use]
    pub fn from_edges(edges: impl IntoIterator<Item = EdgeConfig>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add(
                edge.from,
                edge.to,
                Transition {
                    action: edge.action,
                    pre_delay_ms: edge.pre_delay_ms,
                    post_delay_ms: edge.post_delay_ms,
                },
            );
        }
        graph
    }

    /// Parse a RON list of [`EdgeConfig`].
    pub fn from_ron(source: &str) -> Result<Self> {
        let edges: Vec<EdgeConfig> = ron::from_str(source).map_err(|e| BotError::DataParse {
            what: "transition graph".into(),
            message: e.to_string(),
        })?;
        Ok(Self::from_edges(edges))
    }

    /// The game's built-in screen graph.
    #[must_use]
    pub fn standard() -> Self {
        use Screen::{
            GameOverRewards, GameOverSummary, InGame, MainMenu, MapSelect, PauseMenu,
            RestartPopup, SandboxBloons, SandboxMonkeys, SandboxStartPopup,
        };

        let mut graph = Self::new();
        graph.add(MainMenu, MapSelect, Transition::click(0.5, 0.875));
        graph.add(MapSelect, InGame, Transition::custom(Procedure::EnterMatch));
        graph.add(
            MapSelect,
            SandboxStartPopup,
            Transition::custom(Procedure::EnterSandbox),
        );
        graph.add(MapSelect, MainMenu, Transition::click(0.040, 0.052));
        graph.add(InGame, PauseMenu, Transition::key("esc"));
        graph.add(PauseMenu, MainMenu, Transition::click(0.441, 0.781));
        graph.add(PauseMenu, RestartPopup, Transition::click(0.559, 0.781));
        graph.add(PauseMenu, InGame, Transition::click(0.678, 0.781));
        graph.add(RestartPopup, InGame, Transition::click(0.409, 0.677));
        graph.add(
            SandboxStartPopup,
            SandboxBloons,
            Transition::click(0.502, 0.704).with_post_delay(1000),
        );
        graph.add(SandboxBloons, SandboxMonkeys, Transition::click(0.892, 0.946));
        graph.add(SandboxMonkeys, SandboxBloons, Transition::click(0.892, 0.946));
        graph.add(
            GameOverSummary,
            GameOverRewards,
            Transition::click(0.5, 0.845).with_post_delay(1000),
        );
        graph.add(
            GameOverRewards,
            MainMenu,
            Transition::click(0.327, 0.749).with_post_delay(1000),
        );
        graph
    }

    /// Add or replace the edge `from -> to`.
    ///
    /// Replacing keeps the edge's original position in the iteration order.
    pub fn add(&mut self, from: Screen, to: Screen, transition: Transition) {
        let edges = self.adjacency.entry(from).or_default();
        if let Some(existing) = edges.iter_mut().find(|e| e.to == to) {
            existing.transition = transition;
        } else {
            edges.push(Edge { to, transition });
        }
    }

    /// Outgoing edges of a screen in insertion order.
    #[must_use]
    pub fn edges_from(&self, from: Screen) -> &[Edge] {
        self.adjacency.get(&from).map_or(&[], Vec::as_slice)
    }

    /// The transition for a specific edge.
    #[must_use]
    pub fn transition(&self, from: Screen, to: Screen) -> Option<&Transition> {
        self.edges_from(from)
            .iter()
            .find(|e| e.to == to)
            .map(|e| &e.transition)
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Shortest route from `start` to `goal`, both ends included.
    ///
    /// Returns `[start]` when already there. Ties between equally short routes
    /// resolve to the first one discovered in edge insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::NavigationUnreachable`] if no route exists.
    pub fn find_path(&self, start: Screen, goal: Screen) -> Result<Vec<Screen>> {
        if start == goal {
            return Ok(vec![start]);
        }

        let mut came_from: HashMap<Screen, Screen> = HashMap::new();
        let mut visited: HashSet<Screen> = HashSet::from([start]);
        let mut frontier: VecDeque<Screen> = VecDeque::from([start]);

        while let Some(current) = frontier.pop_front() {
            for edge in self.edges_from(current) {
                if !visited.insert(edge.to) {
                    continue;
                }
                came_from.insert(edge.to, current);

                if edge.to == goal {
                    return Ok(reconstruct_path(&came_from, goal));
                }
                frontier.push_back(edge.to);
            }
        }

        Err(BotError::NavigationUnreachable {
            from: start,
            to: goal,
        })
    }
}

/// Walk `came_from` back from the goal.
fn reconstruct_path(came_from: &HashMap<Screen, Screen>, goal: Screen) -> Vec<Screen> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}
