//! Agents: the decision capability the betting state machine consults.
//!
//! Every agent answers two questions for the seat to act: which of the three
//! actions to take and, for a raise, how many chips to add on top of the call.
//! Agents read the live [`GameState`] but never mutate it; search agents work
//! on their own snapshots.

use crate::game::{Action, GameState};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

mod expectiminimax;
mod heuristic;
mod mcts;
mod search;

pub use expectiminimax::{ExpectiminimaxAgent, ExpectiminimaxConfig, NodeKind};
pub use heuristic::{HeuristicAgent, HeuristicProfile, RandomAgent};
pub use mcts::{MctsAgent, MctsConfig, SearchSummary};
pub use search::SearchError;

/// Kinds of agents attached to seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AgentKind {
    Human,
    Random,
    Heuristic,
    Mcts,
    Expectiminimax,
}

/// Decision capability for one seat.
pub trait Agent {
    /// Pick an action for `seat`, the seat currently to act.
    fn decide(&mut self, state: &GameState, seat: usize) -> Action;

    /// Chips to add on top of the call when raising. The caller clamps the
    /// result to `[1, stack]`.
    fn size_raise(&mut self, state: &GameState, seat: usize) -> u64;

    fn kind(&self) -> AgentKind;
}

/// Raise sizing shared by the search and heuristic agents: the call plus a
/// fraction of the pot, clamped to `[1, stack]`.
pub fn pot_fraction_raise(state: &GameState, seat: usize, fraction: f64) -> u64 {
    let stack = state.players().get(seat).map_or(0, |p| p.stack());
    let extra = (state.pot() as f64 * fraction).max(0.0) as u64;
    state.to_call(seat).saturating_add(extra).clamp(1, stack.max(1))
}

/// A generator seeded from `seed`, or from OS entropy when `None`.
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(v) => StdRng::seed_from_u64(v),
        None => {
            let mut seed = [0u8; 32];
            rand::rng().fill_bytes(&mut seed);
            StdRng::from_seed(seed)
        }
    }
}

/// Plays queued intents from a front-end; calls when nothing is queued.
#[derive(Debug, Default)]
pub struct HumanAgent {
    pending: VecDeque<(Action, u64)>,
    sizing: Option<u64>,
}

impl HumanAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an intent. `amount` is the raise increment and is ignored for
    /// fold and call.
    pub fn receive(&mut self, action: Action, amount: u64) {
        self.pending.push_back((action, amount));
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Agent for HumanAgent {
    fn decide(&mut self, _state: &GameState, _seat: usize) -> Action {
        match self.pending.pop_front() {
            Some((action, amount)) => {
                self.sizing = Some(amount);
                action
            }
            None => {
                self.sizing = None;
                Action::Call
            }
        }
    }

    fn size_raise(&mut self, state: &GameState, seat: usize) -> u64 {
        self.sizing.take().unwrap_or_else(|| state.to_call(seat).max(state.big_blind()))
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentSpecError {
    #[error("unknown agent '{0}' (expected random, basic_heuristic, aggressive_heuristic, mcts or expectiminimax)")]
    Unknown(String),
}

/// Roster entry naming an agent kind.
///
/// ```
/// use poker_arena::agents::AgentSpec;
///
/// let roster: Vec<AgentSpec> = "mcts,random"
///     .split(',')
///     .map(|s| s.parse().unwrap())
///     .collect();
/// assert_eq!(roster, vec![AgentSpec::Mcts, AgentSpec::Random]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentSpec {
    Random,
    BasicHeuristic,
    AggressiveHeuristic,
    Mcts,
    Expectiminimax,
}

impl AgentSpec {
    pub fn name(self) -> &'static str {
        match self {
            AgentSpec::Random => "random",
            AgentSpec::BasicHeuristic => "basic_heuristic",
            AgentSpec::AggressiveHeuristic => "aggressive_heuristic",
            AgentSpec::Mcts => "mcts",
            AgentSpec::Expectiminimax => "expectiminimax",
        }
    }

    /// Build the agent with default settings and an optional seed.
    pub fn build(self, seed: Option<u64>) -> Box<dyn Agent> {
        match self {
            AgentSpec::Random => Box::new(RandomAgent::new(seed)),
            AgentSpec::BasicHeuristic => {
                Box::new(HeuristicAgent::new(HeuristicProfile::basic().seeded(seed)))
            }
            AgentSpec::AggressiveHeuristic => {
                Box::new(HeuristicAgent::new(HeuristicProfile::aggressive().seeded(seed)))
            }
            AgentSpec::Mcts => Box::new(MctsAgent::new(MctsConfig::default().seeded(seed))),
            AgentSpec::Expectiminimax => {
                Box::new(ExpectiminimaxAgent::new(ExpectiminimaxConfig::default().seeded(seed)))
            }
        }
    }
}

impl fmt::Display for AgentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgentSpec {
    type Err = AgentSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random" => Ok(AgentSpec::Random),
            "basic_heuristic" | "basic" => Ok(AgentSpec::BasicHeuristic),
            "aggressive_heuristic" | "aggressive" => Ok(AgentSpec::AggressiveHeuristic),
            "mcts" => Ok(AgentSpec::Mcts),
            "expectiminimax" | "emm" => Ok(AgentSpec::Expectiminimax),
            _ => Err(AgentSpecError::Unknown(s.to_string())),
        }
    }
}
